use serde::Serialize;

/// Inline content of a paragraph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Span {
    Text(String),
    Code(String),
    Link {
        url: String,
        /// The link leaves the current host; renderers must ask before following it.
        risky: bool,
        content: Vec<Span>,
    },
    /// Only ever appears as the content of a `Link` written as `![alt](src)`.
    Image { alt: String, src: String },
}

/// Block-level elements of a rendered document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    Paragraph { content: Vec<Span> },
    CodeBlock { content: String },
}

impl Span {
    /// Whether this span shows anything once rendered.
    pub fn has_content(&self) -> bool {
        match self {
            Span::Text(text) => !text.trim().is_empty(),
            Span::Code(_) | Span::Link { .. } | Span::Image { .. } => true,
        }
    }
}
