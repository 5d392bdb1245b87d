use crate::block::{Block, Span};

pub const DEFAULT_CONFIRM_MESSAGE: &str =
    "You are about to visit {href}, an address of unknown safety. Continue?";

/// How links and images are presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlOptions {
    /// `target` attribute of every link.
    pub link_target: String,
    /// `class` attribute of every image; omitted when empty.
    pub image_class: String,
    /// Question asked before following a risky link. `{href}` is replaced
    /// by the link URL.
    pub confirm_message: String,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            link_target: "_blank".to_string(),
            image_class: "img-fluid".to_string(),
            confirm_message: DEFAULT_CONFIRM_MESSAGE.to_string(),
        }
    }
}

/// Convert blocks to HTML, one block per line.
pub fn blocks_to_html(blocks: &[Block], options: &HtmlOptions) -> String {
    let mut out = String::new();
    for block in blocks {
        emit_block(block, options, &mut out);
        out.push('\n');
    }
    out
}

fn emit_block(block: &Block, options: &HtmlOptions, out: &mut String) {
    match block {
        Block::Paragraph { content } => {
            out.push_str("<p>");
            spans_to_html(content, options, out);
            out.push_str("</p>");
        }
        Block::CodeBlock { content } => {
            out.push_str("<pre>");
            escape(content, out);
            out.push_str("</pre>");
        }
    }
}

fn spans_to_html(spans: &[Span], options: &HtmlOptions, out: &mut String) {
    for span in spans {
        span_to_html(span, options, out);
    }
}

fn span_to_html(span: &Span, options: &HtmlOptions, out: &mut String) {
    match span {
        Span::Text(text) => escape(text, out),
        Span::Code(text) => {
            out.push_str("<code>");
            escape(text, out);
            out.push_str("</code>");
        }
        Span::Link {
            url,
            risky,
            content,
        } => {
            out.push_str("<a");
            attribute("href", url, out);
            if !options.link_target.is_empty() {
                attribute("target", &options.link_target, out);
            }
            if *risky {
                // The message travels in a data attribute so the handler
                // never has to embed it in script.
                attribute("data-risky", "true", out);
                attribute(
                    "data-confirm",
                    &options.confirm_message.replace("{href}", url),
                    out,
                );
                attribute("onclick", "return confirm(this.dataset.confirm)", out);
            }
            out.push('>');
            spans_to_html(content, options, out);
            out.push_str("</a>");
        }
        Span::Image { alt, src } => {
            out.push_str("<img");
            if !options.image_class.is_empty() {
                attribute("class", &options.image_class, out);
            }
            attribute("alt", alt, out);
            attribute("src", src, out);
            out.push('>');
        }
    }
}

fn attribute(name: &str, value: &str, out: &mut String) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    escape(value, out);
    out.push('"');
}

fn escape(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}
