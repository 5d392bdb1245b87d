mod block;
mod config;
mod error;
mod html;
mod lexer;
mod page;
mod parser;

pub use block::{Block, Span};
pub use config::{Config, ImagesConfig, LinksConfig, PageConfig};
pub use error::{Error, Result};
pub use html::{DEFAULT_CONFIRM_MESSAGE, HtmlOptions, blocks_to_html};
pub use lexer::{DELIMITERS, Token, TokenKind, tokenize};
pub use page::{PageContext, ResolvedUrl};
pub use parser::build;

/// Parse markd text into a vector of blocks, resolving links against `page`.
pub fn parse(markdown: &str, page: &PageContext) -> Vec<Block> {
    build(&tokenize(markdown), page)
}

/// Convert markd text to HTML using default presentation options.
pub fn markdown_to_html(markdown: &str, page: &PageContext) -> String {
    blocks_to_html(&parse(markdown, page), &HtmlOptions::default())
}

/// Convert markd text to HTML with custom config.
pub fn markdown_to_html_with_config(markdown: &str, config: &Config) -> Result<String> {
    let page = config.page_context()?;
    Ok(blocks_to_html(
        &parse(markdown, &page),
        &config.html_options(),
    ))
}
