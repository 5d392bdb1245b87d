//! Errors raised by the layers around the renderer.
//!
//! Tokenizing and building never fail; only page setup, config loading and
//! output can.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// IO error while reading input or writing output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for [`crate::Config`].
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// The page URL links are resolved against does not parse.
    #[error("Invalid page URL `{url}`: {source}")]
    InvalidPageUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The page URL parses but relative links cannot be joined onto it.
    #[error("Page URL `{0}` cannot be used as a base for relative links")]
    UnusablePageUrl(String),

    /// JSON serialization of the document failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
