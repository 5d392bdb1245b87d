use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::warn;

use crate::error::Result;
use crate::html::{DEFAULT_CONFIRM_MESSAGE, HtmlOptions};
use crate::page::PageContext;

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub page: PageConfig,
    pub links: LinksConfig,
    pub images: ImagesConfig,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PageConfig {
    /// URL of the page the document is shown on.
    pub url: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost/".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LinksConfig {
    pub target: String,
    pub confirm_message: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            target: "_blank".to_string(),
            confirm_message: DEFAULT_CONFIRM_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ImagesConfig {
    pub class: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            class: "img-fluid".to_string(),
        }
    }
}

impl Config {
    /// The bundled default config (checked by the build script).
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load config from a TOML file, or return defaults if it is missing or
    /// unreadable.
    pub fn load(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(crate::Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
                Self::compiled_default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring config file");
                Self::compiled_default()
            }
        }
    }

    /// Load config from a TOML file, failing if it cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn page_context(&self) -> Result<PageContext> {
        PageContext::new(&self.page.url)
    }

    pub fn html_options(&self) -> HtmlOptions {
        HtmlOptions {
            link_target: self.links.target.clone(),
            image_class: self.images.class.clone(),
            confirm_message: self.links.confirm_message.clone(),
        }
    }
}
