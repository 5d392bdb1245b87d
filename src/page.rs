//! The page a document is rendered into, and how links resolve against it.

use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

/// Schemes a link may keep. Anything else is rewritten to the page scheme.
const SAFE_SCHEMES: [&str; 4] = ["http", "https", "ftp", "ftps"];

/// Current page location, used as the base for every link and image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    url: Url,
}

/// A link target after resolution against the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub url: String,
    /// Host differs from the page host.
    pub risky: bool,
}

impl PageContext {
    pub fn new(page_url: &str) -> Result<Self> {
        let url = Url::parse(page_url).map_err(|source| Error::InvalidPageUrl {
            url: page_url.to_string(),
            source,
        })?;
        Self::from_url(url)
    }

    pub fn from_url(url: Url) -> Result<Self> {
        if url.cannot_be_a_base() {
            return Err(Error::UnusablePageUrl(url.into()));
        }
        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    /// Resolve link text against the page.
    ///
    /// Relative and scheme-relative references join onto the page URL.
    /// Schemes outside http(s)/ftp(s) are replaced by the page scheme, so
    /// `javascript:` and friends turn into plain paths. Text that cannot be
    /// resolved at all points back at the page.
    pub fn resolve(&self, raw: &str) -> ResolvedUrl {
        let url = self.coerce(raw.trim()).unwrap_or_else(|| {
            debug!(raw, "unresolvable link target, pointing at page");
            self.url.clone()
        });
        let risky = url.host_str() != self.url.host_str();
        if risky {
            debug!(url = url.as_str(), "link leaves page host");
        }
        ResolvedUrl {
            url: url.into(),
            risky,
        }
    }

    fn coerce(&self, raw: &str) -> Option<Url> {
        let url = self.url.join(raw).ok()?;
        if SAFE_SCHEMES.contains(&url.scheme()) {
            return Some(url);
        }

        let rest = &url.as_str()[url.scheme().len() + 1..];
        debug!(
            from = url.scheme(),
            to = self.url.scheme(),
            "coercing link scheme"
        );
        self.url
            .join(&format!("{}:{}", self.url.scheme(), rest))
            .ok()
    }
}
