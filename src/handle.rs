use std::fmt;
use std::sync::Arc;

/// Opaque reference to one loadable image.
///
/// Handles are cheap to clone and compare by URL, so the same artwork
/// fetched twice is the same handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageHandle {
    url: Arc<str>,
}

impl ImageHandle {
    pub fn new(url: impl Into<Arc<str>>) -> Self {
        Self { url: url.into() }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl From<&str> for ImageHandle {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for ImageHandle {
    fn from(url: String) -> Self {
        Self::new(url)
    }
}
