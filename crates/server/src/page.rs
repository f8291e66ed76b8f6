//! The static HTML page served at `/`

use crate::config::ConfigError;
use axum::body::Bytes;
use axum::response::Html;
use std::path::Path;

/// Page compiled into the binary
pub const EMBEDDED_PAGE: &str = include_str!("../assets/index.html");

/// HTML page loaded once at startup
#[derive(Debug, Clone)]
pub struct Page {
    html: Bytes,
}

impl Page {
    /// The page compiled into the binary
    pub fn embedded() -> Self {
        Self {
            html: Bytes::from_static(EMBEDDED_PAGE.as_bytes()),
        }
    }

    /// Load `path` if given, the embedded page otherwise.
    ///
    /// A missing or empty file is a startup error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::embedded());
        };

        let page_error = |reason: String| ConfigError::Page {
            path: path.display().to_string(),
            reason,
        };

        let html = std::fs::read(path).map_err(|e| page_error(e.to_string()))?;
        if html.iter().all(u8::is_ascii_whitespace) {
            return Err(page_error("page is empty".to_string()));
        }

        tracing::info!(path = %path.display(), bytes = html.len(), "Loaded page");
        Ok(Self {
            html: Bytes::from(html),
        })
    }

    pub fn html(&self) -> Html<Bytes> {
        Html(self.html.clone())
    }

    pub fn len(&self) -> usize {
        self.html.len()
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }
}
