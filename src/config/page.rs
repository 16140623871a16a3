//! Endpoint derivation from the hosting page.
//!
//! The viewer is usually served from the same machine as the camera
//! server, so the default endpoint mirrors the page's host and scheme on
//! port [`DEFAULT_PORT`]. A `?ws=` query parameter overrides it.

// ============================================================================
// Imports
// ============================================================================

use std::str::FromStr;

use url::Url;

use crate::error::{Error, Result};

use super::connection::{ConnectionConfig, DEFAULT_PORT};

// ============================================================================
// Constants
// ============================================================================

/// Query parameter carrying an explicit WebSocket URL.
pub const WS_QUERY_PARAM: &str = "ws";

// ============================================================================
// PageLocation
// ============================================================================

/// Location of the page embedding the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    url: Url,
}

impl PageLocation {
    /// Parses a page URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Url`] if `location` is not an absolute URL.
    pub fn parse(location: &str) -> Result<Self> {
        Ok(Self {
            url: Url::parse(location)?,
        })
    }

    /// Returns the page URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Default WebSocket endpoint for this page.
    ///
    /// `https` pages get `wss`, everything else `ws`. Pages without a host
    /// (for example `file://`) fall back to `localhost`.
    #[must_use]
    pub fn default_ws_url(&self) -> String {
        let scheme = if self.url.scheme() == "https" {
            "wss"
        } else {
            "ws"
        };
        let host = match self.url.host_str() {
            Some(host) if !host.is_empty() => host,
            _ => "localhost",
        };
        format!("{scheme}://{host}:{DEFAULT_PORT}")
    }

    /// WebSocket URL passed explicitly through the `ws` query parameter.
    #[must_use]
    pub fn ws_override(&self) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == WS_QUERY_PARAM)
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Endpoint to use: the override if present, else the default.
    #[must_use]
    pub fn ws_url(&self) -> String {
        self.ws_override().unwrap_or_else(|| self.default_ws_url())
    }
}

impl FromStr for PageLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl ConnectionConfig {
    /// Creates a configuration targeting the endpoint derived from `page`.
    #[must_use]
    pub fn from_page(page: &PageLocation) -> Self {
        Self::new(page.ws_url())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_page_uses_ws() {
        let page = PageLocation::parse("http://192.168.1.20:8080/index.html").expect("parse");
        assert_eq!(page.default_ws_url(), "ws://192.168.1.20:8765");
    }

    #[test]
    fn test_https_page_uses_wss() {
        let page: PageLocation = "https://viewer.example.com/".parse().expect("parse");
        assert_eq!(page.default_ws_url(), "wss://viewer.example.com:8765");
    }

    #[test]
    fn test_file_page_falls_back_to_localhost() {
        let page = PageLocation::parse("file:///home/user/viewer/index.html").expect("parse");
        assert_eq!(page.default_ws_url(), "ws://localhost:8765");
    }

    #[test]
    fn test_query_override() {
        let page =
            PageLocation::parse("http://localhost:3000/?ws=ws%3A%2F%2F10.0.0.5%3A9000").expect("parse");
        assert_eq!(page.ws_override().as_deref(), Some("ws://10.0.0.5:9000"));
        assert_eq!(page.ws_url(), "ws://10.0.0.5:9000");
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let page = PageLocation::parse("http://localhost:3000/?ws=").expect("parse");
        assert_eq!(page.ws_override(), None);
        assert_eq!(page.ws_url(), "ws://localhost:8765");
    }

    #[test]
    fn test_config_from_page() {
        let page = PageLocation::parse("https://cam.local/").expect("parse");
        let config = ConnectionConfig::from_page(&page);
        assert_eq!(config.url, "wss://cam.local:8765");
        assert!(config.auto_reconnect);
    }

    #[test]
    fn test_relative_location_is_rejected() {
        assert!(PageLocation::parse("/index.html").is_err());
    }
}
