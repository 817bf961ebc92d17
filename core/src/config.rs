//! Client construction settings.
//!
//! `ClientConfig` is plain data and deserializes from JSON, so it can live in
//! a settings file next to the rest of an application's configuration.
//! Nothing in it is mutated once a client has been built.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;
use crate::http::merge_headers;
use crate::transport::RequestOptions;

/// Scheme assumed when the base URL does not name one.
pub const DEFAULT_SCHEME: &str = "https";

/// Headers every session starts with, before configured defaults are merged.
pub const DEFAULT_HEADERS: &[(&str, &str)] = &[("Accept", "*/*")];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// `scheme://host[:port]`; the scheme may be omitted.
    pub base_url: String,

    /// Sent with every request unless a request overrides them.
    #[serde(default)]
    pub default_headers: Vec<(String, String)>,

    /// Defaults for per-request transport options.
    #[serde(default)]
    pub options: RequestOptions,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            default_headers: Vec::new(),
            options: RequestOptions::default(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    /// Built-in headers with the configured defaults merged over them.
    pub fn session_headers(&self) -> Vec<(String, String)> {
        let builtin: Vec<(String, String)> = DEFAULT_HEADERS
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        merge_headers(&builtin, &self.default_headers)
    }
}

/// Scheme and authority every request URL is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    scheme: String,
    authority: String,
}

impl BaseUrl {
    /// Parse a base URL, defaulting the scheme to https.
    ///
    /// The port is kept only when it differs from the scheme's default. Any
    /// path on the base URL is dropped; request paths are always absolute.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        let candidate = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("{DEFAULT_SCHEME}://{trimmed}")
        };
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason,
        };

        let url = Url::parse(&candidate).map_err(|e| invalid(e.to_string()))?;
        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| invalid("missing host".to_string()))?;
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        Ok(Self {
            scheme: url.scheme().to_string(),
            authority,
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Host, with `:port` when the port is not the scheme default.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Absolute URL for `path`. A missing leading `/` is added.
    pub fn join(&self, path: &str) -> String {
        let separator = if path.starts_with('/') { "" } else { "/" };
        format!("{}://{}{separator}{path}", self.scheme, self.authority)
    }
}
