//! HTTP request and response types passed across the transport seam.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! negotiating client builds an `HttpRequest`, hands it to a `Transport`, and
//! inspects the `HttpResponse` it gets back. Nothing here touches the network,
//! so stub transports in tests can build and inspect these values directly.
//!
//! All fields use owned types (`String`, `Vec`) so values can move freely
//! between the client and whatever transport executes them.

use std::fmt;
use std::str::FromStr;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a method name is not one of the supported verbs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "HEAD" => Ok(HttpMethod::Head),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "OPTIONS" => Ok(HttpMethod::Options),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `MimeClient::request` after body negotiation. `url` is always
/// absolute. An empty `body` means the request carries no body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Case-insensitive header lookup; the first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
///
/// Produced by a `Transport` once the round-trip completes. Non-2xx statuses
/// are ordinary responses here; interpreting them is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Case-insensitive header lookup; the first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Raw `Content-Type` header value, parameters included.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Merge `overrides` into `base` without mutating either.
///
/// Header names compare case-insensitively. An override replaces the value of
/// an existing header in place (keeping its original position and spelling);
/// headers not present in `base` are appended in the order given.
pub fn merge_headers(base: &[(String, String)], overrides: &[(String, String)]) -> Vec<(String, String)> {
    let mut merged = base.to_vec();
    for (name, value) in overrides {
        match merged.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
            Some(existing) => existing.1 = value.clone(),
            None => merged.push((name.clone(), value.clone())),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("Patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn unknown_method_is_rejected() {
        let err = "BREW".parse::<HttpMethod>().unwrap_err();
        assert_eq!(err, UnknownMethod("BREW".to_string()));
        assert_eq!(err.to_string(), "unsupported HTTP method: BREW");
    }

    #[test]
    fn response_header_lookup_ignores_case() {
        let response = HttpResponse {
            status: 200,
            headers: pairs(&[("Content-Type", "application/json"), ("X-Trace", "abc")]),
            body: Vec::new(),
        };
        assert_eq!(response.content_type(), Some("application/json"));
        assert_eq!(response.header("x-trace"), Some("abc"));
        assert_eq!(response.header("missing"), None);
        assert!(response.is_success());
    }

    #[test]
    fn response_text_is_lossy() {
        let response = HttpResponse {
            status: 500,
            headers: Vec::new(),
            body: vec![b'o', b'k', 0xff],
        };
        assert_eq!(response.text(), "ok\u{fffd}");
        assert!(!response.is_success());
    }

    #[test]
    fn merge_override_wins_and_keeps_position() {
        let base = pairs(&[("Accept", "*/*"), ("User-Agent", "base")]);
        let overrides = pairs(&[("accept", "application/json"), ("X-Extra", "1")]);
        let merged = merge_headers(&base, &overrides);
        assert_eq!(
            merged,
            pairs(&[("Accept", "application/json"), ("User-Agent", "base"), ("X-Extra", "1")])
        );
        // inputs are untouched
        assert_eq!(base[0].1, "*/*");
    }

    #[test]
    fn merge_with_empty_overrides_is_identity() {
        let base = pairs(&[("Accept", "*/*")]);
        assert_eq!(merge_headers(&base, &[]), base);
    }
}
