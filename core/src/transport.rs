//! The seam between the negotiating client and the network.
//!
//! # Design
//! The client never performs I/O itself. It hands a fully built
//! `HttpRequest` to a `Transport` and gets an `HttpResponse` back. Status
//! codes are data, not errors: a transport only fails when no response was
//! received at all. Transport errors are opaque to the client and surface to
//! the caller unchanged.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::BoxError;
use crate::http::{HttpRequest, HttpResponse};

/// Opaque transport failure (connection, DNS, TLS, timeout...).
pub type TransportError = BoxError;

/// Per-request options forwarded verbatim to the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Upper bound on the whole round-trip.
    #[serde(default, with = "millis", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Options set on the request win over `defaults`.
    pub fn or(&self, defaults: &RequestOptions) -> RequestOptions {
        RequestOptions {
            timeout: self.timeout.or(defaults.timeout),
        }
    }
}

/// Executes one HTTP round-trip.
///
/// Implementations must be safe to share between threads; the client holds
/// one instance and calls it from whichever thread issues a request.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest, options: &RequestOptions) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, request: HttpRequest, options: &RequestOptions) -> Result<HttpResponse, TransportError> {
        (**self).send(request, options)
    }
}

/// Blocking transport over `ureq`.
///
/// 4xx/5xx responses are returned as data rather than `Err`, so the client
/// can still negotiate error bodies.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        Self {
            agent: ureq::Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent(),
        }
    }

    /// Dispatch on the pooled agent, applying the timeout to this request only.
    fn run<S: ureq::AsSendBody>(
        &self,
        request: ureq::http::Request<S>,
        timeout: Option<Duration>,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        let request = self.agent.configure_request(request).timeout_global(timeout).build();
        self.agent.run(request)
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: HttpRequest, options: &RequestOptions) -> Result<HttpResponse, TransportError> {
        let mut builder = ureq::http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        debug!(method = %request.method, url = %request.url, "sending request");
        let mut response = if request.body.is_empty() {
            self.run(builder.body(())?, options.timeout)?
        } else {
            self.run(builder.body(request.body)?, options.timeout)?
        };

        let status = response.status().as_u16();
        // Header values may carry obs-text; keep them rather than lose Content-Type.
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        // No cap on document size beyond what the caller's timeout allows.
        let body = response.body_mut().with_config().limit(u64::MAX).read_to_vec()?;

        Ok(HttpResponse { status, headers, body })
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
