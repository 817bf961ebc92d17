//! Negotiating request executor.
//!
//! # Design
//! `MimeClient` owns two read-only registries, the session headers and a
//! `Transport`. A call to [`MimeClient::request`] runs one linear pass:
//! render the payload with the codec registered for its type, send the
//! request, then pick the codec registered for the response media type and
//! decode the body. The client keeps no other state, so it can be shared
//! between threads whenever its transport can.

use std::time::Duration;

use tracing::{debug, error};

use crate::codec::{DomainObject, DomainType, ParseError, TypeTag};
use crate::config::{BaseUrl, ClientConfig};
use crate::error::{ClientError, ConfigError};
use crate::http::{merge_headers, HttpMethod, HttpRequest, HttpResponse};
use crate::media_type;
use crate::registry::{InboundRegistry, OutboundRegistry, Registries};
use crate::transport::{RequestOptions, Transport, UreqTransport};

/// Everything a caller can say about a single request besides method and path.
#[derive(Debug, Default)]
pub struct RequestIntent<'a> {
    body: Option<&'a dyn DomainObject>,
    raw_body: Option<Vec<u8>>,
    headers: Vec<(String, String)>,
    expect: Vec<TypeTag>,
    options: RequestOptions,
}

impl<'a> RequestIntent<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send `object`, rendered by the codec registered for its type.
    pub fn body(mut self, object: &'a dyn DomainObject) -> Self {
        self.body = Some(object);
        self
    }

    /// Send these bytes as-is. Takes precedence over [`RequestIntent::body`]
    /// and leaves `Content-Type` to the caller.
    pub fn raw_body(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.raw_body = Some(bytes.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Accept `T` as a response type. With no expectations every registered
    /// response type is accepted.
    pub fn expect<T: DomainType>(self) -> Self {
        self.expect_tag(T::TAG)
    }

    pub fn expect_tag(mut self, tag: TypeTag) -> Self {
        self.expect.push(tag);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }
}

/// The raw response together with its decoded body, if there was one.
#[derive(Debug)]
pub struct Negotiated {
    pub response: HttpResponse,
    pub object: Option<Box<dyn DomainObject>>,
}

impl Negotiated {
    pub fn status(&self) -> u16 {
        self.response.status
    }

    pub fn object(&self) -> Option<&dyn DomainObject> {
        self.object.as_deref()
    }

    pub fn downcast_ref<T: DomainType>(&self) -> Option<&T> {
        self.object()?.downcast_ref::<T>()
    }

    /// Take the decoded object if it is a `T`.
    pub fn into_object<T: DomainType>(self) -> Option<T> {
        let boxed = self.object?.into_any().downcast::<T>().ok()?;
        Some(*boxed)
    }

    pub fn into_parts(self) -> (HttpResponse, Option<Box<dyn DomainObject>>) {
        (self.response, self.object)
    }
}

/// HTTP client that exchanges domain objects instead of bytes.
pub struct MimeClient<T = UreqTransport> {
    base: BaseUrl,
    headers: Vec<(String, String)>,
    options: RequestOptions,
    outbound: OutboundRegistry,
    inbound: InboundRegistry,
    transport: T,
}

impl MimeClient<UreqTransport> {
    /// Client over a blocking `ureq` transport.
    pub fn with_ureq(config: &ClientConfig, registries: Registries) -> Result<Self, ConfigError> {
        Self::from_registries(config, registries, UreqTransport::new())
    }
}

impl<T: Transport> MimeClient<T> {
    pub fn new(
        config: &ClientConfig,
        outbound: OutboundRegistry,
        inbound: InboundRegistry,
        transport: T,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            base: BaseUrl::parse(&config.base_url)?,
            headers: config.session_headers(),
            options: config.options.clone(),
            outbound,
            inbound,
            transport,
        })
    }

    pub fn from_registries(
        config: &ClientConfig,
        registries: Registries,
        transport: T,
    ) -> Result<Self, ConfigError> {
        Self::new(config, registries.outbound, registries.inbound, transport)
    }

    /// Absolute URL a request for `path` is sent to.
    pub fn url_for(&self, path: &str) -> String {
        self.base.join(path)
    }

    pub fn session_headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run one request/response cycle.
    ///
    /// A response without `Content-Type` or without a body yields no object.
    /// Transport failures are returned as [`ClientError::Transport`] and never
    /// mapped onto the negotiation errors.
    pub fn request(
        &self,
        method: HttpMethod,
        path: &str,
        intent: RequestIntent<'_>,
    ) -> Result<Negotiated, ClientError> {
        let RequestIntent {
            body,
            raw_body,
            headers,
            expect,
            options,
        } = intent;

        let mut headers = merge_headers(&self.headers, &headers);
        let body = match (raw_body, body) {
            (Some(raw), _) => raw,
            (None, Some(object)) => {
                let codec = self.outbound.resolve(object)?;
                let rendered = codec.render(object).map_err(ClientError::Render)?;
                headers = merge_headers(
                    &headers,
                    &[("Content-Type".to_string(), codec.mimetype().to_string())],
                );
                rendered
            }
            (None, None) => Vec::new(),
        };

        let request = HttpRequest {
            method,
            url: self.url_for(path),
            headers,
            body,
        };
        debug!(%method, url = %request.url, body_len = request.body.len(), "dispatching request");
        let response = self
            .transport
            .send(request, &options.or(&self.options))
            .map_err(ClientError::Transport)?;

        let media_type = response
            .content_type()
            .filter(|_| !response.body.is_empty())
            .map(|value| media_type::parse_options_header(value).0);
        let Some(media_type) = media_type else {
            debug!(status = response.status, "response carries no document");
            return Ok(Negotiated {
                response,
                object: None,
            });
        };

        let entry = self.inbound.resolve(&media_type)?;
        let domain_type = entry.domain_type();
        if !expect.is_empty() && !expect.contains(&domain_type) {
            return Err(ClientError::UnexpectedResponseType(media_type));
        }

        let object = match entry.codec().parse(domain_type, &response.body) {
            Ok(object) => object,
            Err(ParseError::Validation(e)) => {
                return Err(ClientError::ResponseFormatInvalid(e.message().to_string()));
            }
            Err(ParseError::Other(e)) => {
                error!(media_type = %media_type, error = %e, "failed to parse content");
                return Err(ClientError::ResponseParseFailed(media_type));
            }
        };
        debug!(status = response.status, %media_type, %domain_type, "decoded response");

        Ok(Negotiated {
            response,
            object: Some(object),
        })
    }

    pub fn get(&self, path: &str, intent: RequestIntent<'_>) -> Result<Negotiated, ClientError> {
        self.request(HttpMethod::Get, path, intent)
    }

    pub fn post(&self, path: &str, intent: RequestIntent<'_>) -> Result<Negotiated, ClientError> {
        self.request(HttpMethod::Post, path, intent)
    }

    pub fn put(&self, path: &str, intent: RequestIntent<'_>) -> Result<Negotiated, ClientError> {
        self.request(HttpMethod::Put, path, intent)
    }

    pub fn delete(&self, path: &str, intent: RequestIntent<'_>) -> Result<Negotiated, ClientError> {
        self.request(HttpMethod::Delete, path, intent)
    }
}
