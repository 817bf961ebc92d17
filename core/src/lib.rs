//! HTTP client that negotiates bodies through media-type codecs.
//!
//! # Overview
//! Callers exchange domain objects instead of bytes. An outgoing object is
//! rendered by the codec registered for its type, and `Content-Type` is set
//! to match. An incoming body is decoded by the codec registered for the
//! response media type, optionally restricted to a set of expected types.
//!
//! # Design
//! - Codec selection is exact in both directions: by [`TypeTag`] outbound and
//!   by normalized media type inbound. There is no fallback matching.
//! - Registries are built once and only read afterwards, so a `MimeClient`
//!   is as thread-safe as its transport.
//! - The network sits behind the [`Transport`] trait. [`UreqTransport`] is
//!   the blocking implementation; tests plug in stubs.
//! - Negotiation failures, rendering failures and transport failures are
//!   separate [`ClientError`] variants.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod json;
pub mod media_type;
pub mod registry;
pub mod transport;

pub use client::{MimeClient, Negotiated, RequestIntent};
pub use codec::{
    BoxError, Codec, DocumentType, DomainObject, DomainType, ParseError, RenderError, TypeTag, ValidationError,
    Validator,
};
pub use config::{BaseUrl, ClientConfig};
pub use error::{ClientError, ConfigError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use json::{JsonDocument, JsonRoot, JsonValidator};
pub use registry::{InboundEntry, InboundRegistry, OutboundRegistry, Registries, RegistriesBuilder};
pub use transport::{RequestOptions, Transport, TransportError, UreqTransport};
