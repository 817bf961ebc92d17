//! Error types for the negotiating client.
//!
//! # Design
//! The first five `ClientError` variants form the negotiation taxonomy: they
//! describe why a body could not be matched to a codec or decoded. Rendering
//! and transport failures are different failure domains and keep their own
//! variants with the underlying error attached as the source, so callers can
//! tell "the server said something we cannot read" apart from "we never got
//! an answer".

use thiserror::Error;

use crate::codec::{RenderError, TypeTag};
use crate::transport::TransportError;

/// Errors returned by `MimeClient::request`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No outbound codec is registered for the payload's type.
    #[error("cannot handle object of type {0}")]
    UnsupportedPayloadType(TypeTag),

    /// No inbound codec is registered for the response media type.
    #[error("cannot handle response type: {0}")]
    UnsupportedMediaType(String),

    /// The response decodes to a type the caller did not ask for.
    #[error("unexpected response type: {0}")]
    UnexpectedResponseType(String),

    /// The response body failed validation; the message comes from the validator.
    #[error("response format invalid: {0}")]
    ResponseFormatInvalid(String),

    /// The response body could not be parsed. Details are logged, not returned.
    #[error("failed to parse content of type: {0}")]
    ResponseParseFailed(String),

    /// The outbound codec could not render the payload.
    #[error("failed to render request body: {0}")]
    Render(#[source] RenderError),

    /// The transport failed before a response was received.
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),
}

impl ClientError {
    /// True for the five codec negotiation failures.
    pub fn is_negotiation(&self) -> bool {
        !matches!(self, ClientError::Render(_) | ClientError::Transport(_))
    }
}

/// Errors raised while building a client or its registries.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("media type {0} is already registered")]
    DuplicateMediaType(String),

    #[error("invalid media type '{0}'")]
    InvalidMediaType(String),
}
