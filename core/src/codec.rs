//! Codec building blocks: domain type tags, validators and document types.
//!
//! # Design
//! Every domain type carries an explicit [`TypeTag`] chosen by the caller.
//! Registries are keyed on that tag, never on structural inspection, so a
//! lookup is a single hash probe with no "closest match" search.
//!
//! A [`DocumentType`] knows how to turn a domain object into bytes and back.
//! The [`Validator`] it receives is an opaque handle: the client passes it
//! through untouched and only the document type interprets it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Boxed error used where the failure is opaque to the client.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Explicit identifier of a domain type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag(&'static str);

impl TypeTag {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A type that can travel as a request or response body.
///
/// ```ignore
/// impl DomainType for Todo {
///     const TAG: TypeTag = TypeTag::new("todo");
/// }
/// ```
pub trait DomainType: Any + Send + Sync + fmt::Debug {
    const TAG: TypeTag;
}

/// Object-safe view of a [`DomainType`], implemented for every domain type.
pub trait DomainObject: Any + Send + Sync + fmt::Debug + 'static {
    fn type_tag(&self) -> TypeTag;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
}

impl<T: DomainType> DomainObject for T {
    fn type_tag(&self) -> TypeTag {
        T::TAG
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }
}

impl dyn DomainObject {
    pub fn is<T: DomainType>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: DomainType>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Opaque validation handle handed to a document type on every call.
#[derive(Clone, Default)]
pub struct Validator(Option<Arc<dyn Any + Send + Sync>>);

impl Validator {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn new<V: Any + Send + Sync>(validator: V) -> Self {
        Self(Some(Arc::new(validator)))
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    /// Borrow the wrapped value if it is a `V`.
    pub fn downcast_ref<V: Any>(&self) -> Option<&V> {
        self.0.as_deref()?.downcast_ref::<V>()
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Validator(..)"),
            None => f.write_str("Validator(none)"),
        }
    }
}

/// A document did not satisfy its validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Why a document type could not produce bytes for an object.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("expected an object of type {expected}, got {found}")]
    TypeMismatch { expected: TypeTag, found: TypeTag },

    #[error("payload failed validation: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to encode payload: {0}")]
    Encode(#[source] BoxError),
}

/// Why a document type could not produce an object from bytes.
///
/// The client treats the two variants differently: a validation failure is
/// reported to the caller with its message, anything else is logged and
/// reported without detail.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Other(#[source] BoxError),
}

/// Serializer/deserializer pair behind a codec.
pub trait DocumentType: Send + Sync {
    fn render(&self, validator: &Validator, object: &dyn DomainObject) -> Result<Vec<u8>, RenderError>;

    fn parse(
        &self,
        validator: &Validator,
        domain_type: TypeTag,
        body: &[u8],
    ) -> Result<Box<dyn DomainObject>, ParseError>;
}

/// A document type bound to the media type it speaks and its validator.
#[derive(Clone)]
pub struct Codec {
    document_type: Arc<dyn DocumentType>,
    mimetype: String,
    validator: Validator,
}

impl Codec {
    pub fn new(
        document_type: impl DocumentType + 'static,
        mimetype: impl Into<String>,
        validator: Validator,
    ) -> Self {
        Self::from_shared(Arc::new(document_type), mimetype, validator)
    }

    pub fn from_shared(
        document_type: Arc<dyn DocumentType>,
        mimetype: impl Into<String>,
        validator: Validator,
    ) -> Self {
        Self {
            document_type,
            mimetype: mimetype.into(),
            validator,
        }
    }

    pub fn mimetype(&self) -> &str {
        &self.mimetype
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn render(&self, object: &dyn DomainObject) -> Result<Vec<u8>, RenderError> {
        self.document_type.render(&self.validator, object)
    }

    pub fn parse(&self, domain_type: TypeTag, body: &[u8]) -> Result<Box<dyn DomainObject>, ParseError> {
        self.document_type.parse(&self.validator, domain_type, body)
    }

    /// True when both codecs share the same document type instance.
    pub fn same_document_type(&self, other: &Codec) -> bool {
        Arc::ptr_eq(&self.document_type, &other.document_type)
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("mimetype", &self.mimetype)
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}
