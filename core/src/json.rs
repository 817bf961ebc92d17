//! JSON document type backed by `serde_json`.
//!
//! Malformed JSON is a plain parse failure. A well-formed document that
//! fails its [`JsonValidator`] or does not fit the shape of the target type
//! is a validation failure, so the caller sees the reason.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::codec::{
    DocumentType, DomainObject, DomainType, ParseError, RenderError, TypeTag, ValidationError, Validator,
};

/// Renders and parses `T` as JSON.
pub struct JsonDocument<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonDocument<T> {
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<T> Default for JsonDocument<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DocumentType for JsonDocument<T>
where
    T: DomainType + Serialize + DeserializeOwned,
{
    fn render(&self, validator: &Validator, object: &dyn DomainObject) -> Result<Vec<u8>, RenderError> {
        let typed = object
            .as_any()
            .downcast_ref::<T>()
            .ok_or(RenderError::TypeMismatch {
                expected: T::TAG,
                found: object.type_tag(),
            })?;
        let value = serde_json::to_value(typed).map_err(|e| RenderError::Encode(Box::new(e)))?;
        if let Some(rules) = validator.downcast_ref::<JsonValidator>() {
            rules.validate(&value)?;
        }
        serde_json::to_vec(&value).map_err(|e| RenderError::Encode(Box::new(e)))
    }

    fn parse(
        &self,
        validator: &Validator,
        domain_type: TypeTag,
        body: &[u8],
    ) -> Result<Box<dyn DomainObject>, ParseError> {
        if domain_type != T::TAG {
            return Err(ParseError::Other(
                format!("JSON document for {} cannot produce {domain_type}", T::TAG).into(),
            ));
        }
        let value: Value = serde_json::from_slice(body).map_err(|e| ParseError::Other(Box::new(e)))?;
        if let Some(rules) = validator.downcast_ref::<JsonValidator>() {
            rules.validate(&value)?;
        }
        let object: T =
            serde_json::from_value(value).map_err(|e| ValidationError::new(e.to_string()))?;
        Ok(Box::new(object))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRoot {
    Object,
    Array,
}

/// Structural rules checked before a JSON document is accepted.
#[derive(Debug, Clone, Default)]
pub struct JsonValidator {
    root: Option<JsonRoot>,
    required: Vec<String>,
}

impl JsonValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(mut self, root: JsonRoot) -> Self {
        self.root = Some(root);
        self
    }

    /// Require a top-level field. Implies an object root.
    pub fn require(mut self, field: impl Into<String>) -> Self {
        self.required.push(field.into());
        self
    }

    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        match self.root {
            Some(JsonRoot::Array) if !value.is_array() => {
                return Err(ValidationError::new("expected a JSON array"));
            }
            Some(JsonRoot::Object) if !value.is_object() => {
                return Err(ValidationError::new("expected a JSON object"));
            }
            _ => {}
        }
        if self.required.is_empty() {
            return Ok(());
        }
        let fields = value
            .as_object()
            .ok_or_else(|| ValidationError::new("expected a JSON object"))?;
        match self.required.iter().find(|name| !fields.contains_key(name.as_str())) {
            Some(missing) => Err(ValidationError::new(format!("missing required field '{missing}'"))),
            None => Ok(()),
        }
    }
}
