//! Type-to-codec and media-type-to-codec lookup tables.
//!
//! # Design
//! Outbound lookups key on the payload's [`TypeTag`], inbound lookups key on
//! the normalized media type of the response. Both are exact matches: there is
//! no fallback to a "related" type or a wildcard media type. Registries are
//! filled once and then handed to the client, which only reads them.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::{Codec, DomainObject, DomainType, TypeTag, Validator};
use crate::error::{ClientError, ConfigError};
use crate::json::{JsonDocument, JsonValidator};
use crate::media_type;

/// Maps a domain type to the codecs able to render it.
///
/// Several candidates may be registered for one type; only the first is ever
/// used when rendering.
#[derive(Debug, Clone, Default)]
pub struct OutboundRegistry {
    entries: HashMap<TypeTag, Vec<Codec>>,
}

impl OutboundRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate codec for `tag`.
    pub fn register(&mut self, tag: TypeTag, codec: Codec) -> &mut Self {
        self.entries.entry(tag).or_default().push(codec);
        self
    }

    pub fn register_type<T: DomainType>(&mut self, codec: Codec) -> &mut Self {
        self.register(T::TAG, codec)
    }

    /// All candidates for `tag`, in registration order.
    pub fn candidates(&self, tag: TypeTag) -> &[Codec] {
        self.entries.get(&tag).map(Vec::as_slice).unwrap_or_default()
    }

    /// The codec used to render `object`.
    pub fn resolve(&self, object: &dyn DomainObject) -> Result<&Codec, ClientError> {
        let tag = object.type_tag();
        self.candidates(tag)
            .first()
            .ok_or(ClientError::UnsupportedPayloadType(tag))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Codec registered for a media type, with the domain type it produces.
#[derive(Debug, Clone)]
pub struct InboundEntry {
    domain_type: TypeTag,
    codec: Codec,
}

impl InboundEntry {
    pub fn domain_type(&self) -> TypeTag {
        self.domain_type
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }
}

/// Maps a media type to the codec able to parse it.
#[derive(Debug, Clone, Default)]
pub struct InboundRegistry {
    entries: HashMap<String, InboundEntry>,
}

impl InboundRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `codec` for `media_type`. Parameters and case are ignored.
    pub fn register(
        &mut self,
        media_type: &str,
        domain_type: TypeTag,
        codec: Codec,
    ) -> Result<&mut Self, ConfigError> {
        let key = media_type::normalize(media_type);
        if !key.contains('/') {
            return Err(ConfigError::InvalidMediaType(media_type.to_string()));
        }
        if self.entries.contains_key(&key) {
            return Err(ConfigError::DuplicateMediaType(key));
        }
        self.entries.insert(key, InboundEntry { domain_type, codec });
        Ok(self)
    }

    pub fn resolve(&self, media_type: &str) -> Result<&InboundEntry, ClientError> {
        let key = media_type::normalize(media_type);
        match self.entries.get(&key) {
            Some(entry) => Ok(entry),
            None => Err(ClientError::UnsupportedMediaType(key)),
        }
    }

    pub fn contains(&self, media_type: &str) -> bool {
        self.entries.contains_key(&media_type::normalize(media_type))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Both registries, ready to hand to a client.
#[derive(Debug, Clone, Default)]
pub struct Registries {
    pub outbound: OutboundRegistry,
    pub inbound: InboundRegistry,
}

impl Registries {
    pub fn builder() -> RegistriesBuilder {
        RegistriesBuilder::default()
    }
}

/// Registers codecs in both directions at once.
///
/// Registration errors are kept until [`RegistriesBuilder::build`], which
/// reports the first one.
#[derive(Debug, Default)]
pub struct RegistriesBuilder {
    registries: Registries,
    error: Option<ConfigError>,
}

impl RegistriesBuilder {
    /// Use `codec` to render `T` and to parse its media type into `T`.
    pub fn codec<T: DomainType>(mut self, codec: Codec) -> Self {
        if self.error.is_some() {
            return self;
        }
        let mimetype = codec.mimetype().to_string();
        if let Err(e) = self.registries.inbound.register(&mimetype, T::TAG, codec.clone()) {
            self.error = Some(e);
            return self;
        }
        self.registries.outbound.register_type::<T>(codec);
        self
    }

    pub fn json<T>(self, mimetype: &str) -> Self
    where
        T: DomainType + Serialize + DeserializeOwned,
    {
        self.codec::<T>(Codec::new(JsonDocument::<T>::new(), mimetype, Validator::none()))
    }

    pub fn json_with<T>(self, mimetype: &str, validator: JsonValidator) -> Self
    where
        T: DomainType + Serialize + DeserializeOwned,
    {
        self.codec::<T>(Codec::new(
            JsonDocument::<T>::new(),
            mimetype,
            Validator::new(validator),
        ))
    }

    /// Register `T` for parsing only.
    pub fn inbound<T: DomainType>(mut self, codec: Codec) -> Self {
        if self.error.is_none() {
            let mimetype = codec.mimetype().to_string();
            if let Err(e) = self.registries.inbound.register(&mimetype, T::TAG, codec) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Register `T` for rendering only.
    pub fn outbound<T: DomainType>(mut self, codec: Codec) -> Self {
        self.registries.outbound.register_type::<T>(codec);
        self
    }

    pub fn build(self) -> Result<Registries, ConfigError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.registries),
        }
    }
}
