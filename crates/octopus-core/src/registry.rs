//! Polymorphic entity registry.
//!
//! A variant family is a closed Rust enum whose wire form is one flat JSON object with
//! a discriminator key (`AccountType`, `CommunicationStyle`, `AuthenticationType`).
//! Each family owns a [`Registry`] mapping discriminator values to decode routines,
//! built once and read-only afterwards.
//!
//! Decoding peeks the discriminator before anything else is parsed and fails with
//! [`Error::UnknownVariant`] for values nobody registered. There is no fallback shape.

use serde::de::{self, DeserializeOwned, DeserializeSeed, IgnoredAny, MapAccess, Visitor};
use serde::{Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

type DecodeFn<F> = Box<dyn Fn(Value) -> Result<F> + Send + Sync>;

/// A closed family of entity shapes sharing one discriminator key.
///
/// Implementors serialize as a flat object that includes the discriminator, which
/// `#[serde(tag = "...")]` on the enum provides.
pub trait Family: Serialize + Sized + Send + Sync + 'static {
    /// Family name reported in [`Error::UnknownVariant`].
    const NAME: &'static str;

    /// Wire key holding the discriminator.
    const DISCRIMINATOR: &'static str;

    /// The family's decode table.
    fn registry() -> &'static Registry<Self>;

    /// Discriminator value of this variant.
    fn discriminator(&self) -> &'static str;

    /// Decode a JSON value through the registry.
    fn decode(value: Value) -> Result<Self> {
        Self::registry().decode(value)
    }

    /// Decode a raw JSON body through the registry.
    fn decode_str(body: &str) -> Result<Self> {
        Self::registry().decode_str(body)
    }

    /// Encode to the flat wire object.
    fn encode(&self) -> Result<Value> {
        Self::registry().encode(self)
    }
}

/// Discriminator-to-decoder table for one family.
pub struct Registry<F> {
    family: &'static str,
    discriminator: &'static str,
    decoders: HashMap<&'static str, DecodeFn<F>>,
}

impl<F> fmt::Debug for Registry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("family", &self.family)
            .field("discriminator", &self.discriminator)
            .field("values", &self.values())
            .finish()
    }
}

impl<F: Family> Registry<F> {
    /// Start building the table for `F`.
    #[must_use]
    pub fn builder() -> RegistryBuilder<F> {
        RegistryBuilder {
            registry: Self {
                family: F::NAME,
                discriminator: F::DISCRIMINATOR,
                decoders: HashMap::new(),
            },
        }
    }

    /// Decode a JSON value.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownVariant`] when the discriminator is missing or unregistered;
    /// [`Error::TransportError`] when the value is not an object or does not fit the
    /// variant's shape.
    pub fn decode(&self, value: Value) -> Result<F> {
        let Some(object) = value.as_object() else {
            return Err(Error::TransportError(format!(
                "{} payload is not a JSON object",
                self.family
            )));
        };
        let tag = object
            .get(self.discriminator)
            .map(discriminator_text)
            .unwrap_or_default();
        self.dispatch(&tag, value)
    }

    /// Decode a raw JSON body. The discriminator is checked before the body is parsed
    /// into a value.
    ///
    /// # Errors
    ///
    /// As [`Registry::decode`].
    pub fn decode_str(&self, body: &str) -> Result<F> {
        let mut deserializer = serde_json::Deserializer::from_str(body);
        let tag = PeekDiscriminator(self.discriminator)
            .deserialize(&mut deserializer)?
            .unwrap_or_default();
        self.dispatch(&tag, serde_json::from_str(body)?)
    }

    /// Encode a variant to its flat wire object.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownVariant`] when the variant's discriminator is not registered.
    pub fn encode(&self, entity: &F) -> Result<Value> {
        let tag = entity.discriminator();
        if !self.contains(tag) {
            return Err(Error::unknown_variant(self.family, tag));
        }
        Ok(serde_json::to_value(entity)?)
    }
}

impl<F> Registry<F> {
    /// Family name.
    #[must_use]
    pub const fn family(&self) -> &'static str {
        self.family
    }

    /// Discriminator key.
    #[must_use]
    pub const fn discriminator(&self) -> &'static str {
        self.discriminator
    }

    /// Whether `value` is registered.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.decoders.contains_key(value)
    }

    /// Registered discriminator values, sorted.
    #[must_use]
    pub fn values(&self) -> Vec<&'static str> {
        let mut values: Vec<_> = self.decoders.keys().copied().collect();
        values.sort_unstable();
        values
    }

    fn decoder(&self, tag: &str) -> Result<&DecodeFn<F>> {
        self.decoders
            .get(tag)
            .ok_or_else(|| Error::unknown_variant(self.family, tag))
    }

    /// Decode routines receive the object without its discriminator key.
    fn dispatch(&self, tag: &str, mut value: Value) -> Result<F> {
        let decode = self.decoder(tag)?;
        if let Some(object) = value.as_object_mut() {
            object.remove(self.discriminator);
        }
        decode(value)
    }
}

/// Builder for a [`Registry`].
pub struct RegistryBuilder<F> {
    registry: Registry<F>,
}

impl<F: Family> RegistryBuilder<F> {
    /// Register a variant decoded directly by serde and wrapped into the family.
    ///
    /// # Panics
    ///
    /// Panics if `value` is already registered.
    #[must_use]
    pub fn variant<V>(self, value: &'static str, wrap: fn(V) -> F) -> Self
    where
        V: DeserializeOwned + 'static,
    {
        self.variant_with(value, move |object| {
            Ok(wrap(serde_json::from_value(object)?))
        })
    }

    /// Register a variant with a custom decode routine, for variants that hold nested
    /// families.
    ///
    /// # Panics
    ///
    /// Panics if `value` is already registered.
    #[must_use]
    pub fn variant_with<D>(mut self, value: &'static str, decode: D) -> Self
    where
        D: Fn(Value) -> Result<F> + Send + Sync + 'static,
    {
        assert!(
            !self.registry.contains(value),
            "duplicate {} discriminator `{value}`",
            self.registry.family
        );
        self.registry.decoders.insert(value, Box::new(decode));
        self
    }

    /// Finish the table.
    #[must_use]
    pub fn build(self) -> Registry<F> {
        self.registry
    }
}

/// Remove `key` from `object` and decode it as a nested family member.
///
/// A missing or `null` key yields `None`.
///
/// # Errors
///
/// Propagates the nested family's decode errors, including [`Error::UnknownVariant`].
pub fn decode_nested<N: Family>(object: &mut Value, key: &str) -> Result<Option<N>> {
    match object.as_object_mut().and_then(|map| map.remove(key)) {
        None | Some(Value::Null) => Ok(None),
        Some(nested) => N::decode(nested).map(Some),
    }
}

fn discriminator_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Reads one key of a JSON object and skips everything else.
struct PeekDiscriminator(&'static str);

impl<'de> DeserializeSeed<'de> for PeekDiscriminator {
    type Value = Option<String>;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for PeekDiscriminator {
    type Value = Option<String>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "a JSON object with a `{}` key", self.0)
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut found = None;
        while let Some(key) = map.next_key::<std::borrow::Cow<'de, str>>()? {
            if found.is_none() && key == self.0 {
                let value: Value = map.next_value()?;
                found = Some(discriminator_text(&value));
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(found)
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(None)
    }
}
