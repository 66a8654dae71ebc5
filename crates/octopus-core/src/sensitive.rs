//! Write-only secret fields.
//!
//! The server never echoes a secret back; it only reports whether one is set. A
//! [`SensitiveValue`] decoded from a response therefore never carries content, even
//! if the payload happened to include a `NewValue`.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SensitiveValueOut<'a> {
    has_value: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_value: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'a str>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SensitiveValueIn {
    #[serde(default)]
    has_value: bool,
    #[serde(default)]
    hint: Option<String>,
}

/// A secret-valued field.
#[derive(Default)]
pub struct SensitiveValue {
    has_value: bool,
    new_value: Option<SecretString>,
    hint: Option<String>,
}

impl SensitiveValue {
    /// A client-side value carrying a new secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            has_value: true,
            new_value: Some(SecretString::from(secret.into())),
            hint: None,
        }
    }

    /// A value that explicitly clears the secret.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attach a display hint.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Whether a secret is set (server-side or pending).
    #[must_use]
    pub const fn has_value(&self) -> bool {
        self.has_value
    }

    /// The secret to send, if this value was constructed client-side.
    #[must_use]
    pub fn new_value(&self) -> Option<&SecretString> {
        self.new_value.as_ref()
    }

    /// Display hint supplied by the server or the caller.
    #[must_use]
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }
}

impl Clone for SensitiveValue {
    fn clone(&self) -> Self {
        Self {
            has_value: self.has_value,
            new_value: self
                .new_value
                .as_ref()
                .map(|secret| SecretString::from(secret.expose_secret().to_owned())),
            hint: self.hint.clone(),
        }
    }
}

impl PartialEq for SensitiveValue {
    fn eq(&self, other: &Self) -> bool {
        self.has_value == other.has_value
            && self.hint == other.hint
            && self.new_value.as_ref().map(ExposeSecret::expose_secret)
                == other.new_value.as_ref().map(ExposeSecret::expose_secret)
    }
}

impl fmt::Debug for SensitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensitiveValue")
            .field("has_value", &self.has_value)
            .field("new_value", &self.new_value.as_ref().map(|_| "[REDACTED]"))
            .field("hint", &self.hint)
            .finish()
    }
}

impl Serialize for SensitiveValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        SensitiveValueOut {
            has_value: self.has_value,
            new_value: self.new_value.as_ref().map(ExposeSecret::expose_secret),
            hint: self.hint.as_deref(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SensitiveValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = Option::<SensitiveValueIn>::deserialize(deserializer)?.unwrap_or_default();
        Ok(Self {
            has_value: wire.has_value,
            new_value: None,
            hint: wire.hint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_value_serializes_secret() {
        let value = SensitiveValue::new("hunter2");
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({ "HasValue": true, "NewValue": "hunter2" })
        );
    }

    #[test]
    fn decoded_value_never_carries_secret() {
        let value: SensitiveValue =
            serde_json::from_value(json!({ "HasValue": true, "NewValue": "********" })).unwrap();

        assert!(value.has_value());
        assert!(value.new_value().is_none());
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({ "HasValue": true })
        );
    }

    #[test]
    fn decoded_value_keeps_hint() {
        let value: SensitiveValue =
            serde_json::from_value(json!({ "HasValue": true, "Hint": "ends in 42" })).unwrap();
        assert_eq!(value.hint(), Some("ends in 42"));
    }

    #[test]
    fn null_decodes_as_empty() {
        let value: SensitiveValue = serde_json::from_value(json!(null)).unwrap();
        assert!(!value.has_value());
    }

    #[test]
    fn debug_is_redacted() {
        let rendered = format!("{:?}", SensitiveValue::new("hunter2"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn clone_and_eq_compare_secret() {
        let value = SensitiveValue::new("a");
        assert_eq!(value.clone(), value);
        assert_ne!(SensitiveValue::new("a"), SensitiveValue::new("b"));
        assert!(!SensitiveValue::empty().has_value());
    }
}
