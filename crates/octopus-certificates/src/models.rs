//! Certificate models.

use chrono::{DateTime, Utc};
use octopus_core::service::Entity;
use octopus_core::validation::{has_secret, not_blank};
use octopus_core::{Resource, SensitiveValue, TenantedDeploymentMode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use validator::Validate;

use crate::Result;

/// A certificate stored in the Octopus certificate library.
///
/// Fields from `CertificateDataFormat` down are computed by the server from the
/// uploaded data and are ignored when sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct Certificate {
    /// Identity envelope.
    #[serde(flatten)]
    pub resource: Resource,
    /// Display name, unique per space.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Base64 certificate file (PFX, PEM or DER).
    #[serde(default)]
    #[validate(custom(function = "has_secret"))]
    pub certificate_data: SensitiveValue,
    /// Password protecting the certificate file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<SensitiveValue>,
    /// Environments the certificate is scoped to; empty means all.
    #[serde(default)]
    pub environment_ids: Vec<String>,
    /// Tenanted deployment participation.
    #[serde(default)]
    pub tenanted_deployment_participation: TenantedDeploymentMode,
    /// Tenants the certificate is scoped to.
    #[serde(default)]
    pub tenant_ids: Vec<String>,
    /// Tenant tags the certificate is scoped to.
    #[serde(default)]
    pub tenant_tags: Vec<String>,
    /// Owning space.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    /// Format of the uploaded data (e.g. `Pkcs12`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_data_format: Option<String>,
    /// When the certificate was archived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<DateTime<Utc>>,
    /// Certificate that replaced this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<String>,
    /// Subject distinguished name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_distinguished_name: Option<String>,
    /// Subject common name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_common_name: Option<String>,
    /// Subject organization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_organization: Option<String>,
    /// Issuer distinguished name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_distinguished_name: Option<String>,
    /// Issuer common name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_common_name: Option<String>,
    /// Issuer organization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_organization: Option<String>,
    /// Whether the issuer is the subject.
    #[serde(default)]
    pub self_signed: bool,
    /// SHA-1 thumbprint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbprint: Option<String>,
    /// End of validity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_after: Option<DateTime<Utc>>,
    /// Start of validity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<Utc>>,
    /// Whether `not_after` has passed, as computed by the server.
    #[serde(default)]
    pub is_expired: bool,
    /// Whether the upload included a private key.
    #[serde(default)]
    pub has_private_key: bool,
    /// X.509 version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Serial number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    /// Signature algorithm (e.g. `sha256RSA`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_algorithm_name: Option<String>,
    /// Subject alternative names.
    #[serde(default)]
    pub subject_alternative_names: Vec<String>,
    /// Fields this client does not model, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Certificate {
    /// New certificate with its data and optional password.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        certificate_data: SensitiveValue,
        password: Option<SensitiveValue>,
    ) -> Self {
        Self {
            name: name.into(),
            certificate_data,
            password,
            ..Self::default()
        }
    }

    /// Whether the certificate has been archived.
    #[must_use]
    pub const fn is_archived(&self) -> bool {
        self.archived.is_some()
    }
}

impl Entity for Certificate {
    const KIND: &'static str = "Certificate";

    fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn resource(&self) -> &Resource {
        &self.resource
    }
}

/// Body of the `replace` action: new certificate data for an existing certificate.
///
/// Unlike [`SensitiveValue`] these travel as bare strings.
pub struct CertificateReplace {
    certificate_data: SecretString,
    password: Option<SecretString>,
}

impl CertificateReplace {
    /// Replacement data, base64 encoded.
    #[must_use]
    pub fn new(certificate_data: impl Into<String>) -> Self {
        Self {
            certificate_data: SecretString::from(certificate_data.into()),
            password: None,
        }
    }

    /// Password protecting the replacement data.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Whether replacement data was supplied.
    #[must_use]
    pub fn has_data(&self) -> bool {
        !self.certificate_data.expose_secret().trim().is_empty()
    }
}

impl fmt::Debug for CertificateReplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateReplace")
            .field("certificate_data", &"[REDACTED]")
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CertificateReplaceOut<'a> {
    certificate_data: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
}

impl Serialize for CertificateReplace {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        CertificateReplaceOut {
            certificate_data: self.certificate_data.expose_secret(),
            password: self.password.as_ref().map(ExposeSecret::expose_secret),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_certificate_sends_secrets() {
        let certificate = Certificate::new(
            "wildcard",
            SensitiveValue::new("MIIKcQIBAzCCCjcGCSqGSIb3DQEHAa"),
            Some(SensitiveValue::new("hunter2")),
        );
        let value = certificate.to_value().unwrap();
        assert_eq!(value["Name"], "wildcard");
        assert_eq!(
            value["CertificateData"],
            json!({ "HasValue": true, "NewValue": "MIIKcQIBAzCCCjcGCSqGSIb3DQEHAa" })
        );
        assert_eq!(value["Password"]["NewValue"], "hunter2");
        assert!(value.get("Thumbprint").is_none());
        assert!(certificate.validate().is_ok());
    }

    #[test]
    fn decodes_server_fields() {
        let certificate = Certificate::from_value(json!({
            "Id": "Certificates-1",
            "Name": "wildcard",
            "CertificateData": { "HasValue": true },
            "Password": { "HasValue": false },
            "CertificateDataFormat": "Pkcs12",
            "Archived": null,
            "SubjectCommonName": "*.example.com",
            "SelfSigned": true,
            "Thumbprint": "D6A2D7E3F6B3F5E1",
            "NotAfter": "2030-10-06T23:53:42.000+00:00",
            "NotBefore": "2020-10-06T23:53:42.000+00:00",
            "IsExpired": false,
            "HasPrivateKey": true,
            "Version": 3,
            "SubjectAlternativeNames": ["*.example.com", "example.com"]
        }))
        .unwrap();

        assert_eq!(certificate.resource().id(), Some("Certificates-1"));
        assert!(certificate.certificate_data.has_value());
        assert!(certificate.certificate_data.new_value().is_none());
        assert!(!certificate.is_archived());
        assert!(certificate.self_signed);
        assert_eq!(certificate.version, Some(3));
        assert_eq!(
            certificate.not_after.map(|t| t.timestamp()),
            Some(1_917_561_222)
        );
        assert_eq!(certificate.subject_alternative_names.len(), 2);
        assert!(certificate.extra.is_empty());
    }

    #[test]
    fn unmodeled_fields_survive_round_trip() {
        let wire = json!({
            "Id": "Certificates-2",
            "Name": "api",
            "Slug": "api",
            "CertificateData": { "HasValue": true },
            "EnvironmentIds": [],
            "TenantedDeploymentParticipation": "Untenanted",
            "TenantIds": [],
            "TenantTags": [],
            "SelfSigned": false,
            "IsExpired": false,
            "HasPrivateKey": true,
            "SubjectAlternativeNames": [],
            "CertificateChain": [{ "Thumbprint": "AB12" }]
        });
        let certificate = Certificate::from_value(wire.clone()).unwrap();
        assert_eq!(certificate.extra.len(), 2);
        assert_eq!(certificate.to_value().unwrap(), wire);
    }

    #[test]
    fn validation_requires_name_and_data() {
        let missing_data = Certificate::new("wildcard", SensitiveValue::empty(), None);
        assert!(missing_data.validate().is_err());

        let blank_name = Certificate::new(" ", SensitiveValue::new("MIIK"), None);
        assert!(blank_name.validate().is_err());
    }

    #[test]
    fn replace_body_is_bare_strings() {
        let replace = CertificateReplace::new("MIIKcQ").with_password("hunter2");
        assert_eq!(
            serde_json::to_value(&replace).unwrap(),
            json!({ "CertificateData": "MIIKcQ", "Password": "hunter2" })
        );
        assert_eq!(
            serde_json::to_value(CertificateReplace::new("MIIKcQ")).unwrap(),
            json!({ "CertificateData": "MIIKcQ" })
        );
    }

    #[test]
    fn replace_debug_is_redacted() {
        let replace = CertificateReplace::new("MIIKcQ").with_password("hunter2");
        let debug = format!("{replace:?}");
        assert!(!debug.contains("MIIKcQ"));
        assert!(!debug.contains("hunter2"));
        assert!(!CertificateReplace::new("  ").has_data());
    }
}
