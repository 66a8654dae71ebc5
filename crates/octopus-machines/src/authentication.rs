//! Kubernetes authentication family.
//!
//! Nested inside a Kubernetes endpoint under `Authentication` and keyed by
//! `AuthenticationType`. These are value objects, not resources: no envelope.

use octopus_core::registry::{Family, Registry};
use octopus_core::validation::not_blank;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::OnceLock;
use validator::{Validate, ValidationErrors};

/// Wire key carrying the authentication discriminator.
pub const AUTHENTICATION_TYPE: &str = "AuthenticationType";

/// Discriminator values of the Kubernetes authentication family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthenticationType {
    /// Account-based (token or username/password account).
    KubernetesStandard,
    /// AWS account or instance role.
    KubernetesAws,
    /// Azure service principal.
    KubernetesAzure,
    /// Client certificate.
    KubernetesCertificate,
    /// Google Cloud account.
    KubernetesGoogleCloud,
    /// Pod service account token.
    KubernetesPodService,
}

impl AuthenticationType {
    /// Every authentication type.
    pub const ALL: [Self; 6] = [
        Self::KubernetesStandard,
        Self::KubernetesAws,
        Self::KubernetesAzure,
        Self::KubernetesCertificate,
        Self::KubernetesGoogleCloud,
        Self::KubernetesPodService,
    ];

    /// Wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::KubernetesStandard => "KubernetesStandard",
            Self::KubernetesAws => "KubernetesAws",
            Self::KubernetesAzure => "KubernetesAzure",
            Self::KubernetesCertificate => "KubernetesCertificate",
            Self::KubernetesGoogleCloud => "KubernetesGoogleCloud",
            Self::KubernetesPodService => "KubernetesPodService",
        }
    }
}

impl fmt::Display for AuthenticationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticates with an Octopus account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct KubernetesStandardAuthentication {
    /// Account id.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub account_id: String,
    /// Fields this client does not model, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl KubernetesStandardAuthentication {
    /// Authenticate with `account_id`.
    #[must_use]
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            ..Self::default()
        }
    }
}

/// Authenticates against EKS.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct KubernetesAwsAuthentication {
    /// AWS account id; unused with an instance role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// EKS cluster name.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub cluster_name: String,
    /// Use the worker's EC2 instance role.
    #[serde(default)]
    pub use_instance_role: bool,
    /// Assume a role after authenticating.
    #[serde(default)]
    pub assume_role: bool,
    /// Role ARN to assume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assumed_role_arn: Option<String>,
    /// Session name for the assumed role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assumed_role_session: Option<String>,
    /// Fields this client does not model, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Authenticates against AKS.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct KubernetesAzureAuthentication {
    /// Azure service principal account id.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub account_id: String,
    /// AKS cluster name.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub cluster_name: String,
    /// Resource group holding the cluster.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub cluster_resource_group: String,
    /// Use the cluster admin credentials.
    #[serde(default)]
    pub admin_login: bool,
    /// Fields this client does not model, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Authenticates with a client certificate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct KubernetesCertificateAuthentication {
    /// Certificate id.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub client_certificate: String,
    /// Fields this client does not model, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Authenticates against GKE.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct KubernetesGoogleCloudAuthentication {
    /// Google Cloud account id; unused with the VM service account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// GKE cluster name.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub cluster_name: String,
    /// Project id.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub project: String,
    /// Region of a regional cluster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Zone of a zonal cluster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    /// Use the worker VM's service account.
    #[serde(default)]
    pub use_vm_service_account: bool,
    /// Impersonate service accounts.
    #[serde(default)]
    pub impersonate_service_account: bool,
    /// Service account emails to impersonate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_emails: Option<String>,
    /// Fields this client does not model, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Authenticates with a pod service account token file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct KubernetesPodAuthentication {
    /// Path to the token file.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub token_path: String,
    /// Fields this client does not model, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// How a Kubernetes endpoint authenticates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "AuthenticationType")]
pub enum KubernetesAuthentication {
    /// Account-based.
    KubernetesStandard(KubernetesStandardAuthentication),
    /// EKS.
    KubernetesAws(KubernetesAwsAuthentication),
    /// AKS.
    KubernetesAzure(KubernetesAzureAuthentication),
    /// Client certificate.
    KubernetesCertificate(KubernetesCertificateAuthentication),
    /// GKE.
    KubernetesGoogleCloud(KubernetesGoogleCloudAuthentication),
    /// Pod service account.
    KubernetesPodService(KubernetesPodAuthentication),
}

macro_rules! authentication_variants {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        impl KubernetesAuthentication {
            /// Discriminator of this authentication.
            #[must_use]
            pub const fn authentication_type(&self) -> AuthenticationType {
                match self {
                    $(Self::$variant(_) => AuthenticationType::$variant,)+
                }
            }
        }

        impl Validate for KubernetesAuthentication {
            fn validate(&self) -> std::result::Result<(), ValidationErrors> {
                match self {
                    $(Self::$variant(authentication) => authentication.validate(),)+
                }
            }
        }

        fn build_registry() -> Registry<KubernetesAuthentication> {
            Registry::builder()
                $(.variant(
                    AuthenticationType::$variant.as_str(),
                    KubernetesAuthentication::$variant,
                ))+
                .build()
        }

        $(
            impl From<$ty> for KubernetesAuthentication {
                fn from(authentication: $ty) -> Self {
                    Self::$variant(authentication)
                }
            }
        )+
    };
}

authentication_variants! {
    KubernetesStandard => KubernetesStandardAuthentication,
    KubernetesAws => KubernetesAwsAuthentication,
    KubernetesAzure => KubernetesAzureAuthentication,
    KubernetesCertificate => KubernetesCertificateAuthentication,
    KubernetesGoogleCloud => KubernetesGoogleCloudAuthentication,
    KubernetesPodService => KubernetesPodAuthentication,
}

impl Family for KubernetesAuthentication {
    const NAME: &'static str = "KubernetesAuthentication";
    const DISCRIMINATOR: &'static str = AUTHENTICATION_TYPE;

    fn registry() -> &'static Registry<Self> {
        static REGISTRY: OnceLock<Registry<KubernetesAuthentication>> = OnceLock::new();
        REGISTRY.get_or_init(build_registry)
    }

    fn discriminator(&self) -> &'static str {
        self.authentication_type().as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octopus_core::Error;
    use serde_json::json;

    #[test]
    fn every_authentication_type_is_registered() {
        let registry = KubernetesAuthentication::registry();
        for authentication_type in AuthenticationType::ALL {
            assert!(registry.contains(authentication_type.as_str()));
        }
    }

    #[test]
    fn standard_authentication_wire_shape() {
        let authentication =
            KubernetesAuthentication::from(KubernetesStandardAuthentication::new("Accounts-392"));
        assert_eq!(
            authentication.encode().unwrap(),
            json!({ "AuthenticationType": "KubernetesStandard", "AccountId": "Accounts-392" })
        );
    }

    #[test]
    fn certificate_authentication_decodes() {
        let authentication = KubernetesAuthentication::decode(json!({
            "AuthenticationType": "KubernetesCertificate",
            "ClientCertificate": "Client-certificate"
        }))
        .unwrap();
        assert_eq!(
            authentication,
            KubernetesAuthentication::KubernetesCertificate(KubernetesCertificateAuthentication {
                client_certificate: "Client-certificate".to_string(),
                ..KubernetesCertificateAuthentication::default()
            })
        );
    }

    #[test]
    fn aws_round_trip() {
        let wire = json!({
            "AuthenticationType": "KubernetesAws",
            "ClusterName": "eks-prod",
            "UseInstanceRole": true,
            "AssumeRole": true,
            "AssumedRoleArn": "arn:aws:iam::123456789012:role/deployer",
            "AssumedRoleSession": "octopus"
        });
        let authentication = KubernetesAuthentication::decode(wire.clone()).unwrap();
        assert_eq!(
            authentication.authentication_type(),
            AuthenticationType::KubernetesAws
        );
        assert_eq!(authentication.encode().unwrap(), wire);
    }

    #[test]
    fn unknown_authentication_type_is_rejected() {
        let err = KubernetesAuthentication::decode(json!({
            "AuthenticationType": "KubernetesTokenExchange"
        }))
        .unwrap_err();
        assert_eq!(
            err,
            Error::unknown_variant("KubernetesAuthentication", "KubernetesTokenExchange")
        );
    }

    #[test]
    fn validation_requires_variant_fields() {
        assert!(
            KubernetesAuthentication::from(KubernetesStandardAuthentication::new(""))
                .validate()
                .is_err()
        );
        assert!(KubernetesAuthentication::from(KubernetesPodAuthentication {
            token_path: "/var/run/secrets/kubernetes.io/serviceaccount/token".to_string(),
            ..KubernetesPodAuthentication::default()
        })
        .validate()
        .is_ok());
        assert!(
            KubernetesAuthentication::from(KubernetesAzureAuthentication {
                account_id: "Accounts-1".to_string(),
                cluster_name: "aks".to_string(),
                ..KubernetesAzureAuthentication::default()
            })
            .validate()
            .is_err()
        );
    }
}
