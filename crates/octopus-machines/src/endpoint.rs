//! Endpoint family.
//!
//! A deployment target's `Endpoint` says how Octopus reaches it and is keyed by
//! `CommunicationStyle`. The Kubernetes endpoint nests a second family under
//! `Authentication`, decoded through its own registry.

use octopus_core::registry::{decode_nested, Family, Registry};
use octopus_core::validation::{absolute_url, not_blank};
use octopus_core::Resource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::OnceLock;
use validator::{Validate, ValidationErrors};

use crate::authentication::KubernetesAuthentication;
use crate::Result;

/// Wire key carrying the endpoint discriminator.
pub const COMMUNICATION_STYLE: &str = "CommunicationStyle";

/// Discriminator values of the endpoint family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommunicationStyle {
    /// Kubernetes cluster.
    Kubernetes,
    /// SSH connection.
    Ssh,
    /// Listening tentacle.
    TentaclePassive,
    /// Polling tentacle.
    TentacleActive,
    /// Offline package drop.
    OfflineDrop,
    /// Cloud region; no agent.
    #[serde(rename = "None")]
    CloudRegion,
}

impl CommunicationStyle {
    /// Every communication style.
    pub const ALL: [Self; 6] = [
        Self::Kubernetes,
        Self::Ssh,
        Self::TentaclePassive,
        Self::TentacleActive,
        Self::OfflineDrop,
        Self::CloudRegion,
    ];

    /// Wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Kubernetes => "Kubernetes",
            Self::Ssh => "Ssh",
            Self::TentaclePassive => "TentaclePassive",
            Self::TentacleActive => "TentacleActive",
            Self::OfflineDrop => "OfflineDrop",
            Self::CloudRegion => "None",
        }
    }
}

impl fmt::Display for CommunicationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Container the Kubernetes steps run in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeploymentActionContainer {
    /// Image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Feed the image is pulled from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_id: Option<String>,
}

/// Kubernetes cluster endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct KubernetesEndpoint {
    /// Identity envelope.
    #[serde(flatten)]
    pub resource: Resource,
    /// How to authenticate; decoded through [`KubernetesAuthentication`]'s registry.
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<KubernetesAuthentication>,
    /// Cluster API URL.
    #[serde(default, rename = "ClusterUrl")]
    #[validate(custom(function = "absolute_url"))]
    pub cluster_url: String,
    /// Certificate id of the cluster CA.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_certificate: Option<String>,
    /// Default namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Skip TLS verification of the cluster API. Travels as `"True"`/`"False"`.
    #[serde(default, with = "bool_string")]
    pub skip_tls_verification: bool,
    /// Worker pool used for steps targeting the cluster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_worker_pool_id: Option<String>,
    /// Proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_id: Option<String>,
    /// Whether steps run in a container.
    #[serde(default)]
    pub running_in_container: bool,
    /// Container for steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<DeploymentActionContainer>,
    /// Fields this client does not model, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl KubernetesEndpoint {
    /// New endpoint for a cluster URL.
    #[must_use]
    pub fn new(cluster_url: impl Into<String>) -> Self {
        Self {
            cluster_url: cluster_url.into(),
            ..Self::default()
        }
    }

    /// Set the authentication.
    #[must_use]
    pub fn with_authentication(mut self, authentication: impl Into<KubernetesAuthentication>) -> Self {
        self.authentication = Some(authentication.into());
        self
    }

    fn decode(mut value: Value) -> Result<Endpoint> {
        let authentication = decode_nested::<KubernetesAuthentication>(&mut value, "Authentication")?;
        let mut endpoint: Self = serde_json::from_value(value)?;
        endpoint.authentication = authentication;
        Ok(Endpoint::Kubernetes(endpoint))
    }
}

/// SSH endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct SshEndpoint {
    /// Identity envelope.
    #[serde(flatten)]
    pub resource: Resource,
    /// Host name or address.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub host: String,
    /// SSH port.
    #[serde(default = "default_ssh_port")]
    pub port: u16,
    /// Host key fingerprint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    /// SSH key pair or username/password account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// .NET platform of the target (e.g. `linux-x64`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dot_net_core_platform: Option<String>,
    /// Proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_id: Option<String>,
    /// Fields this client does not model, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const fn default_ssh_port() -> u16 {
    22
}

impl SshEndpoint {
    /// New endpoint for a host on the default port.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_ssh_port(),
            ..Self::default()
        }
    }
}

/// Listening tentacle endpoint; Octopus connects to the tentacle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct ListeningTentacleEndpoint {
    /// Identity envelope.
    #[serde(flatten)]
    pub resource: Resource,
    /// Tentacle URI (e.g. `https://web01:10933/`).
    #[serde(default)]
    #[validate(custom(function = "absolute_url"))]
    pub uri: String,
    /// Tentacle certificate thumbprint.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub thumbprint: String,
    /// Proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_id: Option<String>,
    /// Fields this client does not model, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Polling tentacle endpoint; the tentacle connects to Octopus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct PollingTentacleEndpoint {
    /// Identity envelope.
    #[serde(flatten)]
    pub resource: Resource,
    /// Subscription URI (e.g. `poll://abc123/`).
    #[serde(default)]
    #[validate(custom(function = "absolute_url"))]
    pub uri: String,
    /// Tentacle certificate thumbprint.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub thumbprint: String,
    /// Fields this client does not model, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Where an offline drop writes packages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OfflineDropDestination {
    /// Destination kind (e.g. `FileSystem`, `Artifact`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_type: Option<String>,
    /// Folder for file-system drops.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_folder_path: Option<String>,
}

/// Offline package drop endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct OfflinePackageDropEndpoint {
    /// Identity envelope.
    #[serde(flatten)]
    pub resource: Resource,
    /// Drop destination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<OfflineDropDestination>,
    /// Directory applications are extracted to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applications_directory: Option<String>,
    /// Working directory for the drop.
    #[serde(default, rename = "OctopusWorkingDirectory", skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    /// Fields this client does not model, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Cloud region endpoint; steps run on workers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct CloudRegionEndpoint {
    /// Identity envelope.
    #[serde(flatten)]
    pub resource: Resource,
    /// Worker pool used for steps targeting the region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_worker_pool_id: Option<String>,
    /// Fields this client does not model, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// How Octopus communicates with a deployment target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "CommunicationStyle")]
pub enum Endpoint {
    /// Kubernetes cluster.
    Kubernetes(KubernetesEndpoint),
    /// SSH.
    Ssh(SshEndpoint),
    /// Listening tentacle.
    TentaclePassive(ListeningTentacleEndpoint),
    /// Polling tentacle.
    TentacleActive(PollingTentacleEndpoint),
    /// Offline package drop.
    OfflineDrop(OfflinePackageDropEndpoint),
    /// Cloud region.
    #[serde(rename = "None")]
    CloudRegion(CloudRegionEndpoint),
}

macro_rules! endpoint_variants {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        impl Endpoint {
            /// Discriminator of this endpoint.
            #[must_use]
            pub const fn communication_style(&self) -> CommunicationStyle {
                match self {
                    $(Self::$variant(_) => CommunicationStyle::$variant,)+
                }
            }

            /// Identity envelope.
            #[must_use]
            pub const fn resource(&self) -> &Resource {
                match self {
                    $(Self::$variant(endpoint) => &endpoint.resource,)+
                }
            }

            /// Wire fields outside the endpoint model.
            #[must_use]
            pub const fn extra(&self) -> &Map<String, Value> {
                match self {
                    $(Self::$variant(endpoint) => &endpoint.extra,)+
                }
            }
        }

        $(
            impl From<$ty> for Endpoint {
                fn from(endpoint: $ty) -> Self {
                    Self::$variant(endpoint)
                }
            }
        )+
    };
}

endpoint_variants! {
    Kubernetes => KubernetesEndpoint,
    Ssh => SshEndpoint,
    TentaclePassive => ListeningTentacleEndpoint,
    TentacleActive => PollingTentacleEndpoint,
    OfflineDrop => OfflinePackageDropEndpoint,
    CloudRegion => CloudRegionEndpoint,
}

impl Validate for Endpoint {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        match self {
            Self::Kubernetes(endpoint) => {
                endpoint.validate()?;
                match &endpoint.authentication {
                    Some(authentication) => authentication.validate(),
                    None => Ok(()),
                }
            }
            Self::Ssh(endpoint) => endpoint.validate(),
            Self::TentaclePassive(endpoint) => endpoint.validate(),
            Self::TentacleActive(endpoint) => endpoint.validate(),
            Self::OfflineDrop(endpoint) => endpoint.validate(),
            Self::CloudRegion(endpoint) => endpoint.validate(),
        }
    }
}

impl Family for Endpoint {
    const NAME: &'static str = "Endpoint";
    const DISCRIMINATOR: &'static str = COMMUNICATION_STYLE;

    fn registry() -> &'static Registry<Self> {
        static REGISTRY: OnceLock<Registry<Endpoint>> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            Registry::builder()
                .variant_with(CommunicationStyle::Kubernetes.as_str(), KubernetesEndpoint::decode)
                .variant(CommunicationStyle::Ssh.as_str(), Endpoint::Ssh)
                .variant(
                    CommunicationStyle::TentaclePassive.as_str(),
                    Endpoint::TentaclePassive,
                )
                .variant(
                    CommunicationStyle::TentacleActive.as_str(),
                    Endpoint::TentacleActive,
                )
                .variant(CommunicationStyle::OfflineDrop.as_str(), Endpoint::OfflineDrop)
                .variant(CommunicationStyle::CloudRegion.as_str(), Endpoint::CloudRegion)
                .build()
        })
    }

    fn discriminator(&self) -> &'static str {
        self.communication_style().as_str()
    }
}

mod bool_string {
    use serde::de::{Error, Unexpected};
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Bool(bool),
        Text(String),
    }

    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(if *value { "True" } else { "False" })
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Wire::deserialize(deserializer)? {
            Wire::Bool(value) => Ok(value),
            Wire::Text(text) if text.eq_ignore_ascii_case("true") => Ok(true),
            Wire::Text(text) if text.is_empty() || text.eq_ignore_ascii_case("false") => Ok(false),
            Wire::Text(text) => Err(D::Error::invalid_value(
                Unexpected::Str(&text),
                &"\"True\" or \"False\"",
            )),
        }
    }
}
