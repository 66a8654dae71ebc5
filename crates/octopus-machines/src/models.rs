//! Deployment target models.

use octopus_core::registry::decode_nested;
use octopus_core::service::Entity;
use octopus_core::validation::not_blank;
use octopus_core::{Resource, TenantedDeploymentMode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::endpoint::Endpoint;
use crate::Result;

/// Fields of a deployment target other than its endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct MachineDetails {
    /// Display name, unique per space.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    /// Environments the target belongs to.
    #[serde(default)]
    #[validate(length(min = 1))]
    pub environment_ids: Vec<String>,
    /// Target roles (tags).
    #[serde(default)]
    #[validate(length(min = 1))]
    pub roles: Vec<String>,
    /// Disabled targets are skipped by deployments.
    #[serde(default)]
    pub is_disabled: bool,
    /// Machine policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_policy_id: Option<String>,
    /// Tenanted deployment participation.
    #[serde(default)]
    pub tenanted_deployment_participation: TenantedDeploymentMode,
    /// Tenants the target serves.
    #[serde(default)]
    pub tenant_ids: Vec<String>,
    /// Tenant tags the target serves.
    #[serde(default)]
    pub tenant_tags: Vec<String>,
    /// Health reported by the server (e.g. `Healthy`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_status: Option<String>,
    /// Status reported by the server (e.g. `Online`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Status summary reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_summary: Option<String>,
    /// Owning space.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    /// Endpoint URI mirrored at the top level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Endpoint thumbprint mirrored at the top level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbprint: Option<String>,
}

/// A deployment target.
///
/// The endpoint arrives as a nested object under `Endpoint` and is decoded through
/// the [`Endpoint`] registry, so an unrecognized `CommunicationStyle` fails the
/// whole machine with `UnknownVariant`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Machine {
    /// Identity envelope.
    #[serde(flatten)]
    pub resource: Resource,
    /// Everything but the endpoint.
    #[serde(flatten)]
    pub details: MachineDetails,
    /// How Octopus reaches the target.
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Endpoint>,
    /// Fields this client does not model, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Machine {
    /// New target with a name, its environments, roles and endpoint.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        environment_ids: Vec<String>,
        roles: Vec<String>,
        endpoint: impl Into<Endpoint>,
    ) -> Self {
        Self {
            resource: Resource::new(),
            details: MachineDetails {
                name: name.into(),
                environment_ids,
                roles,
                ..MachineDetails::default()
            },
            endpoint: Some(endpoint.into()),
            extra: Map::new(),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.details.name
    }
}

impl Validate for Machine {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = match self.details.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        match self.endpoint.as_ref().map(Validate::validate) {
            None => errors.add("endpoint", ValidationError::new("required")),
            Some(Err(nested)) => errors.add(
                "endpoint",
                ValidationError::new("invalid").with_message(nested.to_string().into()),
            ),
            Some(Ok(())) => {}
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Entity for Machine {
    const KIND: &'static str = "Machine";

    fn from_value(mut value: Value) -> Result<Self> {
        let endpoint = decode_nested::<Endpoint>(&mut value, "Endpoint")?;
        let mut machine: Self = serde_json::from_value(value)?;
        machine.endpoint = endpoint;
        Ok(machine)
    }

    fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn resource(&self) -> &Resource {
        &self.resource
    }
}
