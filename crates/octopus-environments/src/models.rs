//! Environment models.

use octopus_core::service::Entity;
use octopus_core::validation::not_blank;
use octopus_core::Resource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::Result;

/// A deployment environment (e.g. `Development`, `Production`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct Environment {
    /// Identity envelope.
    #[serde(flatten)]
    pub resource: Resource,
    /// Display name, unique per space.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Position in the environment list.
    #[serde(default)]
    pub sort_order: i32,
    /// Pause failed deployments for manual intervention.
    #[serde(default)]
    pub use_guided_failure: bool,
    /// Allow deployment targets to be created by deployments.
    #[serde(default)]
    pub allow_dynamic_infrastructure: bool,
    /// Owning space.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    /// Fields this client does not model, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Environment {
    /// New environment with a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Entity for Environment {
    const KIND: &'static str = "Environment";

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
