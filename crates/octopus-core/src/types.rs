//! Core Octopus Deploy domain types.
//!
//! This module provides enumerations shared by several resource families: the
//! resource collections exposed by the API and the tenanted deployment mode.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "X-Octopus-ApiKey";

/// Resource collections exposed by the Octopus REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Infrastructure accounts
    Accounts,
    /// X.509 certificates
    Certificates,
    /// Deployment environments
    Environments,
    /// Deployment targets
    Machines,
}

impl ResourceKind {
    /// Returns the collection name as used in request paths.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Accounts => "accounts",
            Self::Certificates => "certificates",
            Self::Environments => "environments",
            Self::Machines => "machines",
        }
    }

    /// Returns every known collection.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Accounts,
            Self::Certificates,
            Self::Environments,
            Self::Machines,
        ]
    }

    /// Returns the URI template for the collection, relative to the API base path.
    #[must_use]
    pub const fn uri_template(&self) -> &'static str {
        match self {
            Self::Accounts => "accounts{/id}{?skip,take,ids,name,partialName,accountType}",
            Self::Certificates => "certificates{/id}{?skip,take,ids,name,partialName,archived}",
            Self::Environments => "environments{/id}{?skip,take,ids,name,partialName}",
            Self::Machines => {
                "machines{/id}{?skip,take,ids,name,partialName,roles,environmentIds,isDisabled}"
            }
        }
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "accounts" => Ok(Self::Accounts),
            "certificates" => Ok(Self::Certificates),
            "environments" => Ok(Self::Environments),
            "machines" => Ok(Self::Machines),
            _ => Err(Error::ConfigError(format!("Unknown resource kind: {s}"))),
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a resource participates in tenanted deployments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenantedDeploymentMode {
    /// Only untenanted deployments
    #[default]
    Untenanted,
    /// Both tenanted and untenanted deployments
    TenantedOrUntenanted,
    /// Only tenanted deployments
    Tenanted,
}

impl TenantedDeploymentMode {
    /// Returns the wire name of the mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Untenanted => "Untenanted",
            Self::TenantedOrUntenanted => "TenantedOrUntenanted",
            Self::Tenanted => "Tenanted",
        }
    }
}
