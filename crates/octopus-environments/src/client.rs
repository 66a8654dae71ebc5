//! Asynchronous service for the `environments` collection.

use crate::models::Environment;
use crate::Result;
use octopus_core::{Engine, Error, ResourceKind, ResourceService};
use serde_json::{json, Value};
use tracing::info;

/// Service for deployment environments.
#[derive(Debug, Clone)]
pub struct EnvironmentService {
    inner: ResourceService<Environment>,
}

impl EnvironmentService {
    /// Create a service over a shared engine.
    pub fn new(engine: Engine) -> Result<Self> {
        Ok(Self {
            inner: ResourceService::for_kind(engine, ResourceKind::Environments)?,
        })
    }

    /// Fetch an environment by id.
    pub async fn get_by_id(&self, id: &str) -> Result<Environment> {
        self.inner.get_by_id(id).await
    }

    /// Fetch every environment.
    pub async fn get_all(&self) -> Result<Vec<Environment>> {
        self.inner.get_all().await
    }

    /// Fetch environments by id.
    pub async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<Environment>> {
        self.inner.get_by_ids(ids).await
    }

    /// Fetch environments with an exact name.
    pub async fn get_by_name(&self, name: &str) -> Result<Vec<Environment>> {
        self.inner.get_by_name(name).await
    }

    /// Fetch environments whose name contains `name`.
    pub async fn get_by_partial_name(&self, name: &str) -> Result<Vec<Environment>> {
        self.inner.get_by_partial_name(name).await
    }

    /// Create an environment.
    pub async fn add(&self, environment: &Environment) -> Result<Environment> {
        let created = self.inner.add(environment).await?;
        info!(
            id = created.resource.id().unwrap_or_default(),
            name = %created.name,
            "Created environment"
        );
        Ok(created)
    }

    /// Update an environment.
    pub async fn update(&self, environment: &Environment) -> Result<Environment> {
        self.inner.update(environment).await
    }

    /// Delete an environment by id.
    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        self.inner.delete_by_id(id).await
    }

    /// Fetch the server's summary of environments and the targets in them.
    pub async fn get_summary(&self) -> Result<Value> {
        let path = self.inner.collection_path("summary")?;
        self.inner.engine().get(&path).await
    }

    /// Reorder environments. `ids` lists environment ids in their new order.
    pub async fn set_sort_order(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() || ids.iter().any(|id| id.trim().is_empty()) {
            return Err(Error::invalid_parameter("SortOrder", "ids"));
        }
        let path = self.inner.collection_path("sortorder")?;
        self.inner.engine().update(&path, json!(ids)).await?;
        info!(count = ids.len(), "Reordered environments");
        Ok(())
    }
}
