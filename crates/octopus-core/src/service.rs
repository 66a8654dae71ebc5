//! Generic resource service.
//!
//! A [`ResourceService`] is the engine bound to one URI template and one entity shape.
//! Resource crates wrap it without adding branching of their own.

use serde_json::Value;
use std::marker::PhantomData;
use tracing::debug;
use validator::Validate;

use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::pagination::PageWalker;
use crate::resource::Resource;
use crate::types::ResourceKind;
use crate::uri::{Lookup, UriTemplate};

/// A resource the service can read and write.
///
/// `Validate` carries the client-side required-field checks run before Add/Update.
pub trait Entity: Validate + Send + Sync + Sized {
    /// Human-readable kind used in logs (e.g. `Account`).
    const KIND: &'static str;

    /// Decode a server payload.
    fn from_value(value: Value) -> Result<Self>;

    /// Encode for a request body.
    fn to_value(&self) -> Result<Value>;

    /// Identity envelope.
    fn resource(&self) -> &Resource;

    /// Identifier, when persisted.
    fn id(&self) -> Option<&str> {
        self.resource().id()
    }
}

/// CRUD access to one resource collection.
#[derive(Debug, Clone)]
pub struct ResourceService<T> {
    engine: Engine,
    template: UriTemplate,
    space: Option<String>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> ResourceService<T> {
    /// Bind `engine` to a collection template.
    #[must_use]
    pub fn new(engine: Engine, template: UriTemplate) -> Self {
        Self {
            engine,
            template,
            space: None,
            _entity: PhantomData,
        }
    }

    /// Bind `engine` to the default template of a resource collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the collection template cannot be parsed.
    pub fn for_kind(engine: Engine, kind: ResourceKind) -> Result<Self> {
        Ok(Self::new(engine, UriTemplate::parse(kind.uri_template())?))
    }

    /// Fill a `{spaceId}` placeholder in the template with `space`.
    #[must_use]
    pub fn in_space(mut self, space: impl Into<String>) -> Self {
        self.space = Some(space.into());
        self
    }

    /// The collection template.
    #[must_use]
    pub fn template(&self) -> &UriTemplate {
        &self.template
    }

    /// The underlying engine.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Fetch one entity by id.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for a blank id, [`Error::ItemNotFound`] on 404, or
    /// any other classified error.
    pub async fn get_by_id(&self, id: &str) -> Result<T> {
        let path = self.path(&Lookup::ById(id))?;
        let value: Value = self.engine.get(&path).await?;
        T::from_value(value)
    }

    /// Fetch every entity, following pagination.
    ///
    /// # Errors
    ///
    /// The first classified or decode error; no partial list is returned.
    pub async fn get_all(&self) -> Result<Vec<T>> {
        let path = self.path(&Lookup::All)?;
        self.walk(path).await
    }

    /// Fetch several entities by id. An empty list issues no request.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] when any id is blank, otherwise as [`Self::get_all`].
    pub async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<T>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let path = self.path(&Lookup::ByIds(ids))?;
        self.walk(path).await
    }

    /// Fetch entities whose name matches exactly.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for a blank name, otherwise as [`Self::get_all`].
    pub async fn get_by_name(&self, name: &str) -> Result<Vec<T>> {
        let path = self.path(&Lookup::ByName(name))?;
        self.walk(path).await
    }

    /// Fetch entities whose name contains `name`. Matching is done by the server.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for a blank name, otherwise as [`Self::get_all`].
    pub async fn get_by_partial_name(&self, name: &str) -> Result<Vec<T>> {
        let path = self.path(&Lookup::ByPartialName(name))?;
        self.walk(path).await
    }

    /// Fetch every entity matching the query filters, following pagination.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for a blank or undeclared filter, otherwise as
    /// [`Self::get_all`].
    pub async fn get_filtered(&self, filters: &[(&'static str, &str)]) -> Result<Vec<T>> {
        let path = self
            .template
            .resolve_filters(self.space.as_deref(), filters)?;
        self.walk(path).await
    }

    /// Create an entity.
    ///
    /// # Errors
    ///
    /// [`Error::ValidationError`] before any request when validation fails, otherwise
    /// any classified error.
    pub async fn add(&self, entity: &T) -> Result<T> {
        entity.validate()?;
        let path = self.path(&Lookup::All)?;
        let created = self.engine.add(&path, entity.to_value()?).await?;
        T::from_value(created)
    }

    /// Replace an existing entity.
    ///
    /// # Errors
    ///
    /// [`Error::ValidationError`] or [`Error::InvalidParameter`] (missing id) before any
    /// request, otherwise any classified error.
    pub async fn update(&self, entity: &T) -> Result<T> {
        entity.validate()?;
        let id = entity
            .id()
            .ok_or_else(|| Error::invalid_parameter("Update", "id"))?;
        let path = self.path(&Lookup::ById(id))?;
        let updated = self.engine.update(&path, entity.to_value()?).await?;
        T::from_value(updated)
    }

    /// Delete an entity by id.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for a blank id, otherwise any classified error.
    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        let path = self.path(&Lookup::ById(id))?;
        self.engine.delete(&path).await
    }

    /// POST `body` to an action under one entity (`<collection>/<id>/<action>`).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for a blank id or action, otherwise any classified
    /// error.
    pub async fn post_action(&self, id: &str, action: &str, body: Value) -> Result<Value> {
        if action.trim().is_empty() {
            return Err(Error::invalid_parameter("Post", "action"));
        }
        let base = self.path(&Lookup::ById(id))?;
        self.engine.post(&format!("{base}/{action}"), body).await
    }

    /// Path of a collection-level endpoint such as `environments/summary`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for a blank segment.
    pub fn collection_path(&self, segment: &str) -> Result<String> {
        if segment.trim().is_empty() {
            return Err(Error::invalid_parameter("GetAll", "segment"));
        }
        let base = self.path(&Lookup::All)?;
        Ok(format!("{base}/{segment}"))
    }

    fn path(&self, lookup: &Lookup<'_>) -> Result<String> {
        match &self.space {
            Some(space) => self.template.resolve_in_space(space, lookup),
            None => self.template.resolve(lookup),
        }
    }

    async fn walk(&self, path: String) -> Result<Vec<T>> {
        debug!(kind = T::KIND, path = %path, "Listing");
        PageWalker::new(&self.engine, path).collect(T::from_value).await
    }
}
