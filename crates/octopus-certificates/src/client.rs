//! Asynchronous service for the `certificates` collection.

use crate::models::{Certificate, CertificateReplace};
use crate::Result;
use octopus_core::{Engine, Error, ResourceKind, ResourceService};
use tracing::{debug, info};

/// Service for the certificate library.
#[derive(Debug, Clone)]
pub struct CertificateService {
    inner: ResourceService<Certificate>,
}

impl CertificateService {
    /// Create a service over a shared engine.
    pub fn new(engine: Engine) -> Result<Self> {
        Ok(Self {
            inner: ResourceService::for_kind(engine, ResourceKind::Certificates)?,
        })
    }

    /// Fetch a certificate by id.
    pub async fn get_by_id(&self, id: &str) -> Result<Certificate> {
        self.inner.get_by_id(id).await
    }

    /// Fetch every certificate the server lists by default.
    pub async fn get_all(&self) -> Result<Vec<Certificate>> {
        self.inner.get_all().await
    }

    /// Fetch certificates by id.
    pub async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<Certificate>> {
        self.inner.get_by_ids(ids).await
    }

    /// Fetch certificates with an exact name.
    pub async fn get_by_name(&self, name: &str) -> Result<Vec<Certificate>> {
        self.inner.get_by_name(name).await
    }

    /// Fetch certificates whose name contains `name`.
    pub async fn get_by_partial_name(&self, name: &str) -> Result<Vec<Certificate>> {
        self.inner.get_by_partial_name(name).await
    }

    /// Fetch archived certificates.
    pub async fn get_archived(&self) -> Result<Vec<Certificate>> {
        self.inner.get_filtered(&[("archived", "true")]).await
    }

    /// Upload a certificate.
    pub async fn add(&self, certificate: &Certificate) -> Result<Certificate> {
        let created = self.inner.add(certificate).await?;
        info!(
            id = created.resource.id().unwrap_or_default(),
            thumbprint = created.thumbprint.as_deref().unwrap_or_default(),
            "Uploaded certificate"
        );
        Ok(created)
    }

    /// Update a certificate's metadata.
    pub async fn update(&self, certificate: &Certificate) -> Result<Certificate> {
        self.inner.update(certificate).await
    }

    /// Delete a certificate by id.
    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        self.inner.delete_by_id(id).await
    }

    /// Replace a certificate's data, archiving the previous one.
    ///
    /// The action answers with the certificate as it was before the replacement, so
    /// the certificate is fetched again afterwards.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] when `replacement` carries no data or `id` is
    /// blank, otherwise any error from the action or the follow-up fetch.
    pub async fn replace(&self, id: &str, replacement: &CertificateReplace) -> Result<Certificate> {
        if !replacement.has_data() {
            return Err(Error::invalid_parameter("Replace", "certificateData"));
        }
        let body = serde_json::to_value(replacement)?;
        self.inner.post_action(id, "replace", body).await?;
        debug!(id, "Replaced certificate data; fetching the replacement");
        self.get_by_id(id).await
    }
}
