//! Asynchronous service for the `accounts` collection.

use crate::models::{Account, AccountType};
use crate::Result;
use octopus_core::{Engine, ResourceKind, ResourceService};
use tracing::info;

/// Service for Octopus accounts.
#[derive(Debug, Clone)]
pub struct AccountService {
    inner: ResourceService<Account>,
}

impl AccountService {
    /// Create a service over a shared engine.
    pub fn new(engine: Engine) -> Result<Self> {
        Ok(Self {
            inner: ResourceService::for_kind(engine, ResourceKind::Accounts)?,
        })
    }

    /// Fetch an account by id.
    pub async fn get_by_id(&self, id: &str) -> Result<Account> {
        self.inner.get_by_id(id).await
    }

    /// Fetch every account.
    pub async fn get_all(&self) -> Result<Vec<Account>> {
        self.inner.get_all().await
    }

    /// Fetch accounts by id.
    pub async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<Account>> {
        self.inner.get_by_ids(ids).await
    }

    /// Fetch accounts with an exact name.
    pub async fn get_by_name(&self, name: &str) -> Result<Vec<Account>> {
        self.inner.get_by_name(name).await
    }

    /// Fetch accounts whose name contains `name`.
    pub async fn get_by_partial_name(&self, name: &str) -> Result<Vec<Account>> {
        self.inner.get_by_partial_name(name).await
    }

    /// Fetch every account of one type.
    pub async fn get_by_account_type(&self, account_type: AccountType) -> Result<Vec<Account>> {
        self.inner
            .get_filtered(&[("accountType", account_type.as_str())])
            .await
    }

    /// Create an account.
    pub async fn add(&self, account: &Account) -> Result<Account> {
        let created = self.inner.add(account).await?;
        info!(
            id = created.resource().id().unwrap_or_default(),
            account_type = %created.account_type(),
            "Created account"
        );
        Ok(created)
    }

    /// Update an account.
    pub async fn update(&self, account: &Account) -> Result<Account> {
        self.inner.update(account).await
    }

    /// Delete an account by id.
    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        self.inner.delete_by_id(id).await
    }
}
