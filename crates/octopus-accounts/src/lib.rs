//! Account support for the Octopus Deploy REST API.
//!
//! This crate provides the account variant family (username/password, cloud
//! credentials, SSH key pairs, tokens, OIDC) and an asynchronous service for the
//! `accounts` collection.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::AccountService;
pub use models::{
    Account, AccountDetails, AccountType, AmazonWebServicesAccount, AzureServicePrincipalAccount,
    GenericOidcAccount, GoogleCloudAccount, SshKeyAccount, TokenAccount, UsernamePasswordAccount,
};

/// Convenient result alias that reuses the shared Octopus error type.
pub type Result<T> = octopus_core::Result<T>;
