//! Account models.
//!
//! Accounts form one variant family keyed by `AccountType`. Every variant is a flat
//! object: the identity envelope, the shared [`AccountDetails`] and the variant's
//! own credential fields side by side.

use octopus_core::registry::{Family, Registry};
use octopus_core::service::Entity;
use octopus_core::validation::{has_secret, not_blank};
use octopus_core::{Resource, SensitiveValue, TenantedDeploymentMode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::OnceLock;
use validator::{Validate, ValidationErrors};

use crate::Result;

/// Wire key carrying the account discriminator.
pub const ACCOUNT_TYPE: &str = "AccountType";

/// Discriminator values of the account family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Username and password.
    UsernamePassword,
    /// AWS access key pair.
    AmazonWebServicesAccount,
    /// Azure service principal.
    AzureServicePrincipal,
    /// Google Cloud service account key.
    GoogleCloudAccount,
    /// SSH key pair.
    SshKeyPair,
    /// Bearer token.
    Token,
    /// Generic OpenID Connect federation.
    GenericOidcAccount,
}

impl AccountType {
    /// Every account type.
    pub const ALL: [Self; 7] = [
        Self::UsernamePassword,
        Self::AmazonWebServicesAccount,
        Self::AzureServicePrincipal,
        Self::GoogleCloudAccount,
        Self::SshKeyPair,
        Self::Token,
        Self::GenericOidcAccount,
    ];

    /// Wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UsernamePassword => "UsernamePassword",
            Self::AmazonWebServicesAccount => "AmazonWebServicesAccount",
            Self::AzureServicePrincipal => "AzureServicePrincipal",
            Self::GoogleCloudAccount => "GoogleCloudAccount",
            Self::SshKeyPair => "SshKeyPair",
            Self::Token => "Token",
            Self::GenericOidcAccount => "GenericOidcAccount",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields shared by every account variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct AccountDetails {
    /// Display name, unique per space.
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Environments the account is scoped to; empty means all.
    #[serde(default)]
    pub environment_ids: Vec<String>,
    /// Tenanted deployment participation.
    #[serde(default)]
    pub tenanted_deployment_participation: TenantedDeploymentMode,
    /// Tenants the account is scoped to.
    #[serde(default)]
    pub tenant_ids: Vec<String>,
    /// Tenant tags the account is scoped to.
    #[serde(default)]
    pub tenant_tags: Vec<String>,
    /// Owning space.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
}

impl AccountDetails {
    /// Details carrying only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Username/password account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct UsernamePasswordAccount {
    /// Identity envelope.
    #[serde(flatten)]
    pub resource: Resource,
    /// Shared account fields.
    #[serde(flatten)]
    #[validate(nested)]
    pub details: AccountDetails,
    /// Username.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<SensitiveValue>,
    /// Fields this client does not model, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UsernamePasswordAccount {
    /// New account with a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            details: AccountDetails::new(name),
            ..Self::default()
        }
    }
}

/// Amazon Web Services access key account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct AmazonWebServicesAccount {
    /// Identity envelope.
    #[serde(flatten)]
    pub resource: Resource,
    /// Shared account fields.
    #[serde(flatten)]
    #[validate(nested)]
    pub details: AccountDetails,
    /// Access key id.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub access_key: String,
    /// Secret access key.
    #[serde(default)]
    #[validate(custom(function = "has_secret"))]
    pub secret_key: SensitiveValue,
    /// Fields this client does not model, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AmazonWebServicesAccount {
    /// New account with its key pair.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: SensitiveValue,
    ) -> Self {
        Self {
            resource: Resource::new(),
            details: AccountDetails::new(name),
            access_key: access_key.into(),
            secret_key,
            extra: Map::new(),
        }
    }
}

/// Azure service principal account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct AzureServicePrincipalAccount {
    /// Identity envelope.
    #[serde(flatten)]
    pub resource: Resource,
    /// Shared account fields.
    #[serde(flatten)]
    #[validate(nested)]
    pub details: AccountDetails,
    /// Subscription id.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub subscription_number: String,
    /// Azure AD tenant id.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub tenant_id: String,
    /// Application (client) id.
    #[serde(default, rename = "ClientId")]
    #[validate(custom(function = "not_blank"))]
    pub application_id: String,
    /// Application password.
    #[serde(default, rename = "Password")]
    #[validate(custom(function = "has_secret"))]
    pub application_password: SensitiveValue,
    /// Azure cloud (e.g. `AzureCloud`, `AzureChinaCloud`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_environment: Option<String>,
    /// Active Directory endpoint for non-public clouds.
    #[serde(
        default,
        rename = "ActiveDirectoryEndpointBaseUri",
        skip_serializing_if = "Option::is_none"
    )]
    pub authentication_endpoint: Option<String>,
    /// Resource manager endpoint for non-public clouds.
    #[serde(
        default,
        rename = "ResourceManagementEndpointBaseUri",
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_manager_endpoint: Option<String>,
    /// Fields this client does not model, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Google Cloud service account key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct GoogleCloudAccount {
    /// Identity envelope.
    #[serde(flatten)]
    pub resource: Resource,
    /// Shared account fields.
    #[serde(flatten)]
    #[validate(nested)]
    pub details: AccountDetails,
    /// JSON key file contents.
    #[serde(default)]
    #[validate(custom(function = "has_secret"))]
    pub json_key: SensitiveValue,
    /// Fields this client does not model, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// SSH key pair account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct SshKeyAccount {
    /// Identity envelope.
    #[serde(flatten)]
    pub resource: Resource,
    /// Shared account fields.
    #[serde(flatten)]
    #[validate(nested)]
    pub details: AccountDetails,
    /// Login user.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub username: String,
    /// Private key file contents.
    #[serde(default)]
    #[validate(custom(function = "has_secret"))]
    pub private_key_file: SensitiveValue,
    /// Private key passphrase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_passphrase: Option<SensitiveValue>,
    /// Fields this client does not model, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SshKeyAccount {
    /// New account with its login user and private key.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        private_key_file: SensitiveValue,
    ) -> Self {
        Self {
            resource: Resource::new(),
            details: AccountDetails::new(name),
            username: username.into(),
            private_key_file,
            private_key_passphrase: None,
            extra: Map::new(),
        }
    }
}

/// Token account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct TokenAccount {
    /// Identity envelope.
    #[serde(flatten)]
    pub resource: Resource,
    /// Shared account fields.
    #[serde(flatten)]
    #[validate(nested)]
    pub details: AccountDetails,
    /// Token.
    #[serde(default)]
    #[validate(custom(function = "has_secret"))]
    pub token: SensitiveValue,
    /// Fields this client does not model, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenAccount {
    /// New account with its token.
    #[must_use]
    pub fn new(name: impl Into<String>, token: SensitiveValue) -> Self {
        Self {
            resource: Resource::new(),
            details: AccountDetails::new(name),
            token,
            extra: Map::new(),
        }
    }
}

/// Generic OpenID Connect account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct GenericOidcAccount {
    /// Identity envelope.
    #[serde(flatten)]
    pub resource: Resource,
    /// Shared account fields.
    #[serde(flatten)]
    #[validate(nested)]
    pub details: AccountDetails,
    /// Token audience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    /// Claims included in the subject of deployment tokens.
    #[serde(default)]
    pub deployment_subject_keys: Vec<String>,
    /// Fields this client does not model, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An Octopus account.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "AccountType")]
pub enum Account {
    /// Username and password.
    UsernamePassword(UsernamePasswordAccount),
    /// AWS access key pair.
    AmazonWebServicesAccount(AmazonWebServicesAccount),
    /// Azure service principal.
    AzureServicePrincipal(AzureServicePrincipalAccount),
    /// Google Cloud service account key.
    GoogleCloudAccount(GoogleCloudAccount),
    /// SSH key pair.
    SshKeyPair(SshKeyAccount),
    /// Bearer token.
    Token(TokenAccount),
    /// Generic OpenID Connect federation.
    GenericOidcAccount(GenericOidcAccount),
}

macro_rules! account_variants {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        impl Account {
            /// Discriminator of this account.
            #[must_use]
            pub const fn account_type(&self) -> AccountType {
                match self {
                    $(Self::$variant(_) => AccountType::$variant,)+
                }
            }

            /// Identity envelope.
            #[must_use]
            pub const fn resource(&self) -> &Resource {
                match self {
                    $(Self::$variant(account) => &account.resource,)+
                }
            }

            /// Shared account fields.
            #[must_use]
            pub const fn details(&self) -> &AccountDetails {
                match self {
                    $(Self::$variant(account) => &account.details,)+
                }
            }

            /// Wire fields outside the account model.
            #[must_use]
            pub const fn extra(&self) -> &Map<String, Value> {
                match self {
                    $(Self::$variant(account) => &account.extra,)+
                }
            }

            /// Mutable shared account fields.
            pub fn details_mut(&mut self) -> &mut AccountDetails {
                match self {
                    $(Self::$variant(account) => &mut account.details,)+
                }
            }
        }

        impl Validate for Account {
            fn validate(&self) -> std::result::Result<(), ValidationErrors> {
                match self {
                    $(Self::$variant(account) => account.validate(),)+
                }
            }
        }

        fn build_registry() -> Registry<Account> {
            Registry::builder()
                $(.variant(AccountType::$variant.as_str(), Account::$variant))+
                .build()
        }

        $(
            impl From<$ty> for Account {
                fn from(account: $ty) -> Self {
                    Self::$variant(account)
                }
            }
        )+
    };
}

account_variants! {
    UsernamePassword => UsernamePasswordAccount,
    AmazonWebServicesAccount => AmazonWebServicesAccount,
    AzureServicePrincipal => AzureServicePrincipalAccount,
    GoogleCloudAccount => GoogleCloudAccount,
    SshKeyPair => SshKeyAccount,
    Token => TokenAccount,
    GenericOidcAccount => GenericOidcAccount,
}

impl Account {
    /// Account name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.details().name
    }
}

impl Family for Account {
    const NAME: &'static str = "Account";
    const DISCRIMINATOR: &'static str = ACCOUNT_TYPE;

    fn registry() -> &'static Registry<Self> {
        static REGISTRY: OnceLock<Registry<Account>> = OnceLock::new();
        REGISTRY.get_or_init(build_registry)
    }

    fn discriminator(&self) -> &'static str {
        self.account_type().as_str()
    }
}

impl Entity for Account {
    const KIND: &'static str = "Account";

    fn from_value(value: Value) -> Result<Self> {
        Self::registry().decode(value)
    }

    fn to_value(&self) -> Result<Value> {
        Self::registry().encode(self)
    }

    fn resource(&self) -> &Resource {
        Account::resource(self)
    }
}
