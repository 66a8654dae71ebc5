//! Deployment target support for the Octopus Deploy REST API.
//!
//! A deployment target ([`Machine`]) nests an [`Endpoint`] keyed by
//! `CommunicationStyle`; a Kubernetes endpoint in turn nests a
//! [`KubernetesAuthentication`] keyed by `AuthenticationType`. Both families decode
//! through their own registries.

#![deny(missing_docs)]

pub mod authentication;
pub mod client;
pub mod endpoint;
pub mod models;

pub use authentication::{
    AuthenticationType, KubernetesAuthentication, KubernetesAwsAuthentication,
    KubernetesAzureAuthentication, KubernetesCertificateAuthentication,
    KubernetesGoogleCloudAuthentication, KubernetesPodAuthentication,
    KubernetesStandardAuthentication,
};
pub use client::MachineService;
pub use endpoint::{
    CloudRegionEndpoint, CommunicationStyle, DeploymentActionContainer, Endpoint,
    KubernetesEndpoint, ListeningTentacleEndpoint, OfflineDropDestination,
    OfflinePackageDropEndpoint, PollingTentacleEndpoint, SshEndpoint,
};
pub use models::{Machine, MachineDetails};

/// Convenient result alias that reuses the shared Octopus error type.
pub type Result<T> = octopus_core::Result<T>;
