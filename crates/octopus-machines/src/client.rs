//! Asynchronous service for the `machines` collection.

use crate::models::Machine;
use crate::Result;
use octopus_core::{Engine, ResourceKind, ResourceService};
use tracing::info;

/// Service for deployment targets.
#[derive(Debug, Clone)]
pub struct MachineService {
    inner: ResourceService<Machine>,
}

impl MachineService {
    /// Create a service over a shared engine.
    pub fn new(engine: Engine) -> Result<Self> {
        Ok(Self {
            inner: ResourceService::for_kind(engine, ResourceKind::Machines)?,
        })
    }

    /// Fetch a deployment target by id.
    pub async fn get_by_id(&self, id: &str) -> Result<Machine> {
        self.inner.get_by_id(id).await
    }

    /// Fetch every deployment target.
    pub async fn get_all(&self) -> Result<Vec<Machine>> {
        self.inner.get_all().await
    }

    /// Fetch deployment targets by id.
    pub async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<Machine>> {
        self.inner.get_by_ids(ids).await
    }

    /// Fetch deployment targets with an exact name.
    pub async fn get_by_name(&self, name: &str) -> Result<Vec<Machine>> {
        self.inner.get_by_name(name).await
    }

    /// Fetch deployment targets whose name contains `name`.
    pub async fn get_by_partial_name(&self, name: &str) -> Result<Vec<Machine>> {
        self.inner.get_by_partial_name(name).await
    }

    /// Fetch deployment targets carrying a role.
    pub async fn get_by_role(&self, role: &str) -> Result<Vec<Machine>> {
        self.inner.get_filtered(&[("roles", role)]).await
    }

    /// Fetch deployment targets in an environment.
    pub async fn get_by_environment(&self, environment_id: &str) -> Result<Vec<Machine>> {
        self.inner
            .get_filtered(&[("environmentIds", environment_id)])
            .await
    }

    /// Register a deployment target.
    pub async fn add(&self, machine: &Machine) -> Result<Machine> {
        let created = self.inner.add(machine).await?;
        info!(
            id = created.resource.id().unwrap_or_default(),
            name = created.name(),
            "Registered deployment target"
        );
        Ok(created)
    }

    /// Update a deployment target.
    pub async fn update(&self, machine: &Machine) -> Result<Machine> {
        self.inner.update(machine).await
    }

    /// Delete a deployment target by id.
    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        self.inner.delete_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authentication::KubernetesStandardAuthentication;
    use crate::endpoint::{Endpoint, KubernetesEndpoint};
    use octopus_core::{Error, HttpTransport, OctopusClientConfig};
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_service(server: &MockServer) -> MachineService {
        let config = OctopusClientConfig::new(server.uri(), "API-TEST")
            .unwrap()
            .with_space("Spaces-1");
        let transport = HttpTransport::from_config(&config).unwrap();
        MachineService::new(Engine::new(Arc::new(transport))).unwrap()
    }

    fn kubernetes_machine() -> Machine {
        Machine::new(
            "k8s-prod",
            vec!["Environments-1".to_string()],
            vec!["k8s".to_string()],
            KubernetesEndpoint::new("https://kubernetes.example.com")
                .with_authentication(KubernetesStandardAuthentication::new("Accounts-1")),
        )
    }

    #[tokio::test]
    async fn get_by_id_decodes_nested_families() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/machines/Machines-7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Id": "Machines-7",
                "Name": "k8s-prod",
                "EnvironmentIds": ["Environments-1"],
                "Roles": ["k8s"],
                "Endpoint": {
                    "CommunicationStyle": "Kubernetes",
                    "ClusterUrl": "https://kubernetes.example.com",
                    "SkipTlsVerification": "True",
                    "Authentication": {
                        "AuthenticationType": "KubernetesPodService",
                        "TokenPath": "/var/run/secrets/token"
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let machine = test_service(&server).get_by_id("Machines-7").await.unwrap();
        let Some(Endpoint::Kubernetes(endpoint)) = machine.endpoint else {
            panic!("expected a Kubernetes endpoint");
        };
        assert!(endpoint.skip_tls_verification);
        assert!(endpoint.authentication.is_some());
    }

    #[tokio::test]
    async fn get_all_fails_on_unknown_nested_authentication() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/machines"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Items": [{
                    "Id": "Machines-7",
                    "Name": "k8s-prod",
                    "Endpoint": {
                        "CommunicationStyle": "Kubernetes",
                        "ClusterUrl": "https://kubernetes.example.com",
                        "Authentication": { "AuthenticationType": "KubernetesOidc" }
                    }
                }],
                "Links": {}
            })))
            .mount(&server)
            .await;

        let err = test_service(&server).get_all().await.unwrap_err();
        assert_eq!(
            err,
            Error::unknown_variant("KubernetesAuthentication", "KubernetesOidc")
        );
    }

    #[tokio::test]
    async fn get_by_role_filters_on_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/machines"))
            .and(query_param("roles", "web"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Items": [],
                "Links": {}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let machines = test_service(&server).get_by_role("web").await.unwrap();
        assert!(machines.is_empty());
    }

    #[tokio::test]
    async fn get_by_environment_filters_on_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/machines"))
            .and(query_param("environmentIds", "Environments-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Items": [{
                    "Id": "Machines-2",
                    "Name": "region",
                    "Endpoint": { "CommunicationStyle": "None" }
                }],
                "Links": {}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let machines = test_service(&server)
            .get_by_environment("Environments-2")
            .await
            .unwrap();
        assert_eq!(machines.len(), 1);
    }

    #[tokio::test]
    async fn add_sends_nested_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/Spaces-1/machines"))
            .and(body_partial_json(json!({
                "Name": "k8s-prod",
                "Endpoint": {
                    "CommunicationStyle": "Kubernetes",
                    "SkipTlsVerification": "False",
                    "Authentication": {
                        "AuthenticationType": "KubernetesStandard",
                        "AccountId": "Accounts-1"
                    }
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "Id": "Machines-9",
                "Name": "k8s-prod",
                "EnvironmentIds": ["Environments-1"],
                "Roles": ["k8s"],
                "Endpoint": {
                    "CommunicationStyle": "Kubernetes",
                    "ClusterUrl": "https://kubernetes.example.com",
                    "SkipTlsVerification": "False"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = test_service(&server)
            .add(&kubernetes_machine())
            .await
            .unwrap();
        assert_eq!(created.resource.id(), Some("Machines-9"));
    }

    #[tokio::test]
    async fn machine_without_endpoint_never_reaches_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let mut machine = kubernetes_machine();
        machine.endpoint = None;
        let err = test_service(&server).add(&machine).await.unwrap_err();
        assert!(matches!(err, Error::ValidationError(_)));
    }

    #[tokio::test]
    async fn update_requires_id() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = test_service(&server)
            .update(&kubernetes_machine())
            .await
            .unwrap_err();
        assert_eq!(err, Error::invalid_parameter("Update", "id"));
    }
}
