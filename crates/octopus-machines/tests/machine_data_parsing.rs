//! Integration tests for parsing deployment target data.
//!
//! The fixture carries one target per communication style, including a Kubernetes
//! cluster with nested authentication.

use octopus_core::service::Entity;
use octopus_core::{PagedCollection, TenantedDeploymentMode};
use octopus_machines::{
    AuthenticationType, CommunicationStyle, Endpoint, KubernetesAuthentication, Machine,
};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use validator::Validate;

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Load the machine page fixture from disk.
fn load_machines_page() -> PagedCollection<Value> {
    let fixture_path = fixtures_dir().join("machines_page.json");
    let json_data = fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read machine fixture at {}: {}",
            fixture_path.display(),
            e
        )
    });
    serde_json::from_str(&json_data)
        .unwrap_or_else(|e| panic!("Failed to deserialize machine page: {e}"))
}

fn load_machines() -> Vec<Machine> {
    load_machines_page()
        .items
        .into_iter()
        .map(|item| Machine::from_value(item).unwrap())
        .collect()
}

fn find(machines: &[Machine], name: &str) -> Machine {
    machines
        .iter()
        .find(|m| m.name() == name)
        .cloned()
        .unwrap_or_else(|| panic!("Should have a machine named {name}"))
}

#[test]
fn test_every_communication_style_decodes() {
    let page = load_machines_page();
    assert_eq!(page.items.len(), 6, "Expected 6 machines in test data");
    assert_eq!(page.total_results, Some(6));
    assert_eq!(page.next_page(), None);

    let mut styles: Vec<_> = load_machines()
        .iter()
        .map(|m| m.endpoint.as_ref().map(Endpoint::communication_style))
        .collect::<Option<Vec<_>>>()
        .expect("Every machine should have an endpoint");
    styles.sort_by_key(|s| s.as_str());
    let mut expected = CommunicationStyle::ALL.to_vec();
    expected.sort_by_key(|s| s.as_str());
    assert_eq!(styles, expected);
}

#[test]
fn test_machine_details() {
    let machines = load_machines();
    let web = find(&machines, "web01");

    assert_eq!(web.resource.id(), Some("Machines-1"));
    assert_eq!(web.details.environment_ids.len(), 2);
    assert_eq!(web.details.health_status.as_deref(), Some("Healthy"));
    assert_eq!(web.details.status.as_deref(), Some("Online"));
    assert_eq!(
        web.resource.link("Connection"),
        Some("/api/Spaces-1/machines/Machines-1/connection")
    );

    let poll = find(&machines, "worker-poll");
    assert_eq!(
        poll.details.tenanted_deployment_participation,
        TenantedDeploymentMode::TenantedOrUntenanted
    );
    assert_eq!(poll.details.roles, vec!["app", "worker"]);

    let ssh = find(&machines, "linux-ssh");
    assert!(ssh.details.is_disabled);
}

#[test]
fn test_kubernetes_target_nested_authentication() {
    let k8s = find(&load_machines(), "k8s-prod");
    let Some(Endpoint::Kubernetes(endpoint)) = k8s.endpoint else {
        panic!("k8s-prod should have a Kubernetes endpoint");
    };

    assert_eq!(endpoint.cluster_url, "https://kubernetes.example.com");
    assert!(!endpoint.skip_tls_verification);
    let Some(KubernetesAuthentication::KubernetesAws(aws)) = endpoint.authentication else {
        panic!("k8s-prod should authenticate with AWS");
    };
    assert_eq!(aws.cluster_name, "eks-prod");
    assert_eq!(aws.account_id.as_deref(), Some("Accounts-2"));
    assert_eq!(
        KubernetesAuthentication::from(aws).authentication_type(),
        AuthenticationType::KubernetesAws
    );
}

#[test]
fn test_offline_drop_fields() {
    let offline = find(&load_machines(), "offline");
    let Some(Endpoint::OfflineDrop(endpoint)) = offline.endpoint else {
        panic!("offline should have an offline drop endpoint");
    };
    let destination = endpoint.destination.expect("Should have a destination");
    assert_eq!(destination.destination_type.as_deref(), Some("FileSystem"));
    assert_eq!(destination.drop_folder_path.as_deref(), Some("C:\\Drops"));
    assert_eq!(endpoint.working_directory.as_deref(), Some("C:\\Octopus"));
}

#[test]
fn test_round_trip_preserves_endpoints() {
    for original in load_machines_page().items {
        let machine = Machine::from_value(original.clone()).unwrap();
        let encoded = machine.to_value().unwrap();

        let expected = &original["Endpoint"];
        let actual = &encoded["Endpoint"];
        for (key, value) in expected.as_object().unwrap() {
            if value.is_null() || value.as_object().is_some_and(|o| o.is_empty()) {
                continue;
            }
            assert_eq!(&actual[key], value, "{key} changed on {}", machine.name());
        }
        assert_eq!(encoded["Name"], original["Name"]);
        assert_eq!(encoded["Roles"], original["Roles"]);
    }
}

#[test]
fn test_server_machines_validate() {
    for machine in load_machines() {
        assert!(machine.validate().is_ok(), "{}", machine.name());
    }
}

#[test]
fn test_unmodeled_fields_are_kept() {
    for original in load_machines_page().items {
        let machine = Machine::from_value(original.clone()).unwrap();
        assert_eq!(machine.extra.get("Slug"), Some(&original["Slug"]));

        let encoded = machine.to_value().unwrap();
        assert_eq!(encoded["Slug"], original["Slug"]);
        if let Some(details) = original["Endpoint"].get("TentacleVersionDetails") {
            assert_eq!(&encoded["Endpoint"]["TentacleVersionDetails"], details);
        }
    }

    let web01 = find(&load_machines(), "web01");
    let endpoint = web01.endpoint.as_ref().unwrap();
    assert!(endpoint.extra().contains_key("TentacleVersionDetails"));
}
