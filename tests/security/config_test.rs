/*!
 * Membrane Configuration Tests
 */

use crate::fixtures::raw_graph;
use secure_membrane::{MembraneConfig, MembraneError, MembraneManager, ProxyKind, SurfacePolicy};
use serial_test::serial;
use std::io::Write;

const POLICY: &str = r#"{
    "service_property": "$A",
    "max_nodes": 64,
    "surfaces": {
        "document": { "readable": ["title"], "writable": [], "callable": [] }
    }
}"#;

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(POLICY.as_bytes()).unwrap();

    let config = MembraneConfig::from_file(file.path()).unwrap();
    assert_eq!(config.max_nodes, 64);
    assert!(config.surfaces.document.can_read("title"));
    assert!(!config.surfaces.document.can_read("body"));
    // kinds missing from the file keep the built-in surface
    assert_eq!(config.surfaces.service, SurfacePolicy::default().service);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = MembraneConfig::from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, MembraneError::Io(_)));
}

#[test]
fn test_malformed_file_is_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{ not json").unwrap();
    let err = MembraneConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, MembraneError::Config(_)));
}

#[test]
fn test_policy_narrows_surface() {
    let config = MembraneConfig::from_json_str(POLICY).unwrap();
    let manager = MembraneManager::new(config).unwrap();
    let graph = raw_graph();
    let membrane = manager.open_sandbox("c", &graph.window).unwrap();
    let doc = membrane.root().document();

    assert_eq!(doc.keys(), vec!["title".to_string()]);
    assert!(doc.get("body").is_undefined());
    assert!(!doc.set("title", "nope"));
    assert_eq!(membrane.proxy_count(), 3);
}

#[test]
fn test_closed_policy_with_single_grant() {
    let mut surfaces = SurfacePolicy::closed();
    surfaces
        .for_kind_mut(ProxyKind::Service)
        .readable
        .insert("version".to_string());
    let config = MembraneConfig {
        surfaces,
        ..MembraneConfig::default()
    };
    let manager = MembraneManager::new(config).unwrap();
    let graph = raw_graph();
    let membrane = manager.open_sandbox("c", &graph.window).unwrap();
    let root = membrane.root();

    assert_eq!(root.keys(), vec!["$A", "document", "window"]);
    assert!(root.document().keys().is_empty());
    assert_eq!(root.service().keys(), vec!["version".to_string()]);
    assert_eq!(root.service().get("version").as_str(), Some("1.0"));
    assert!(root.service().call("log", &[]).is_undefined());
    assert_eq!(graph.log_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert_eq!(membrane.proxy_count(), 3);
}

#[test]
#[serial]
fn test_from_env_defaults_when_unset() {
    std::env::remove_var("MEMBRANE_CONFIG_PATH");
    let config = MembraneConfig::from_env().unwrap();
    assert_eq!(config, MembraneConfig::default());
}

#[test]
#[serial]
fn test_from_env_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(POLICY.as_bytes()).unwrap();

    std::env::set_var("MEMBRANE_CONFIG_PATH", file.path());
    let result = MembraneManager::from_env();
    std::env::remove_var("MEMBRANE_CONFIG_PATH");

    assert_eq!(result.unwrap().config().max_nodes, 64);
}
