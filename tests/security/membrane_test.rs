/*!
 * Membrane Assembly and Runtime Tests
 * Consistent keying, isolation across sandboxes, and the end-to-end flow
 */

use crate::fixtures::{manager, raw_graph, SiblingChain};
use pretty_assertions::assert_eq;
use secure_membrane::{
    HostObject, HostValue, KeyRegistry, MembraneAssembler, MembraneConfig, MembraneError,
    MembraneManager, PrivateState, ProxyKind, SurfacePolicy,
};
use std::sync::Arc;

/// Portion of a diagnostic string after the identity tag
fn key_part(tag: &str) -> &str {
    tag.split_once("{ key: ").map(|(_, rest)| rest).unwrap_or("")
}

#[test]
fn test_end_to_end_scenario() {
    let manager = manager();
    let g1 = raw_graph();
    let g2 = raw_graph();
    let s1 = manager.open_sandbox("one", &g1.window).unwrap();
    let s2 = manager.open_sandbox("two", &g2.window).unwrap();
    let (k1, k2) = (s1.key(), s2.key());
    let root = s1.root();

    // document is a proxy wrapping D, not D itself
    let doc = root.get("document").into_proxy().unwrap();
    assert_eq!(doc.kind(), ProxyKind::Document);
    let wrapped = doc.get_private("document", k1).unwrap();
    assert!(wrapped.same_value(&HostValue::from(&g1.document)));

    // self accessor
    assert_eq!(root.get("window").as_proxy(), Some(root.proxy()));

    // private slot gated by the sandbox key
    let raw = root.get_private("window", k1).unwrap();
    assert!(raw.same_value(&HostValue::from(&g1.window)));
    assert!(root.get_private("window", k2).is_none());
}

#[test]
fn test_consistent_keying_within_sandbox() {
    let graph = raw_graph();
    let manager = manager();
    let membrane = manager.open_sandbox("c", &graph.window).unwrap();
    let key = membrane.key();
    let root = membrane.root();

    let window_tag = root.to_string_tag(key).unwrap();
    let document_tag = root.document().to_string_tag(key).unwrap();
    let service_tag = root.service().to_string_tag(key).unwrap();
    assert!(!key_part(&window_tag).is_empty());
    assert_eq!(key_part(&window_tag), key_part(&document_tag));
    assert_eq!(key_part(&window_tag), key_part(&service_tag));

    for proxy in [root.proxy(), root.document().proxy(), root.service().proxy()] {
        let owner = manager.key_of(proxy).unwrap();
        assert!(KeyRegistry::verify(&owner, key));
    }
}

#[test]
fn test_isolation_across_sandboxes() {
    let manager = manager();
    let ga = raw_graph();
    let gb = raw_graph();
    let a = manager.open_sandbox("a", &ga.window).unwrap();
    let b = manager.open_sandbox("b", &gb.window).unwrap();

    let b_root = b.root();
    let b_body = b_root.document().get("body").into_proxy().unwrap();
    for (proxy, slot) in [
        (b_root.proxy().clone(), "window"),
        (b_root.document().into_proxy(), "document"),
        (b_root.service().into_proxy(), "service"),
        (b_body, "object"),
    ] {
        assert!(proxy.get_private(slot, a.key()).is_none());
        assert!(proxy.to_string_tag(a.key()).is_none());
        assert!(!proxy.set_private(slot, HostValue::from("hijack"), a.key()));
        assert!(proxy.get_private(slot, b.key()).is_some());
    }
    assert!(!a.root().same_membrane(b.root()));
    assert_ne!(a.id(), b.id());
}

#[test]
fn test_circular_host_references_reuse_proxies() {
    let graph = raw_graph();
    let mut surfaces = SurfacePolicy::default();
    surfaces.document.readable.insert("defaultView".into());
    surfaces.window.readable.insert("self".into());
    graph.window.set("self", &graph.window);

    let config = MembraneConfig {
        surfaces,
        ..MembraneConfig::default()
    };
    let manager = MembraneManager::new(config).unwrap();
    let membrane = manager.open_sandbox("c", &graph.window).unwrap();
    let root = membrane.root();

    assert_eq!(root.document().get("defaultView").as_proxy(), Some(root.proxy()));
    assert_eq!(root.get("self").as_proxy(), Some(root.proxy()));
    assert_eq!(membrane.proxy_count(), 4);
}

#[test]
fn test_document_reaching_service_maps_to_service_proxy() {
    let graph = raw_graph();
    graph.body.set("id", HostValue::from(&graph.service));
    let membrane = manager().open_sandbox("c", &graph.window).unwrap();
    let root = membrane.root();

    let body = root.document().get("body").into_proxy().unwrap();
    let reached = body.get("id").into_proxy().unwrap();
    assert_eq!(reached.kind(), ProxyKind::Service);
    assert_eq!(reached, root.service().into_proxy());
}

#[test]
fn test_assembler_direct_use() {
    let registry = KeyRegistry::new();
    let config = MembraneConfig::default();
    let graph = raw_graph();
    let key = registry.issue_key();

    let root = MembraneAssembler::new(&registry, &config)
        .assemble(&graph.window, &key)
        .unwrap();
    assert!(root.get_private("window", &key).is_some());
    assert!(root.is_frozen());
}

#[test]
fn test_construction_failures_surface_to_runtime() {
    let manager = manager();

    let no_document = HostObject::new("Window");
    no_document.set("$A", HostObject::new("Aura"));
    assert_eq!(
        manager.open_sandbox("c", &no_document).unwrap_err(),
        MembraneError::MissingHostProperty {
            kind: ProxyKind::Window,
            name: "document".into()
        }
    );

    let primitive_service = HostObject::new("Window");
    primitive_service.set("document", HostObject::new("HTMLDocument"));
    primitive_service.set("$A", 42i64);
    assert_eq!(
        manager.open_sandbox("c", &primitive_service).unwrap_err(),
        MembraneError::NotAnObject {
            kind: ProxyKind::Window,
            name: "$A".into()
        }
    );
    assert_eq!(manager.stats().open_sandboxes, 0);
}

#[test]
fn test_oversized_graph_refused() {
    let graph = raw_graph();
    let config = MembraneConfig {
        max_nodes: 3,
        ..MembraneConfig::default()
    };
    let manager = MembraneManager::new(config).unwrap();
    assert_eq!(
        manager.open_sandbox("c", &graph.window).unwrap_err(),
        MembraneError::GraphTooLarge(3)
    );
}

#[test]
fn test_deep_sibling_chain_within_budget_assembles() {
    let graph = raw_graph();
    let manager = manager();
    let len = manager.config().max_nodes - 64;
    let chain = SiblingChain::new(len);
    graph.body.set("firstChild", chain.head());

    let membrane = manager.open_sandbox("c", &graph.window).unwrap();
    // window, document, service and body, then the chain
    assert_eq!(membrane.proxy_count(), 4 + len);

    let body = membrane.root().document().get("body").into_proxy().unwrap();
    let mut cursor = body.get("firstChild").into_proxy();
    let mut walked = 0;
    while let Some(node) = cursor {
        assert!(node.is_frozen());
        assert!(node.same_membrane(&body));
        walked += 1;
        cursor = node.get("nextSibling").into_proxy();
    }
    assert_eq!(walked, len);

    graph.body.remove("firstChild");
}

#[test]
fn test_sibling_chain_beyond_budget_refused() {
    let graph = raw_graph();
    let manager = manager();
    let max_nodes = manager.config().max_nodes;
    let chain = SiblingChain::new(max_nodes);
    graph.body.set("firstChild", chain.head());

    assert_eq!(
        manager.open_sandbox("c", &graph.window).unwrap_err(),
        MembraneError::GraphTooLarge(max_nodes)
    );
    assert_eq!(manager.stats().open_sandboxes, 0);

    graph.body.remove("firstChild");
}

#[test]
fn test_aliased_root_objects_refused() {
    let manager = manager();

    let shared = HostObject::new("HTMLDocument");
    let doc_is_service = HostObject::new("Window");
    doc_is_service.set("document", &shared);
    doc_is_service.set("$A", &shared);
    assert_eq!(
        manager.open_sandbox("c", &doc_is_service).unwrap_err(),
        MembraneError::AliasedHostObject {
            first: "document".into(),
            second: "$A".into()
        }
    );

    let doc_is_window = HostObject::new("Window");
    doc_is_window.set("document", &doc_is_window);
    doc_is_window.set("$A", HostObject::new("Aura"));
    assert_eq!(
        manager.open_sandbox("c", &doc_is_window).unwrap_err(),
        MembraneError::AliasedHostObject {
            first: "window".into(),
            second: "document".into()
        }
    );
    doc_is_window.remove("document");

    let service_is_window = HostObject::new("Window");
    service_is_window.set("document", HostObject::new("HTMLDocument"));
    service_is_window.set("$A", &service_is_window);
    assert_eq!(
        manager.open_sandbox("c", &service_is_window).unwrap_err(),
        MembraneError::AliasedHostObject {
            first: "window".into(),
            second: "$A".into()
        }
    );
    service_is_window.remove("$A");

    assert_eq!(manager.stats().open_sandboxes, 0);
}

#[test]
fn test_typed_accessors_match_node_kinds() {
    let graph = raw_graph();
    let manager = manager();
    let membrane = manager.open_sandbox("c", &graph.window).unwrap();
    let root = membrane.root();

    assert_eq!(root.kind(), ProxyKind::Window);
    assert_eq!(root.document().kind(), ProxyKind::Document);
    assert_eq!(root.service().kind(), ProxyKind::Service);
    assert!(root.service().as_service().is_some());
    assert!(root.document().as_document().is_some());
}

#[test]
fn test_closing_sandbox_releases_raw_references() {
    let graph = raw_graph();
    let manager = manager();
    let before = Arc::strong_count(&graph.body);

    let membrane = manager.open_sandbox("c", &graph.window).unwrap();
    assert_eq!(Arc::strong_count(&graph.body), before + 1);

    assert!(manager.close_sandbox(membrane.id()));
    drop(membrane);
    assert_eq!(Arc::strong_count(&graph.body), before);
}

#[test]
fn test_sandbox_key_outlives_close_only_while_held() {
    let graph = raw_graph();
    let manager = manager();
    let membrane = manager.open_sandbox("c", &graph.window).unwrap();
    assert_eq!(manager.registry().live_keys(), 1);

    manager.close_sandbox(membrane.id());
    drop(membrane);
    assert_eq!(manager.registry().live_keys(), 0);
    assert_eq!(manager.stats().keys_issued, 1);
}

#[test]
fn test_stats_serialize() {
    let graph = raw_graph();
    let manager = manager();
    let membrane = manager.open_sandbox("c", &graph.window).unwrap();
    membrane.root().get("localStorage");

    let stats = serde_json::to_value(manager.stats()).unwrap();
    assert_eq!(stats["open_sandboxes"], 1);
    assert_eq!(stats["denied_accesses"], 1);
}
