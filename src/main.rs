/*!
 * Membrane demo runtime
 *
 * Opens one sandbox over a small host graph and walks the secure surface.
 */

use anyhow::Result;
use secure_membrane::{
    init_tracing, HostObject, HostValue, MembraneManager, PrivateState, SecureValue,
};
use tracing::info;

fn main() -> Result<()> {
    init_tracing();

    info!("Membrane runtime starting...");
    let manager = MembraneManager::from_env()?;

    // Raw host graph
    let window = HostObject::new("Window");
    let document = HostObject::with_properties("HTMLDocument", [("title", "Demo")]);
    let body = HostObject::with_properties("HTMLBodyElement", [("tagName", "BODY")]);
    let service = HostObject::with_properties("Aura", [("version", "1.0")]);
    document.set("body", &body);
    body.set("parentNode", &document);
    service.set(
        "log",
        HostValue::function(|_, args| {
            info!(args = ?args, "Service log called from sandbox");
            HostValue::Undefined
        }),
    );
    window.set("document", &document);
    window.set(manager.config().service_property.as_str(), &service);
    window.set("window", &window);

    let membrane = manager.open_sandbox("demo", &window)?;
    let root = membrane.root().clone();

    info!(root = %root, keys = ?root.keys(), "Sandbox root");
    let self_identity = root.get("window").as_proxy() == Some(root.proxy());
    info!(self_identity, "Self-referential accessor");

    let doc = root.document();
    info!(title = ?doc.get("title").as_str(), "Document title");
    doc.set("title", "Changed from sandbox");
    info!(raw_title = ?document.get("title"), "Host saw delegated write");
    root.service().call("log", &[SecureValue::from("hello")]);

    if let Some(tag) = doc.to_string_tag(membrane.key()) {
        info!(tag = %tag, "Runtime diagnostic");
    }
    info!(
        cookie = ?doc.get("cookie"),
        define = ?doc.define_property("x", 1i64).err(),
        "Sandbox probes"
    );

    let stats = manager.stats();
    info!(stats = ?stats, "Runtime stats");
    manager.close_sandbox(membrane.id());
    info!("Membrane runtime finished");
    Ok(())
}
