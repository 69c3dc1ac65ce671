/*!
 * Secure Proxy Family
 *
 * Typed wrappers for the well-known host objects. Each constructor runs
 * against the assembly stage, wraps the references its kind exposes with
 * the same key, and seals its own node last.
 */

use super::graph::{GraphBuilder, MembraneGraph, Member, NodeId, RootLinks};
use super::proxy::SecureProxy;
use super::value::SecureValue;
use crate::core::errors::{MembraneError, MembraneResult};
use crate::core::limits::{DOCUMENT_PROPERTY, SCOPE_SELF_PROPERTY};
use crate::core::types::ProxyKind;
use crate::host::{HostRef, HostValue};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use tracing::debug;

/// Resolve a reference the root cannot be built without
fn required_object(raw: &HostRef, kind: ProxyKind, name: &str) -> MembraneResult<HostRef> {
    match raw.get(name) {
        HostValue::Object(obj) => Ok(obj),
        HostValue::Undefined => Err(MembraneError::MissingHostProperty {
            kind,
            name: name.to_string(),
        }),
        _ => Err(MembraneError::NotAnObject {
            kind,
            name: name.to_string(),
        }),
    }
}

/// Window, document and service must be three different host objects;
/// otherwise one node would have to carry two proxy kinds.
fn distinct_roots(roots: &[(&str, &HostRef)]) -> MembraneResult<()> {
    for (i, (name, obj)) in roots.iter().enumerate() {
        if let Some((first, _)) = roots[..i].iter().find(|(_, seen)| seen.id() == obj.id()) {
            return Err(MembraneError::AliasedHostObject {
                first: first.to_string(),
                second: name.to_string(),
            });
        }
    }
    Ok(())
}

macro_rules! typed_proxy {
    ($(#[$meta:meta])* $name:ident, $kind:expr, $as_fn:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash)]
        pub struct $name(SecureProxy);

        impl $name {
            /// Untyped handle onto the same proxy
            #[inline]
            pub fn proxy(&self) -> &SecureProxy {
                &self.0
            }

            #[inline]
            pub fn into_proxy(self) -> SecureProxy {
                self.0
            }
        }

        impl Deref for $name {
            type Target = SecureProxy;

            fn deref(&self) -> &SecureProxy {
                &self.0
            }
        }

        impl From<$name> for SecureValue {
            fn from(typed: $name) -> Self {
                SecureValue::Proxy(typed.0)
            }
        }

        impl From<&$name> for SecureValue {
            fn from(typed: &$name) -> Self {
                SecureValue::Proxy(typed.0.clone())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl SecureProxy {
            /// Typed view, if this proxy is of the matching kind
            pub fn $as_fn(&self) -> Option<$name> {
                (self.kind() == $kind).then(|| $name(self.clone()))
            }
        }
    };
}

typed_proxy!(
    /// Secure global scope: the root of every membrane
    SecureWindow,
    ProxyKind::Window,
    as_window
);

typed_proxy!(
    /// Secure document of the global scope
    SecureDocument,
    ProxyKind::Document,
    as_document
);

typed_proxy!(
    /// Secure privileged service handle of the global scope
    SecureService,
    ProxyKind::Service,
    as_service
);

impl SecureWindow {
    /// Build the root node, its document and its service with the stage's key
    pub(crate) fn construct(stage: &mut GraphBuilder<'_>, raw: &HostRef) -> MembraneResult<RootLinks> {
        let service_name = stage.config().service_property.as_str();
        let raw_document = required_object(raw, ProxyKind::Window, DOCUMENT_PROPERTY)?;
        let raw_service = required_object(raw, ProxyKind::Window, service_name)?;
        distinct_roots(&[
            (SCOPE_SELF_PROPERTY, raw),
            (DOCUMENT_PROPERTY, &raw_document),
            (service_name, &raw_service),
        ])?;

        let window = stage.alloc(ProxyKind::Window, raw)?;
        // Register both children before either walks its surface, so a
        // document that reaches the service maps onto the service proxy.
        let document = stage.intern(ProxyKind::Document, &raw_document)?;
        let service = stage.intern(ProxyKind::Service, &raw_service)?;
        SecureDocument::construct(stage, document, &raw_document)?;
        SecureService::construct(stage, service, &raw_service)?;

        stage.attach(window, DOCUMENT_PROPERTY, Member::Child(document));
        stage.attach(window, service_name, Member::Child(service));
        stage.attach(window, SCOPE_SELF_PROPERTY, Member::SelfRef);
        stage.wrap_reachable(window, raw)?;
        stage.seal(window);

        debug!(class = raw.class_name(), service = service_name, "Constructed secure window");
        Ok(RootLinks {
            window,
            document,
            service,
        })
    }

    pub(crate) fn from_graph(graph: Arc<MembraneGraph>) -> Self {
        let root = graph.links().window;
        SecureWindow(SecureProxy::new(graph, root))
    }

    pub fn document(&self) -> SecureDocument {
        SecureDocument(self.0.sibling(self.0.graph().links().document))
    }

    pub fn service(&self) -> SecureService {
        SecureService(self.0.sibling(self.0.graph().links().service))
    }

    /// Self-referential scope accessor
    pub fn window(&self) -> SecureWindow {
        self.clone()
    }
}

impl SecureDocument {
    pub(crate) fn construct(stage: &mut GraphBuilder<'_>, node: NodeId, raw: &HostRef) -> MembraneResult<()> {
        populate(stage, node, ProxyKind::Document, raw)
    }
}

impl SecureService {
    pub(crate) fn construct(stage: &mut GraphBuilder<'_>, node: NodeId, raw: &HostRef) -> MembraneResult<()> {
        populate(stage, node, ProxyKind::Service, raw)
    }
}

/// Wrap what the node exposes, then seal it. Nodes already built (a raw
/// object reached again) are left untouched.
fn populate(
    stage: &mut GraphBuilder<'_>,
    node: NodeId,
    kind: ProxyKind,
    raw: &HostRef,
) -> MembraneResult<()> {
    if stage.kind(node) != kind || stage.is_sealed(node) {
        return Ok(());
    }
    stage.wrap_reachable(node, raw)?;
    stage.seal(node);
    debug!(kind = %kind, class = raw.class_name(), "Constructed secure proxy");
    Ok(())
}
