/*!
 * Secure Proxy
 *
 * Handle onto one node of a sealed membrane graph. The public surface is
 * the node's structural members plus whatever the surface policy allows;
 * everything else reads as `Undefined`.
 */

use super::graph::{MembraneGraph, Member, NodeId, ProxyNode};
use super::policy::KindSurface;
use super::value::SecureValue;
use crate::core::errors::{MembraneError, MembraneResult};
use crate::core::id::MembraneId;
use crate::core::types::ProxyKind;
use crate::host::{HostRef, HostValue};
use crate::security::{Key, PrivateState, SecureBase};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Secure stand-in for one raw host object
///
/// Equality is identity: two handles are equal iff they denote the same
/// proxy of the same membrane.
#[derive(Clone)]
pub struct SecureProxy {
    graph: Arc<MembraneGraph>,
    node: NodeId,
}

impl SecureProxy {
    pub(crate) fn new(graph: Arc<MembraneGraph>, node: NodeId) -> Self {
        Self { graph, node }
    }

    #[inline]
    pub(crate) fn graph(&self) -> &Arc<MembraneGraph> {
        &self.graph
    }

    #[inline]
    pub(crate) fn base(&self) -> &SecureBase {
        &self.node().base
    }

    #[inline]
    fn node(&self) -> &ProxyNode {
        self.graph.node(self.node)
    }

    #[inline]
    fn surface(&self) -> &KindSurface {
        self.graph.surface(self.kind())
    }

    /// Another proxy of the same membrane
    #[inline]
    pub(crate) fn sibling(&self, node: NodeId) -> SecureProxy {
        SecureProxy::new(Arc::clone(&self.graph), node)
    }

    #[inline]
    fn raw(&self) -> Option<HostRef> {
        self.graph.raw(self.node)
    }

    #[inline]
    pub fn kind(&self) -> ProxyKind {
        self.base().tag()
    }

    #[inline]
    pub fn class_name(&self) -> &str {
        self.base().class_name()
    }

    #[inline]
    pub fn membrane_id(&self) -> MembraneId {
        self.graph.id()
    }

    /// Number of proxies in this proxy's membrane
    #[inline]
    pub fn membrane_size(&self) -> usize {
        self.graph.len()
    }

    /// Whether both handles denote the same proxy
    #[inline]
    pub fn ptr_eq(a: &SecureProxy, b: &SecureProxy) -> bool {
        Arc::ptr_eq(&a.graph, &b.graph) && a.node == b.node
    }

    /// Whether both handles belong to the same membrane
    #[inline]
    pub fn same_membrane(&self, other: &SecureProxy) -> bool {
        Arc::ptr_eq(&self.graph, &other.graph)
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.node().sealed
    }

    /// Enumerable public names, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = self.node().members.keys().cloned().collect();
        if let Some(raw) = self.raw() {
            let surface = self.surface();
            for name in raw.keys() {
                if names.contains(&name) {
                    continue;
                }
                let exposed = match raw.get(&name) {
                    HostValue::Function(_) => surface.can_call(&name),
                    _ => surface.can_read(&name),
                };
                if exposed {
                    names.insert(name);
                }
            }
        }
        names.into_iter().collect()
    }

    /// Every public name with its current value
    pub fn entries(&self) -> Vec<(String, SecureValue)> {
        self.keys()
            .into_iter()
            .map(|name| {
                let value = self.get(&name);
                (name, value)
            })
            .collect()
    }

    pub fn get(&self, name: &str) -> SecureValue {
        if let Some(member) = self.node().members.get(name) {
            return SecureValue::Proxy(self.resolve(*member));
        }
        if !self.surface().can_read(name) {
            self.graph.record_denial(self.node, name, "not readable");
            return SecureValue::Undefined;
        }
        match self.raw() {
            Some(raw) => self.wrap_outbound(raw.get(name)),
            None => SecureValue::Undefined,
        }
    }

    /// Delegated write. Returns `false` when the write was rejected.
    pub fn set(&self, name: &str, value: impl Into<SecureValue>) -> bool {
        if self.node().members.contains_key(name) || !self.surface().can_write(name) {
            self.graph.record_denial(self.node, name, "not writable");
            return false;
        }
        let Some(inbound) = self.unwrap_inbound(&value.into()) else {
            self.graph.record_denial(self.node, name, "foreign value");
            return false;
        };
        match self.raw() {
            Some(raw) => {
                raw.set(name, inbound);
                true
            }
            None => false,
        }
    }

    /// Delegated call of a curated host function
    pub fn call(&self, name: &str, args: &[SecureValue]) -> SecureValue {
        if !self.surface().can_call(name) {
            self.graph.record_denial(self.node, name, "not callable");
            return SecureValue::Undefined;
        }
        let Some(raw) = self.raw() else {
            return SecureValue::Undefined;
        };
        let HostValue::Function(function) = raw.get(name) else {
            return SecureValue::Undefined;
        };

        let mut raw_args = Vec::with_capacity(args.len());
        for arg in args {
            match self.unwrap_inbound(arg) {
                Some(value) => raw_args.push(value),
                None => {
                    self.graph.record_denial(self.node, name, "foreign argument");
                    return SecureValue::Undefined;
                }
            }
        }
        self.wrap_outbound(function(&raw, &raw_args))
    }

    /// The public shape is sealed; always fails
    pub fn define_property(&self, name: &str, _value: impl Into<SecureValue>) -> MembraneResult<()> {
        self.graph.record_denial(self.node, name, "define on frozen proxy");
        Err(MembraneError::NotExtensible)
    }

    /// The public shape is sealed; always fails
    pub fn delete_property(&self, name: &str) -> MembraneResult<()> {
        self.graph.record_denial(self.node, name, "delete on frozen proxy");
        Err(MembraneError::NotExtensible)
    }

    fn resolve(&self, member: Member) -> SecureProxy {
        match member {
            Member::Child(node) => self.sibling(node),
            Member::SelfRef => self.clone(),
        }
    }

    /// Raw value -> secure value. Objects not wrapped during assembly stay hidden.
    fn wrap_outbound(&self, value: HostValue) -> SecureValue {
        match value {
            HostValue::Undefined | HostValue::Function(_) => SecureValue::Undefined,
            HostValue::Primitive(v) => SecureValue::Primitive(v),
            HostValue::Object(obj) => match self.graph.lookup(&obj) {
                Some(node) => SecureValue::Proxy(self.sibling(node)),
                None => SecureValue::Undefined,
            },
        }
    }

    /// Secure value -> raw value. Proxies from another membrane are refused.
    fn unwrap_inbound(&self, value: &SecureValue) -> Option<HostValue> {
        match value {
            SecureValue::Undefined => Some(HostValue::Undefined),
            SecureValue::Primitive(v) => Some(HostValue::Primitive(v.clone())),
            SecureValue::Proxy(proxy) if self.same_membrane(proxy) => {
                proxy.raw().map(HostValue::Object)
            }
            SecureValue::Proxy(_) => None,
        }
    }
}

impl PrivateState for SecureProxy {
    fn set_private(&self, name: &str, value: HostValue, key: &Key) -> bool {
        self.base().set_private(name, value, key)
    }

    fn get_private(&self, name: &str, key: &Key) -> Option<HostValue> {
        self.base().get_private(name, key)
    }

    fn to_string_tag(&self, key: &Key) -> Option<String> {
        self.base().to_string_tag(key)
    }
}

impl PartialEq for SecureProxy {
    fn eq(&self, other: &Self) -> bool {
        SecureProxy::ptr_eq(self, other)
    }
}

impl Eq for SecureProxy {}

impl Hash for SecureProxy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.graph) as usize).hash(state);
        self.node.hash(state);
    }
}

impl fmt::Display for SecureProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base().describe())
    }
}

impl fmt::Debug for SecureProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
