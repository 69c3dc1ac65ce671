/*!
 * Membrane Graph
 *
 * All proxies of one sandbox live in a single arena. Assembly fills a
 * mutable `GraphBuilder`; `finish` seals it into an immutable
 * `MembraneGraph` shared by every proxy handle of that sandbox.
 */

use super::config::MembraneConfig;
use super::policy::{KindSurface, SurfacePolicy};
use crate::core::errors::{MembraneError, MembraneResult};
use crate::core::id::{MembraneId, ObjectId};
use crate::core::types::ProxyKind;
use crate::host::{HostRef, HostValue};
use crate::security::{Key, PrivateState, SecureBase};
use ahash::RandomState;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

pub(crate) type NodeId = usize;

/// Structural member of a proxy's public shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Member {
    /// Proxy built for a nested raw reference
    Child(NodeId),
    /// The proxy itself
    SelfRef,
}

pub(crate) struct ProxyNode {
    pub(crate) base: SecureBase,
    pub(crate) members: BTreeMap<String, Member>,
    pub(crate) sealed: bool,
}

/// Well-known nodes of the root window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RootLinks {
    pub(crate) window: NodeId,
    pub(crate) document: NodeId,
    pub(crate) service: NodeId,
}

/// Sealed proxy graph of one sandbox
pub(crate) struct MembraneGraph {
    id: MembraneId,
    key: Key,
    nodes: Vec<ProxyNode>,
    by_object: HashMap<ObjectId, NodeId, RandomState>,
    surfaces: SurfacePolicy,
    links: RootLinks,
    denied: AtomicU64,
}

impl MembraneGraph {
    #[inline]
    pub(crate) fn id(&self) -> MembraneId {
        self.id
    }

    #[inline]
    pub(crate) fn links(&self) -> RootLinks {
        self.links
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &ProxyNode {
        &self.nodes[id]
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub(crate) fn surface(&self, kind: ProxyKind) -> &KindSurface {
        self.surfaces.for_kind(kind)
    }

    /// Raw reference of `id`, read back through its key-gated slot
    pub(crate) fn raw(&self, id: NodeId) -> Option<HostRef> {
        let base = &self.node(id).base;
        match base.get_private(base.tag().slot_name(), &self.key) {
            Some(HostValue::Object(obj)) => Some(obj),
            _ => None,
        }
    }

    /// Proxy built for `obj` during assembly, if any
    #[inline]
    pub(crate) fn lookup(&self, obj: &HostRef) -> Option<NodeId> {
        self.by_object.get(&obj.id()).copied()
    }

    pub(crate) fn record_denial(&self, id: NodeId, property: &str, reason: &'static str) {
        self.denied.fetch_add(1, Ordering::Relaxed);
        debug!(
            membrane = %self.id,
            kind = %self.node(id).base.tag(),
            property,
            reason,
            "Denied access"
        );
    }

    #[inline]
    pub(crate) fn denied(&self) -> u64 {
        self.denied.load(Ordering::Relaxed)
    }
}

/// Mutable staging area used while a membrane is assembled
pub(crate) struct GraphBuilder<'a> {
    id: MembraneId,
    key: Key,
    config: &'a MembraneConfig,
    nodes: Vec<ProxyNode>,
    by_object: HashMap<ObjectId, NodeId, RandomState>,
}

impl<'a> GraphBuilder<'a> {
    pub(crate) fn new(key: Key, config: &'a MembraneConfig) -> Self {
        Self {
            id: MembraneId::new(),
            key,
            config,
            nodes: Vec::new(),
            by_object: HashMap::with_hasher(RandomState::new()),
        }
    }

    #[inline]
    pub(crate) fn config(&self) -> &'a MembraneConfig {
        self.config
    }

    #[inline]
    pub(crate) fn lookup(&self, raw: &HostRef) -> Option<NodeId> {
        self.by_object.get(&raw.id()).copied()
    }

    #[inline]
    pub(crate) fn kind(&self, id: NodeId) -> ProxyKind {
        self.nodes[id].base.tag()
    }

    #[inline]
    pub(crate) fn is_sealed(&self, id: NodeId) -> bool {
        self.nodes[id].sealed
    }

    /// Allocate an unsealed node whose private slot holds `raw`
    ///
    /// The slot's first write uses the sandbox key, which fixes it as owner.
    pub(crate) fn alloc(&mut self, kind: ProxyKind, raw: &HostRef) -> MembraneResult<NodeId> {
        if self.nodes.len() >= self.config.max_nodes {
            return Err(MembraneError::GraphTooLarge(self.config.max_nodes));
        }
        let base = SecureBase::new(kind, raw.class_name());
        base.set_private(kind.slot_name(), HostValue::from(raw), &self.key);

        let id = self.nodes.len();
        self.nodes.push(ProxyNode {
            base,
            members: BTreeMap::new(),
            sealed: false,
        });
        self.by_object.insert(raw.id(), id);
        trace!(node = id, kind = %kind, class = raw.class_name(), "Allocated proxy");
        Ok(id)
    }

    /// Existing node for `raw`, or a freshly allocated one
    pub(crate) fn intern(&mut self, kind: ProxyKind, raw: &HostRef) -> MembraneResult<NodeId> {
        match self.lookup(raw) {
            Some(existing) => Ok(existing),
            None => self.alloc(kind, raw),
        }
    }

    pub(crate) fn attach(&mut self, id: NodeId, name: &str, member: Member) {
        let node = &mut self.nodes[id];
        debug_assert!(!node.sealed, "member attached to a sealed proxy");
        if !node.sealed {
            node.members.insert(name.to_string(), member);
        }
    }

    pub(crate) fn seal(&mut self, id: NodeId) {
        self.nodes[id].sealed = true;
    }

    /// Wrap every object reachable through the curated readable names of `id`
    ///
    /// Walks breadth-first over an explicit worklist, so the depth of the host
    /// graph never grows the call stack. Every node discovered here is sealed
    /// once its own surface has been walked; `id` itself is left to the caller.
    pub(crate) fn wrap_reachable(&mut self, id: NodeId, raw: &HostRef) -> MembraneResult<()> {
        let mut pending = VecDeque::new();
        self.discover(id, raw, &mut pending)?;
        while let Some((next, next_raw)) = pending.pop_front() {
            self.discover(next, &next_raw, &mut pending)?;
            self.seal(next);
        }
        Ok(())
    }

    /// Allocate nodes for the unseen objects behind the readable names of `id`
    fn discover(
        &mut self,
        id: NodeId,
        raw: &HostRef,
        pending: &mut VecDeque<(NodeId, HostRef)>,
    ) -> MembraneResult<()> {
        let node = &self.nodes[id];
        let names: Vec<String> = self
            .config
            .surfaces
            .for_kind(node.base.tag())
            .readable
            .iter()
            .filter(|name| !node.members.contains_key(name.as_str()))
            .cloned()
            .collect();

        for name in names {
            if let HostValue::Object(child) = raw.get(&name) {
                if self.lookup(&child).is_none() {
                    let child_id = self.alloc(ProxyKind::Object, &child)?;
                    pending.push_back((child_id, child));
                }
            }
        }
        Ok(())
    }

    /// Memoized wrap of a generic host object and everything it exposes
    pub(crate) fn wrap_object(&mut self, raw: &HostRef) -> MembraneResult<NodeId> {
        if let Some(existing) = self.lookup(raw) {
            return Ok(existing);
        }
        let id = self.alloc(ProxyKind::Object, raw)?;
        self.wrap_reachable(id, raw)?;
        self.seal(id);
        Ok(id)
    }

    /// Seal the staged nodes into an immutable graph
    pub(crate) fn finish(self, links: RootLinks) -> MembraneGraph {
        debug_assert!(self.nodes.iter().all(|node| node.sealed));
        debug!(membrane = %self.id, proxies = self.nodes.len(), "Sealed membrane graph");
        MembraneGraph {
            id: self.id,
            key: self.key,
            nodes: self.nodes,
            by_object: self.by_object,
            surfaces: self.config.surfaces.clone(),
            links,
            denied: AtomicU64::new(0),
        }
    }
}
