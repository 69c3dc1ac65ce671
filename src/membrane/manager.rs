/*!
 * Membrane Manager
 * Runtime side of the membrane: issues keys, opens and closes sandboxes
 */

use super::assembler::MembraneAssembler;
use super::config::MembraneConfig;
use super::family::SecureWindow;
use super::proxy::SecureProxy;
use crate::core::errors::{MembraneError, MembraneResult};
use crate::core::id::MembraneId;
use crate::host::HostRef;
use crate::security::{Key, KeyRegistry};
use ahash::RandomState;
use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{info, instrument, warn};

/// One open sandbox as seen by the runtime
#[derive(Clone)]
pub struct Membrane {
    id: MembraneId,
    key: Key,
    root: SecureWindow,
    opened_at: SystemTime,
}

impl Membrane {
    #[inline]
    pub fn id(&self) -> MembraneId {
        self.id
    }

    #[inline]
    pub fn namespace(&self) -> &str {
        self.key.namespace()
    }

    /// Sandbox key. Stays with the runtime; never hand it to sandboxed code.
    #[inline]
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Root proxy to hand to sandboxed code
    #[inline]
    pub fn root(&self) -> &SecureWindow {
        &self.root
    }

    #[inline]
    pub fn opened_at(&self) -> SystemTime {
        self.opened_at
    }

    #[inline]
    pub fn proxy_count(&self) -> usize {
        self.root.membrane_size()
    }

    /// Accesses refused by any proxy of this membrane
    #[inline]
    pub fn denied_accesses(&self) -> u64 {
        self.root.graph().denied()
    }
}

impl fmt::Debug for Membrane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Membrane")
            .field("id", &self.id)
            .field("namespace", &self.namespace())
            .field("proxies", &self.proxy_count())
            .finish()
    }
}

/// Runtime statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MembraneStats {
    pub open_sandboxes: usize,
    pub keys_issued: u64,
    pub live_keys: usize,
    pub denied_accesses: u64,
}

/// Owns the key registry and the set of open sandboxes
#[derive(Clone)]
pub struct MembraneManager {
    registry: Arc<KeyRegistry>,
    config: Arc<MembraneConfig>,
    sandboxes: Arc<DashMap<MembraneId, Membrane, RandomState>>,
}

impl MembraneManager {
    pub fn new(config: MembraneConfig) -> MembraneResult<Self> {
        config.validate()?;
        info!(
            service = %config.service_property,
            max_nodes = config.max_nodes,
            "Membrane manager initialized"
        );
        Ok(Self {
            registry: Arc::new(KeyRegistry::new()),
            config: Arc::new(config),
            sandboxes: Arc::new(DashMap::with_hasher(RandomState::new())),
        })
    }

    /// Manager configured from `MEMBRANE_CONFIG_PATH` or defaults
    pub fn from_env() -> MembraneResult<Self> {
        Self::new(MembraneConfig::from_env()?)
    }

    #[inline]
    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    #[inline]
    pub fn config(&self) -> &MembraneConfig {
        &self.config
    }

    /// Issue a key for `namespace` and wrap `raw_window` under it
    #[instrument(skip(self, raw_window))]
    pub fn open_sandbox(&self, namespace: &str, raw_window: &HostRef) -> MembraneResult<Membrane> {
        let key = self.registry.issue_key_for(namespace);
        let root = MembraneAssembler::new(&self.registry, &self.config)
            .assemble(raw_window, &key)
            .inspect_err(|e| warn!(namespace, error = %e, "Failed to open sandbox"))?;

        let membrane = Membrane {
            id: root.membrane_id(),
            key,
            root,
            opened_at: SystemTime::now(),
        };
        self.sandboxes.insert(membrane.id, membrane.clone());
        info!(
            membrane = %membrane.id,
            namespace,
            proxies = membrane.proxy_count(),
            "Opened sandbox"
        );
        Ok(membrane)
    }

    /// Drop the runtime's references to a sandbox
    pub fn close_sandbox(&self, id: MembraneId) -> bool {
        if self.sandboxes.remove(&id).is_some() {
            info!(membrane = %id, "Closed sandbox");
            true
        } else {
            false
        }
    }

    pub fn has_sandbox(&self, id: MembraneId) -> bool {
        self.sandboxes.contains_key(&id)
    }

    pub fn get(&self, id: MembraneId) -> Option<Membrane> {
        self.sandboxes.get(&id).map(|m| m.clone())
    }

    pub fn root(&self, id: MembraneId) -> MembraneResult<SecureWindow> {
        self.sandboxes
            .get(&id)
            .map(|m| m.root.clone())
            .ok_or(MembraneError::SandboxNotFound(id))
    }

    /// Owning key of any proxy created by this runtime (master-key lookup)
    pub fn key_of(&self, proxy: &SecureProxy) -> Option<Key> {
        proxy.base().owner_with_master(self.registry.master_key())
    }

    pub fn stats(&self) -> MembraneStats {
        MembraneStats {
            open_sandboxes: self.sandboxes.len(),
            keys_issued: self.registry.keys_issued(),
            live_keys: self.registry.live_keys(),
            denied_accesses: self
                .sandboxes
                .iter()
                .map(|entry| entry.value().denied_accesses())
                .sum(),
        }
    }
}
