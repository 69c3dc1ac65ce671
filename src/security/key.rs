/*!
 * Key Registry
 *
 * Capability keys are unforgeable: they can only be minted by a
 * `KeyRegistry` and compare equal only to clones of themselves.
 */

use crate::core::id::{AtomicGenerator, IdGenerator, KeyId};
use crate::core::limits::{ANONYMOUS_NAMESPACE_PREFIX, MASTER_NAMESPACE};
use ahash::RandomState;
use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;
use uuid::Uuid;

struct KeyInner {
    id: KeyId,
    namespace: String,
    registry: Uuid,
    master: bool,
}

/// Opaque capability key with reference-only equality
#[derive(Clone)]
pub struct Key(Arc<KeyInner>);

impl Key {
    fn mint(id: KeyId, namespace: String, registry: Uuid, master: bool) -> Self {
        Self(Arc::new(KeyInner {
            id,
            namespace,
            registry,
            master,
        }))
    }

    /// Diagnostic number; two keys never share one within a registry
    #[inline]
    pub fn id(&self) -> KeyId {
        self.0.id
    }

    #[inline]
    pub fn namespace(&self) -> &str {
        &self.0.namespace
    }

    /// Reference identity
    #[inline]
    pub fn is(&self, other: &Key) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    #[inline]
    pub(crate) fn is_master(&self) -> bool {
        self.0.master
    }

    #[inline]
    pub(crate) fn same_registry(&self, other: &Key) -> bool {
        self.0.registry == other.0.registry
    }

    pub(crate) fn descriptor(&self) -> KeyDescriptor {
        KeyDescriptor {
            namespace: self.0.namespace.clone(),
            id: self.0.id,
        }
    }

    fn downgrade(&self) -> Weak<KeyInner> {
        Arc::downgrade(&self.0)
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.is(other)
    }
}

impl Eq for Key {}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("id", &self.0.id)
            .field("namespace", &self.0.namespace)
            .finish()
    }
}

/// Serializable rendering of a key for diagnostic strings
///
/// Holding a descriptor grants nothing: keys compare by identity only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyDescriptor {
    pub namespace: String,
    pub id: KeyId,
}

/// Issues sandbox keys and holds the runtime's master key
pub struct KeyRegistry {
    id: Uuid,
    master: Key,
    ids: AtomicGenerator<KeyId>,
    live: DashMap<KeyId, Weak<KeyInner>, RandomState>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        let id = Uuid::new_v4();
        let master = Key::mint(KeyId(0), MASTER_NAMESPACE.to_string(), id, true);
        debug!(registry = %id, "Key registry initialized");
        Self {
            id,
            master,
            ids: AtomicGenerator::default_start(),
            live: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Issue a fresh key with a generated namespace
    pub fn issue_key(&self) -> Key {
        let id = self.ids.next();
        self.register(Key::mint(
            id,
            format!("{}-{}", ANONYMOUS_NAMESPACE_PREFIX, id),
            self.id,
            false,
        ))
    }

    /// Issue a fresh key labelled with `namespace`
    ///
    /// The label is diagnostic only: two keys issued for the same namespace
    /// are still distinct.
    pub fn issue_key_for(&self, namespace: impl Into<String>) -> Key {
        let id = self.ids.next();
        self.register(Key::mint(id, namespace.into(), self.id, false))
    }

    fn register(&self, key: Key) -> Key {
        self.live.insert(key.id(), key.downgrade());
        debug!(key_id = %key.id(), namespace = key.namespace(), "Issued sandbox key");
        key
    }

    /// Succeeds iff both keys are the same key
    #[inline]
    pub fn verify(candidate: &Key, expected: &Key) -> bool {
        candidate.is(expected)
    }

    /// Whether `key` is a sandbox key issued by this registry
    pub fn accepts(&self, key: &Key) -> bool {
        !key.is_master() && key.0.registry == self.id
    }

    #[inline]
    pub(crate) fn master_key(&self) -> &Key {
        &self.master
    }

    /// Total sandbox keys issued so far
    pub fn keys_issued(&self) -> u64 {
        self.ids.current().0.saturating_sub(1)
    }

    /// Sandbox keys still referenced somewhere
    pub fn live_keys(&self) -> usize {
        self.live.retain(|_, key| key.strong_count() > 0);
        self.live.len()
    }
}

impl Default for KeyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
