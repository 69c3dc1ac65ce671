/*!
 * Secure Base
 *
 * Private state slot shared by every secure wrapper. Values are reachable
 * only by presenting the slot's owning key; any other key reads as empty.
 */

use super::key::{Key, KeyRegistry};
use super::traits::PrivateState;
use crate::core::types::ProxyKind;
use crate::host::HostValue;
use ahash::RandomState;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::trace;

#[derive(Default)]
struct PrivateSlot {
    owner: Option<Key>,
    values: HashMap<String, HostValue, RandomState>,
}

/// Key-gated private state plus the identity tag of a secure wrapper
pub struct SecureBase {
    tag: ProxyKind,
    class: String,
    slot: RwLock<PrivateSlot>,
}

impl SecureBase {
    /// Fresh, empty slot. The owning key is fixed by the first `set_private`.
    pub fn new(tag: ProxyKind, class: impl Into<String>) -> Self {
        Self {
            tag,
            class: class.into(),
            slot: RwLock::new(PrivateSlot::default()),
        }
    }

    #[inline]
    pub fn tag(&self) -> ProxyKind {
        self.tag
    }

    /// Class name of the wrapped host object
    #[inline]
    pub fn class_name(&self) -> &str {
        &self.class
    }

    /// Owning key, for runtime-internal use only
    pub(crate) fn owner(&self) -> Option<Key> {
        self.slot.read().owner.clone()
    }

    /// Owning key, released only against the master key of the same registry
    pub(crate) fn owner_with_master(&self, master: &Key) -> Option<Key> {
        let owner = self.owner()?;
        (master.is_master() && master.same_registry(&owner)).then_some(owner)
    }

    /// Ungated diagnostic string: tag and wrapped class only
    pub fn describe(&self) -> String {
        format!("{}: [object {}]", self.tag.wrapper_name(), self.class)
    }
}

impl PrivateState for SecureBase {
    fn set_private(&self, name: &str, value: HostValue, key: &Key) -> bool {
        let mut slot = self.slot.write();
        match &slot.owner {
            None => slot.owner = Some(key.clone()),
            Some(owner) if !KeyRegistry::verify(key, owner) => {
                trace!(tag = %self.tag, "Rejected private write");
                return false;
            }
            Some(_) => {}
        }
        slot.values.insert(name.to_string(), value);
        true
    }

    fn get_private(&self, name: &str, key: &Key) -> Option<HostValue> {
        let slot = self.slot.read();
        let owner = slot.owner.as_ref()?;
        if !KeyRegistry::verify(key, owner) {
            return None;
        }
        slot.values.get(name).cloned()
    }

    fn to_string_tag(&self, key: &Key) -> Option<String> {
        {
            let slot = self.slot.read();
            let owner = slot.owner.as_ref()?;
            if !KeyRegistry::verify(key, owner) {
                return None;
            }
        }
        let rendered = serde_json::to_string(&key.descriptor()).ok()?;
        Some(format!("{}{{ key: {} }}", self.describe(), rendered))
    }
}
