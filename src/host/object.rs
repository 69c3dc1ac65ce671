/*!
 * Host Objects
 */

use super::value::HostValue;
use crate::core::id::{next_object_id, ObjectId};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Shared reference to a raw host object
pub type HostRef = Arc<HostObject>;

/// Raw host object: a class name plus a mutable map of named properties
pub struct HostObject {
    id: ObjectId,
    class: String,
    properties: RwLock<BTreeMap<String, HostValue>>,
}

impl HostObject {
    pub fn new(class: impl Into<String>) -> HostRef {
        Arc::new(Self {
            id: next_object_id(),
            class: class.into(),
            properties: RwLock::new(BTreeMap::new()),
        })
    }

    /// Create an object with an initial set of properties
    pub fn with_properties<I, K, V>(class: impl Into<String>, props: I) -> HostRef
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<HostValue>,
    {
        let obj = Self::new(class);
        {
            let mut map = obj.properties.write();
            for (name, value) in props {
                map.insert(name.into(), value.into());
            }
        }
        obj
    }

    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    #[inline]
    pub fn class_name(&self) -> &str {
        &self.class
    }

    /// Read a property; missing names read as `Undefined`
    pub fn get(&self, name: &str) -> HostValue {
        self.properties
            .read()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<HostValue>) {
        self.properties.write().insert(name.into(), value.into());
    }

    pub fn remove(&self, name: &str) -> Option<HostValue> {
        self.properties.write().remove(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.properties.read().contains_key(name)
    }

    /// Property names in sorted order
    pub fn keys(&self) -> Vec<String> {
        self.properties.read().keys().cloned().collect()
    }
}

impl fmt::Debug for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[object {} #{}]", self.class, self.id)
    }
}

impl fmt::Display for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[object {}]", self.class)
    }
}
