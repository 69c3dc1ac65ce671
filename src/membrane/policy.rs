/*!
 * Curated Surface Policy
 * Which host property names each proxy kind re-exposes
 */

use crate::core::types::ProxyKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Allowed property names for one proxy kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KindSurface {
    /// Names readable through `get`
    pub readable: BTreeSet<String>,
    /// Names writable through `set`
    pub writable: BTreeSet<String>,
    /// Names invocable through `call`
    pub callable: BTreeSet<String>,
}

impl KindSurface {
    pub fn new(readable: &[&str], writable: &[&str], callable: &[&str]) -> Self {
        let collect = |names: &[&str]| names.iter().map(|n| n.to_string()).collect();
        Self {
            readable: collect(readable),
            writable: collect(writable),
            callable: collect(callable),
        }
    }

    #[inline]
    pub fn can_read(&self, name: &str) -> bool {
        self.readable.contains(name)
    }

    #[inline]
    pub fn can_write(&self, name: &str) -> bool {
        self.writable.contains(name)
    }

    #[inline]
    pub fn can_call(&self, name: &str) -> bool {
        self.callable.contains(name)
    }
}

/// Curated surface for every proxy kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SurfacePolicy {
    pub window: KindSurface,
    pub document: KindSurface,
    pub service: KindSurface,
    pub object: KindSurface,
}

impl SurfacePolicy {
    /// Policy exposing nothing beyond the structural accessors
    pub fn closed() -> Self {
        Self {
            window: KindSurface::default(),
            document: KindSurface::default(),
            service: KindSurface::default(),
            object: KindSurface::default(),
        }
    }

    #[inline]
    pub fn for_kind(&self, kind: ProxyKind) -> &KindSurface {
        match kind {
            ProxyKind::Window => &self.window,
            ProxyKind::Document => &self.document,
            ProxyKind::Service => &self.service,
            ProxyKind::Object => &self.object,
        }
    }

    pub fn for_kind_mut(&mut self, kind: ProxyKind) -> &mut KindSurface {
        match kind {
            ProxyKind::Window => &mut self.window,
            ProxyKind::Document => &mut self.document,
            ProxyKind::Service => &mut self.service,
            ProxyKind::Object => &mut self.object,
        }
    }
}

impl Default for SurfacePolicy {
    fn default() -> Self {
        Self {
            window: KindSurface::new(
                &["innerHeight", "innerWidth", "location", "name"],
                &["name"],
                &[],
            ),
            document: KindSurface::new(
                &["URL", "body", "documentElement", "head", "readyState", "title"],
                &["title"],
                &["getElementById", "querySelector"],
            ),
            service: KindSurface::new(&["version"], &[], &["get", "log"]),
            object: KindSurface::new(
                &[
                    "className",
                    "firstChild",
                    "id",
                    "nextSibling",
                    "nodeName",
                    "parentNode",
                    "tagName",
                    "textContent",
                ],
                &["className", "textContent"],
                &["getAttribute", "hasAttribute", "setAttribute"],
            ),
        }
    }
}
