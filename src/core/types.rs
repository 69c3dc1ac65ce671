/*!
 * Core Types
 * Common types used across the membrane
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of host object a secure proxy stands in for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyKind {
    /// Global scope
    Window,
    /// The scope's document
    Document,
    /// Privileged service handle exposed on the scope
    Service,
    /// Any other host object reachable through a curated property
    Object,
}

impl ProxyKind {
    pub const ALL: [ProxyKind; 4] = [
        ProxyKind::Window,
        ProxyKind::Document,
        ProxyKind::Service,
        ProxyKind::Object,
    ];

    /// Name under which the wrapped raw reference lives in the private slot
    #[inline]
    #[must_use]
    pub const fn slot_name(self) -> &'static str {
        match self {
            ProxyKind::Window => "window",
            ProxyKind::Document => "document",
            ProxyKind::Service => "service",
            ProxyKind::Object => "object",
        }
    }

    /// Wrapper type name used in diagnostic strings
    #[inline]
    #[must_use]
    pub const fn wrapper_name(self) -> &'static str {
        match self {
            ProxyKind::Window => "SecureWindow",
            ProxyKind::Document => "SecureDocument",
            ProxyKind::Service => "SecureService",
            ProxyKind::Object => "SecureObject",
        }
    }
}

impl fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slot_name())
    }
}
