/*!
 * Host Values
 */

use super::object::HostRef;
use std::fmt;
use std::sync::Arc;

/// Callable host property. Receives the raw receiver and raw arguments.
pub type HostFunction = Arc<dyn Fn(&HostRef, &[HostValue]) -> HostValue + Send + Sync>;

/// A value stored in a host object property
#[derive(Clone, Default)]
pub enum HostValue {
    #[default]
    Undefined,
    Primitive(serde_json::Value),
    Object(HostRef),
    Function(HostFunction),
}

impl HostValue {
    /// Wrap a host function
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&HostRef, &[HostValue]) -> HostValue + Send + Sync + 'static,
    {
        HostValue::Function(Arc::new(f))
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, HostValue::Undefined)
    }

    #[inline]
    pub fn as_object(&self) -> Option<&HostRef> {
        match self {
            HostValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    #[inline]
    pub fn as_primitive(&self) -> Option<&serde_json::Value> {
        match self {
            HostValue::Primitive(v) => Some(v),
            _ => None,
        }
    }

    /// Same-value comparison: identity for objects and functions
    pub fn same_value(&self, other: &HostValue) -> bool {
        match (self, other) {
            (HostValue::Undefined, HostValue::Undefined) => true,
            (HostValue::Primitive(a), HostValue::Primitive(b)) => a == b,
            (HostValue::Object(a), HostValue::Object(b)) => Arc::ptr_eq(a, b),
            (HostValue::Function(a), HostValue::Function(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Undefined => f.write_str("undefined"),
            HostValue::Primitive(v) => write!(f, "{}", v),
            HostValue::Object(obj) => write!(f, "{:?}", obj),
            HostValue::Function(_) => f.write_str("[function]"),
        }
    }
}

impl From<serde_json::Value> for HostValue {
    fn from(value: serde_json::Value) -> Self {
        HostValue::Primitive(value)
    }
}

impl From<HostRef> for HostValue {
    fn from(obj: HostRef) -> Self {
        HostValue::Object(obj)
    }
}

impl From<&HostRef> for HostValue {
    fn from(obj: &HostRef) -> Self {
        HostValue::Object(Arc::clone(obj))
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::Primitive(s.into())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::Primitive(s.into())
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Primitive(b.into())
    }
}

impl From<i64> for HostValue {
    fn from(n: i64) -> Self {
        HostValue::Primitive(n.into())
    }
}

impl From<f64> for HostValue {
    fn from(n: f64) -> Self {
        HostValue::Primitive(n.into())
    }
}
