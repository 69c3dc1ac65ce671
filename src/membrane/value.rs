/*!
 * Secure Values
 * What sandboxed code receives from and hands back to a proxy
 */

use super::proxy::SecureProxy;

/// A value crossing the membrane
///
/// Primitives pass through unchanged. Host objects only ever appear as
/// proxies of the same membrane.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SecureValue {
    #[default]
    Undefined,
    Primitive(serde_json::Value),
    Proxy(SecureProxy),
}

impl SecureValue {
    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, SecureValue::Undefined)
    }

    #[inline]
    pub fn as_proxy(&self) -> Option<&SecureProxy> {
        match self {
            SecureValue::Proxy(proxy) => Some(proxy),
            _ => None,
        }
    }

    #[inline]
    pub fn into_proxy(self) -> Option<SecureProxy> {
        match self {
            SecureValue::Proxy(proxy) => Some(proxy),
            _ => None,
        }
    }

    #[inline]
    pub fn as_primitive(&self) -> Option<&serde_json::Value> {
        match self {
            SecureValue::Primitive(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        self.as_primitive().and_then(|v| v.as_str())
    }
}

impl From<serde_json::Value> for SecureValue {
    fn from(value: serde_json::Value) -> Self {
        SecureValue::Primitive(value)
    }
}

impl From<SecureProxy> for SecureValue {
    fn from(proxy: SecureProxy) -> Self {
        SecureValue::Proxy(proxy)
    }
}

impl From<&SecureProxy> for SecureValue {
    fn from(proxy: &SecureProxy) -> Self {
        SecureValue::Proxy(proxy.clone())
    }
}

impl From<&str> for SecureValue {
    fn from(s: &str) -> Self {
        SecureValue::Primitive(s.into())
    }
}

impl From<String> for SecureValue {
    fn from(s: String) -> Self {
        SecureValue::Primitive(s.into())
    }
}

impl From<bool> for SecureValue {
    fn from(b: bool) -> Self {
        SecureValue::Primitive(b.into())
    }
}

impl From<i64> for SecureValue {
    fn from(n: i64) -> Self {
        SecureValue::Primitive(n.into())
    }
}

impl From<f64> for SecureValue {
    fn from(n: f64) -> Self {
        SecureValue::Primitive(n.into())
    }
}
