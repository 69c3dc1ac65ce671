/*!
 * Security Traits
 * Key-gated private state abstraction shared by the secure base and proxies
 */

use super::key::Key;
use crate::host::HostValue;

/// Private per-instance state addressable only with the owning key
///
/// Every accessor fails the same way on a wrong key: it reads as absent.
/// Implementations must not distinguish "wrong key" from "no such name".
pub trait PrivateState {
    /// Store `value` under `name`. The first successful call fixes the
    /// owning key for the lifetime of the instance.
    ///
    /// Returns `false` when `key` is not the owning key.
    fn set_private(&self, name: &str, value: HostValue, key: &Key) -> bool;

    /// Read the value stored under `name`, or `None` for a wrong key
    fn get_private(&self, name: &str, key: &Key) -> Option<HostValue>;

    /// Diagnostic string including the identity tag and the key
    fn to_string_tag(&self, key: &Key) -> Option<String>;
}
