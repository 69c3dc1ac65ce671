/*!
 * Security Module
 * Capability keys and key-gated private state for secure proxies
 */

pub mod base;
pub mod key;
pub mod traits;

// Re-export for convenience
pub use base::SecureBase;
pub use key::{Key, KeyDescriptor, KeyRegistry};
pub use traits::PrivateState;
