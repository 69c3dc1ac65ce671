/*!
 * Secure Membrane Library
 *
 * Wraps a raw global scope, its document and its privileged service handle
 * behind secure proxies gated by one capability key per sandbox.
 */

pub mod core;
pub mod host;
pub mod membrane;
pub mod monitoring;
pub mod security;

// Re-exports
pub use crate::core::{MembraneError, MembraneId, MembraneResult, ProxyKind};
pub use host::{HostFunction, HostObject, HostRef, HostValue};
pub use membrane::{
    Membrane, MembraneAssembler, MembraneConfig, MembraneManager, MembraneStats, SecureDocument,
    SecureProxy, SecureService, SecureValue, SecureWindow, SurfacePolicy,
};
pub use monitoring::init_tracing;
pub use security::{Key, KeyRegistry, PrivateState, SecureBase};
