/*!
 * Membrane Module
 *
 * Secure proxies over a raw host object graph:
 * - One capability key per sandbox, shared by every proxy of the sandbox
 * - Reference identity preserved across the graph (including self-references)
 * - Proxy shapes sealed at the end of construction
 */

pub mod assembler;
pub mod config;
pub mod family;
mod graph;
pub mod manager;
pub mod policy;
pub mod proxy;
pub mod value;

pub use assembler::MembraneAssembler;
pub use config::MembraneConfig;
pub use family::{SecureDocument, SecureService, SecureWindow};
pub use manager::{Membrane, MembraneManager, MembraneStats};
pub use policy::{KindSurface, SurfacePolicy};
pub use proxy::SecureProxy;
pub use value::SecureValue;
