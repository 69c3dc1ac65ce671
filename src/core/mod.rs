/*!
 * Core Module
 * Fundamental membrane types, identifiers and error handling
 */

pub mod errors;
pub mod id;
pub mod limits;
pub mod types;

// Re-export for convenience
pub use errors::*;
pub use id::{IdGenerator, KeyId, MembraneId, ObjectId};
pub use types::*;
