/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::id::MembraneId;
use super::types::ProxyKind;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Membrane operation result
pub type MembraneResult<T> = Result<T, MembraneError>;

/// Membrane errors
///
/// Only the runtime that owns key issuance sees these. Key mismatches inside
/// a sandbox never produce an error; they read as absent values.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum MembraneError {
    #[error("Invalid capability key")]
    #[diagnostic(
        code(membrane::invalid_key),
        help("Issue a fresh sandbox key from the registry that owns this runtime. The master key is never accepted.")
    )]
    InvalidKey,

    #[error("Host {kind} is missing required property '{name}'")]
    #[diagnostic(
        code(membrane::missing_host_property),
        help("The raw graph must expose the document and the service handle on the global scope.")
    )]
    MissingHostProperty { kind: ProxyKind, name: String },

    #[error("Host {kind} property '{name}' is not an object")]
    #[diagnostic(code(membrane::not_an_object))]
    NotAnObject { kind: ProxyKind, name: String },

    #[error("Host properties '{first}' and '{second}' refer to the same object")]
    #[diagnostic(
        code(membrane::aliased_host_object),
        help("The global scope, its document and its service handle must be distinct objects.")
    )]
    AliasedHostObject { first: String, second: String },

    #[error("Membrane graph exceeds {0} proxies")]
    #[diagnostic(
        code(membrane::graph_too_large),
        help("Raise max_nodes in the membrane configuration or narrow the readable surface.")
    )]
    GraphTooLarge(usize),

    /// Carries no detail about the proxy or property
    #[error("Cannot modify a frozen object")]
    #[diagnostic(code(membrane::not_extensible))]
    NotExtensible,

    #[error("Sandbox {0} not found")]
    #[diagnostic(code(membrane::sandbox_not_found))]
    SandboxNotFound(MembraneId),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(membrane::config))]
    Config(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(membrane::io))]
    Io(String),
}

impl From<std::io::Error> for MembraneError {
    fn from(err: std::io::Error) -> Self {
        MembraneError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MembraneError {
    fn from(err: serde_json::Error) -> Self {
        MembraneError::Config(err.to_string())
    }
}
