/*!
 * Membrane Limits and Constants
 *
 * Centralized location for well-known property names, defaults and
 * environment variable names.
 * - Security-critical constants are marked with [SECURITY]
 */

// =============================================================================
// WELL-KNOWN HOST PROPERTIES
// =============================================================================

/// Property of the global scope holding its document
pub const DOCUMENT_PROPERTY: &str = "document";

/// Self-referential scope accessor (`window.window === window`)
pub const SCOPE_SELF_PROPERTY: &str = "window";

/// Default name of the privileged service handle on the global scope
pub const DEFAULT_SERVICE_PROPERTY: &str = "$A";

// =============================================================================
// ASSEMBLY LIMITS
// =============================================================================

/// Default upper bound on proxies assembled for one membrane
/// [SECURITY] Bounds the eager walk over an arbitrarily large host graph
pub const DEFAULT_MAX_NODES: usize = 4096;

/// Smallest usable node budget: window, document and service
pub const MIN_MAX_NODES: usize = 3;

// =============================================================================
// KEYS
// =============================================================================

/// Namespace prefix for keys issued without an explicit namespace
pub const ANONYMOUS_NAMESPACE_PREFIX: &str = "sandbox";

/// Namespace reported for the master key
/// [SECURITY] Only ever rendered in runtime-side logs
pub const MASTER_NAMESPACE: &str = "master";

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Path of a JSON membrane configuration file
pub const CONFIG_PATH_ENV: &str = "MEMBRANE_CONFIG_PATH";

/// Enables JSON log output when set to `1` or `true`
pub const TRACE_JSON_ENV: &str = "MEMBRANE_TRACE_JSON";
