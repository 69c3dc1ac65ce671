/*!
 * Membrane Configuration
 *
 * Environment variables:
 * - MEMBRANE_CONFIG_PATH: JSON configuration file (default: built-in policy)
 */

use super::policy::SurfacePolicy;
use crate::core::errors::{MembraneError, MembraneResult};
use crate::core::limits::{
    CONFIG_PATH_ENV, DEFAULT_MAX_NODES, DEFAULT_SERVICE_PROPERTY, DOCUMENT_PROPERTY,
    MIN_MAX_NODES, SCOPE_SELF_PROPERTY,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Runtime configuration for assembling membranes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MembraneConfig {
    /// Name of the privileged service handle on the global scope
    pub service_property: String,
    /// Upper bound on proxies per membrane
    pub max_nodes: usize,
    /// Curated surface per proxy kind
    pub surfaces: SurfacePolicy,
}

impl Default for MembraneConfig {
    fn default() -> Self {
        Self {
            service_property: DEFAULT_SERVICE_PROPERTY.to_string(),
            max_nodes: DEFAULT_MAX_NODES,
            surfaces: SurfacePolicy::default(),
        }
    }
}

impl MembraneConfig {
    pub fn from_json_str(json: &str) -> MembraneResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> MembraneResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        info!(path = %path.display(), "Loaded membrane configuration");
        Ok(config)
    }

    /// Load from `MEMBRANE_CONFIG_PATH`, or fall back to defaults when unset
    pub fn from_env() -> MembraneResult<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> MembraneResult<()> {
        let service = self.service_property.trim();
        if service.is_empty() {
            return Err(MembraneError::Config(
                "service_property must not be empty".into(),
            ));
        }
        if service == DOCUMENT_PROPERTY || service == SCOPE_SELF_PROPERTY {
            return Err(MembraneError::Config(format!(
                "service_property '{}' collides with a structural accessor",
                service
            )));
        }
        if self.max_nodes < MIN_MAX_NODES {
            return Err(MembraneError::Config(format!(
                "max_nodes must be at least {}",
                MIN_MAX_NODES
            )));
        }
        Ok(())
    }
}
