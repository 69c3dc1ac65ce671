/*!
 * Membrane Assembler
 *
 * Builds one sealed proxy graph for one raw global scope and one sandbox key.
 */

use super::config::MembraneConfig;
use super::family::SecureWindow;
use super::graph::GraphBuilder;
use crate::core::errors::{MembraneError, MembraneResult};
use crate::host::HostRef;
use crate::security::{Key, KeyRegistry};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub struct MembraneAssembler<'a> {
    registry: &'a KeyRegistry,
    config: &'a MembraneConfig,
}

impl<'a> MembraneAssembler<'a> {
    pub fn new(registry: &'a KeyRegistry, config: &'a MembraneConfig) -> Self {
        Self { registry, config }
    }

    /// Wrap `raw_window` and everything its curated surface reaches
    ///
    /// Fails when `key` is not a sandbox key of this registry, or when the
    /// raw graph lacks the document or the service handle.
    #[instrument(skip(self, raw_window, key), fields(key_id = %key.id(), class = raw_window.class_name()))]
    pub fn assemble(&self, raw_window: &HostRef, key: &Key) -> MembraneResult<SecureWindow> {
        if !self.registry.accepts(key) {
            warn!(key_id = %key.id(), "Refused to assemble membrane with an invalid key");
            return Err(MembraneError::InvalidKey);
        }
        self.config.validate()?;

        let mut stage = GraphBuilder::new(key.clone(), self.config);
        let links = SecureWindow::construct(&mut stage, raw_window)?;
        let graph = Arc::new(stage.finish(links));

        debug!(
            membrane = %graph.id(),
            key_id = %key.id(),
            proxies = graph.len(),
            "Membrane assembled"
        );
        Ok(SecureWindow::from_graph(graph))
    }
}
