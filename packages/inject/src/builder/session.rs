// Build Session
//
// State shared by every builder of one compilation: configuration, extension
// registry, mutation cache and annotation defaults.

use super::cache::MutationCache;
use crate::config::BuilderConfig;
use crate::metadata::{AnnotationMetadata, DefaultValueRegistry};
use crate::registry::ExtensionRegistry;
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

/// Shared between builders through an `Arc`; every map is synchronized so
/// builders on different threads may use the same session.
#[derive(Debug)]
pub struct BuildSession<E> {
    config: BuilderConfig,
    registry: Arc<ExtensionRegistry>,
    mutated: MutationCache<E>,
    defaults: DefaultValueRegistry,
}

impl<E: Clone + Eq + Hash> BuildSession<E> {
    pub fn new(config: BuilderConfig, registry: Arc<ExtensionRegistry>) -> Self {
        Self {
            config,
            registry,
            mutated: MutationCache::new(),
            defaults: DefaultValueRegistry::new(),
        }
    }

    /// A session whose registry holds the extensions the configuration asks for.
    pub fn from_config(config: BuilderConfig) -> Self {
        let registry = Arc::new(config.extension_registry());
        Self::new(config, registry)
    }

    /// A session with default configuration and the extensions linked into
    /// the process.
    pub fn installed() -> Self {
        Self::new(BuilderConfig::default(), ExtensionRegistry::installed())
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    pub fn defaults(&self) -> &DefaultValueRegistry {
        &self.defaults
    }

    pub fn mutated(&self) -> &MutationCache<E> {
        &self.mutated
    }

    pub fn add_mutated_metadata(&self, declaring_type: &str, element: &E, metadata: AnnotationMetadata) {
        self.mutated.add(declaring_type, element, metadata);
    }

    pub fn is_metadata_mutated(&self, declaring_type: &str, element: &E) -> bool {
        self.mutated.contains(declaring_type, element)
    }

    /// Drops every registered mutation; called at the end of a compilation round.
    pub fn clear_mutated(&self) {
        debug!(entries = self.mutated.len(), "clearing mutated annotation metadata");
        self.mutated.clear();
    }
}
