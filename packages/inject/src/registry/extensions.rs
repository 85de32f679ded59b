// Extension Registry
//
// Lookup tables of mappers and transformers by annotation name and remappers
// by package. Populated once from discovery sources and read-only afterwards.

use super::api::{AnnotationMapper, AnnotationRemapper, AnnotationTransformer, Extension};
use crate::annotation::package_name;
use crate::diagnostics::ExtensionLoadError;
use once_cell::sync::OnceCell;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

/// Link-time registration of an extension, collected with `inventory`.
pub struct ExtensionRegistration {
    pub name: &'static str,
    pub load: fn() -> Result<Extension, ExtensionLoadError>,
}

inventory::collect!(ExtensionRegistration);

type Loader = Box<dyn FnOnce() -> Result<Extension, ExtensionLoadError>>;

/// An extension that has been found but not constructed yet.
pub struct ExtensionCandidate {
    name: String,
    loader: Loader,
}

impl ExtensionCandidate {
    pub fn new(
        name: impl Into<String>,
        loader: impl FnOnce() -> Result<Extension, ExtensionLoadError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            loader: Box::new(loader),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A source of extension candidates.
pub trait ExtensionDiscovery {
    fn candidates(&self) -> Vec<ExtensionCandidate>;
}

/// Discovers extensions submitted with `inventory::submit!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryDiscovery;

impl ExtensionDiscovery for InventoryDiscovery {
    fn candidates(&self) -> Vec<ExtensionCandidate> {
        let mut candidates = Vec::new();
        for registration in inventory::iter::<ExtensionRegistration> {
            candidates.push(ExtensionCandidate::new(registration.name, registration.load));
        }
        candidates
    }
}

static INSTALLED: OnceCell<Arc<ExtensionRegistry>> = OnceCell::new();

#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    mappers: HashMap<String, Vec<Arc<dyn AnnotationMapper>>>,
    transformers: HashMap<String, Vec<Arc<dyn AnnotationTransformer>>>,
    remappers: HashMap<String, Vec<Arc<dyn AnnotationRemapper>>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry of every extension linked into the process. Built on first
    /// use; later calls share the same instance.
    pub fn installed() -> Arc<ExtensionRegistry> {
        INSTALLED
            .get_or_init(|| Arc::new(Self::load(&[&InventoryDiscovery])))
            .clone()
    }

    /// Loads every candidate of every source. A candidate that fails or
    /// panics while loading is skipped.
    pub fn load(sources: &[&dyn ExtensionDiscovery]) -> Self {
        let mut registry = Self::new();
        for source in sources {
            for candidate in source.candidates() {
                let ExtensionCandidate { name, loader } = candidate;
                match panic::catch_unwind(AssertUnwindSafe(loader)) {
                    Ok(Ok(extension)) => {
                        debug!(extension = %name, key = extension.key(), "loaded annotation extension");
                        registry.register(extension);
                    }
                    Ok(Err(error)) => {
                        warn!(extension = %name, %error, "skipping annotation extension");
                    }
                    Err(_) => {
                        warn!(extension = %name, "annotation extension panicked while loading, skipping");
                    }
                }
            }
        }
        registry
    }

    /// Adds an extension under its key. Extensions with an empty key are
    /// skipped.
    pub fn register(&mut self, extension: Extension) {
        if extension.key().is_empty() {
            warn!(extension = ?extension, "annotation extension has an empty key, skipping");
            return;
        }
        match extension {
            Extension::Mapper(mapper) => self
                .mappers
                .entry(mapper.annotation_name().to_string())
                .or_default()
                .push(mapper),
            Extension::Transformer(transformer) => self
                .transformers
                .entry(transformer.annotation_name().to_string())
                .or_default()
                .push(transformer),
            Extension::Remapper(remapper) => self
                .remappers
                .entry(remapper.package_name().to_string())
                .or_default()
                .push(remapper),
        }
    }

    pub fn with(mut self, extension: Extension) -> Self {
        self.register(extension);
        self
    }

    pub fn with_mapper(self, mapper: impl AnnotationMapper + 'static) -> Self {
        self.with(Extension::mapper(mapper))
    }

    pub fn with_transformer(self, transformer: impl AnnotationTransformer + 'static) -> Self {
        self.with(Extension::transformer(transformer))
    }

    pub fn with_remapper(self, remapper: impl AnnotationRemapper + 'static) -> Self {
        self.with(Extension::remapper(remapper))
    }

    pub fn mappers(&self, annotation_name: &str) -> &[Arc<dyn AnnotationMapper>] {
        self.mappers
            .get(annotation_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn transformers(&self, annotation_name: &str) -> &[Arc<dyn AnnotationTransformer>] {
        self.transformers
            .get(annotation_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn remappers(&self, package: &str) -> &[Arc<dyn AnnotationRemapper>] {
        self.remappers
            .get(package)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Remappers for the package of a qualified annotation name.
    pub fn remappers_for(&self, annotation_name: &str) -> &[Arc<dyn AnnotationRemapper>] {
        self.remappers(package_name(annotation_name))
    }

    /// Whether building would rewrite the annotation in some way.
    pub fn is_annotation_mapped(&self, annotation_name: &str) -> bool {
        self.mappers.contains_key(annotation_name)
            || self.transformers.contains_key(annotation_name)
            || self.remappers.contains_key(package_name(annotation_name))
    }

    pub fn mapped_annotation_names(&self) -> BTreeSet<String> {
        self.mappers
            .keys()
            .chain(self.transformers.keys())
            .cloned()
            .collect()
    }

    pub fn mapped_annotation_packages(&self) -> BTreeSet<String> {
        self.remappers.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty() && self.transformers.is_empty() && self.remappers.is_empty()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("mappers", &self.mappers.keys().collect::<BTreeSet<_>>())
            .field("transformers", &self.transformers.keys().collect::<BTreeSet<_>>())
            .field("remappers", &self.remappers.keys().collect::<BTreeSet<_>>())
            .finish()
    }
}
