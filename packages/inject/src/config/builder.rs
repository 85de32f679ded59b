use crate::annotation::names::{
    DEFAULT_ANNOTATE_EXCLUDES, DEPRECATED_ANNOTATION_NAMES, INTERNAL_ANNOTATION_NAMES,
    STEREOTYPE_EXCLUDES,
};
use crate::diagnostics::ExtensionLoadError;
use crate::registry::{
    Extension, ExtensionCandidate, ExtensionDiscovery, ExtensionRegistry, InventoryDiscovery,
    PackageRemapper, RenameTransformer,
};
use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Builder settings. Every field falls back to the built-in default when
/// absent from the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuilderConfig {
    /// Annotations that are never recorded.
    pub internal_annotations: Vec<String>,
    /// Packages whose annotations are not walked for stereotypes.
    pub stereotype_excludes: Vec<String>,
    /// Stereotypes skipped by `annotate`.
    pub annotate_excludes: Vec<String>,
    /// Deprecated annotation names mapped to their replacements.
    pub deprecated_annotations: IndexMap<String, String>,
    pub extensions: ExtensionConfig,
    pub visitor_options: IndexMap<String, String>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            internal_annotations: to_strings(INTERNAL_ANNOTATION_NAMES),
            stereotype_excludes: to_strings(STEREOTYPE_EXCLUDES),
            annotate_excludes: to_strings(DEFAULT_ANNOTATE_EXCLUDES),
            deprecated_annotations: DEPRECATED_ANNOTATION_NAMES
                .iter()
                .map(|(name, replacement)| (name.to_string(), replacement.to_string()))
                .collect(),
            extensions: ExtensionConfig::default(),
            visitor_options: IndexMap::new(),
        }
    }
}

/// Declarative extensions loaded next to the linked ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtensionConfig {
    /// Whether extensions linked into the process are loaded as well.
    pub include_installed: bool,
    /// Annotation renames, source name to target name.
    pub renames: IndexMap<String, String>,
    /// Package moves, source package to target package.
    pub package_remaps: IndexMap<String, String>,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            include_installed: true,
            renames: IndexMap::new(),
            package_remaps: IndexMap::new(),
        }
    }
}

impl BuilderConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read builder config {}", path.display()))?;
        let config = Self::from_json_str(&content)
            .with_context(|| format!("invalid builder config {}", path.display()))?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    pub fn is_internal(&self, annotation_name: &str) -> bool {
        self.internal_annotations.iter().any(|n| n == annotation_name)
    }

    pub fn is_stereotype_excluded(&self, package: &str) -> bool {
        self.stereotype_excludes.iter().any(|p| p == package)
    }

    pub fn deprecated_replacement(&self, annotation_name: &str) -> Option<&str> {
        self.deprecated_annotations
            .get(annotation_name)
            .map(String::as_str)
    }

    /// Builds the extension registry this configuration describes.
    pub fn extension_registry(&self) -> ExtensionRegistry {
        if self.extensions.include_installed {
            ExtensionRegistry::load(&[&InventoryDiscovery, &self.extensions])
        } else {
            ExtensionRegistry::load(&[&self.extensions])
        }
    }
}

impl ExtensionDiscovery for ExtensionConfig {
    fn candidates(&self) -> Vec<ExtensionCandidate> {
        let renames = self.renames.iter().map(|(from, to)| {
            let transformer = RenameTransformer::new(from.clone(), to.clone());
            ExtensionCandidate::new(format!("rename {from} -> {to}"), move || {
                Ok(Extension::transformer(transformer))
            })
        });
        let remaps = self.package_remaps.iter().map(|(from, to)| {
            let name = format!("remap {from} -> {to}");
            let (from, to) = (from.clone(), to.clone());
            ExtensionCandidate::new(name.clone(), move || {
                if from.is_empty() || to.is_empty() {
                    return Err(ExtensionLoadError::Invalid {
                        extension: name,
                        reason: "package names must not be empty".to_string(),
                    });
                }
                Ok(Extension::remapper(PackageRemapper::new(from, to)))
            })
        });
        renames.chain(remaps).collect()
    }
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
