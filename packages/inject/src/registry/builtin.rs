// Built-in Extensions
//
// Declarative extensions that can be configured without code: renaming one
// annotation into another and moving a package of annotations.

use super::api::{AnnotationRemapper, AnnotationTransformer, Extension, RemapOutcome};
use super::context::VisitorContext;
use super::extensions::ExtensionRegistration;
use crate::annotation::{package_name, simple_name, AnnotationValue};
use crate::diagnostics::ExtensionLoadError;
use serde::{Deserialize, Serialize};

/// Replaces annotation `from` with annotation `to`, keeping its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameTransformer {
    from: String,
    to: String,
}

impl RenameTransformer {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl AnnotationTransformer for RenameTransformer {
    fn annotation_name(&self) -> &str {
        &self.from
    }

    fn transform(&self, annotation: &AnnotationValue, _: &VisitorContext) -> Vec<AnnotationValue> {
        vec![AnnotationValue {
            annotation_name: self.to.clone(),
            ..annotation.clone()
        }]
    }
}

/// Moves annotations of package `from` to package `to`, keeping simple names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRemapper {
    from: String,
    to: String,
}

impl PackageRemapper {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl AnnotationRemapper for PackageRemapper {
    fn package_name(&self) -> &str {
        &self.from
    }

    fn remap(&self, annotation: &AnnotationValue, _: &VisitorContext) -> RemapOutcome {
        if package_name(&annotation.annotation_name) != self.from {
            return RemapOutcome::Unchanged;
        }
        let renamed = format!("{}.{}", self.to, simple_name(&annotation.annotation_name));
        RemapOutcome::Replaced(vec![AnnotationValue {
            annotation_name: renamed,
            ..annotation.clone()
        }])
    }
}

fn load_jakarta_inject_remapper() -> Result<Extension, ExtensionLoadError> {
    Ok(Extension::remapper(PackageRemapper::new(
        "jakarta.inject",
        "javax.inject",
    )))
}

inventory::submit!(ExtensionRegistration {
    name: "jakarta-inject-remapper",
    load: load_jakarta_inject_remapper,
});
