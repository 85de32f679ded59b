// Extension API
//
// Traits implemented by mappers, transformers and remappers, the pluggable
// rewrites applied to annotation occurrences while metadata is built.

use super::context::VisitorContext;
use crate::annotation::AnnotationValue;
use std::sync::Arc;

/// Expands one annotation into related annotations. The original occurrence
/// is only kept when a mapper returns it again.
pub trait AnnotationMapper: Send + Sync {
    /// Name of the annotation type this mapper applies to.
    fn annotation_name(&self) -> &str;

    fn map(&self, annotation: &AnnotationValue, context: &VisitorContext) -> Vec<AnnotationValue>;
}

/// Replaces one annotation with others. The original occurrence is always
/// removed.
pub trait AnnotationTransformer: Send + Sync {
    fn annotation_name(&self) -> &str;

    fn transform(
        &self,
        annotation: &AnnotationValue,
        context: &VisitorContext,
    ) -> Vec<AnnotationValue>;
}

/// Result of asking a remapper about an annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum RemapOutcome {
    /// The remapper declined; the annotation is stored as is.
    Unchanged,
    /// The annotation is replaced by these annotations. Empty removes it.
    Replaced(Vec<AnnotationValue>),
}

/// Rewrites every annotation of a package, typically into another package.
pub trait AnnotationRemapper: Send + Sync {
    /// Package whose annotations this remapper applies to.
    fn package_name(&self) -> &str;

    fn remap(&self, annotation: &AnnotationValue, context: &VisitorContext) -> RemapOutcome;
}

/// A loaded extension of any kind.
#[derive(Clone)]
pub enum Extension {
    Mapper(Arc<dyn AnnotationMapper>),
    Transformer(Arc<dyn AnnotationTransformer>),
    Remapper(Arc<dyn AnnotationRemapper>),
}

impl Extension {
    pub fn mapper(mapper: impl AnnotationMapper + 'static) -> Self {
        Extension::Mapper(Arc::new(mapper))
    }

    pub fn transformer(transformer: impl AnnotationTransformer + 'static) -> Self {
        Extension::Transformer(Arc::new(transformer))
    }

    pub fn remapper(remapper: impl AnnotationRemapper + 'static) -> Self {
        Extension::Remapper(Arc::new(remapper))
    }

    /// The annotation name or package the extension is keyed by.
    pub fn key(&self) -> &str {
        match self {
            Extension::Mapper(m) => m.annotation_name(),
            Extension::Transformer(t) => t.annotation_name(),
            Extension::Remapper(r) => r.package_name(),
        }
    }
}

impl std::fmt::Debug for Extension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Extension::Mapper(_) => write!(f, "Mapper({})", self.key()),
            Extension::Transformer(_) => write!(f, "Transformer({})", self.key()),
            Extension::Remapper(_) => write!(f, "Remapper({})", self.key()),
        }
    }
}
