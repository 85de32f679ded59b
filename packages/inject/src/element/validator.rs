// Element Validation
//
// Hook used to validate annotation member values as they are read.

use crate::annotation::Value;
use crate::metadata::AnnotationMetadata;
use indexmap::IndexSet;

/// A named view of an annotation member together with its own metadata.
#[derive(Debug, Clone, Copy)]
pub struct NamedElement<'a> {
    name: &'a str,
    metadata: &'a AnnotationMetadata,
}

impl<'a> NamedElement<'a> {
    pub fn new(name: &'a str, metadata: &'a AnnotationMetadata) -> Self {
        Self { name, metadata }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn annotation_metadata(&self) -> &'a AnnotationMetadata {
        self.metadata
    }
}

/// Validates a resolved member value against the constraints declared on the
/// member. Returns one message per violation; empty when the value is valid.
pub trait AnnotatedElementValidator: Send + Sync {
    fn validate_annotated_element(&self, element: &NamedElement<'_>, value: &Value)
        -> IndexSet<String>;
}
