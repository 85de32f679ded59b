//! Annotation metadata storage and the query-facing result variants.

pub mod annotation_metadata;
pub mod defaults;
pub mod store;

pub use annotation_metadata::{
    AnnotationMetadata, AnnotationMetadataHierarchy, AnnotationMetadataReference,
};
pub use defaults::DefaultValueRegistry;
pub use store::{DefaultAnnotationMetadata, MutableAnnotationMetadata};
