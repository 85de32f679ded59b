#![deny(clippy::all)]

//! Compile-time annotation metadata builder.
//!
//! Reads the annotations of program elements through an [`ElementModel`],
//! resolves member aliases, applies mapper, transformer and remapper
//! extensions and records meta-annotations as stereotypes.

pub mod annotation;
pub mod builder;
pub mod config;
pub mod diagnostics;
pub mod element;
pub mod metadata;
pub mod registry;

// Re-exports
pub use annotation::{AnnotationValue, AnnotationValueBuilder, AnnotationValues, RetentionPolicy, Value};
pub use builder::{AnnotationMetadataBuilder, BuildOptions, BuildSession};
pub use config::BuilderConfig;
pub use diagnostics::{BuildError, Diagnostic, DiagnosticCategory, ModelError};
pub use element::{ElementModel, InMemoryElementModel, ModelElement};
pub use metadata::{AnnotationMetadata, DefaultAnnotationMetadata, MutableAnnotationMetadata};
pub use registry::{ExtensionRegistry, RemapOutcome, VisitorContext};
