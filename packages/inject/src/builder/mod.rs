//! Annotation metadata builder
//!
//! Walks element hierarchies, resolves aliases, runs extensions and records
//! stereotypes into annotation metadata.

mod alias;
pub mod cache;
pub mod facade;
mod hierarchy;
pub mod options;
mod placement;
mod reader;
pub mod session;
mod stereotype;
mod transform;

pub use cache::MutationCache;
pub use facade::AnnotationMetadataBuilder;
pub use options::BuildOptions;
pub use session::BuildSession;
