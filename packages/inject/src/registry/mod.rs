//! Mapper, transformer and remapper extensions and the registry they are
//! looked up in.

pub mod api;
pub mod builtin;
pub mod context;
pub mod extensions;

pub use api::{AnnotationMapper, AnnotationRemapper, AnnotationTransformer, Extension, RemapOutcome};
pub use builtin::{PackageRemapper, RenameTransformer};
pub use context::VisitorContext;
pub use extensions::{
    ExtensionCandidate, ExtensionDiscovery, ExtensionRegistration, ExtensionRegistry,
    InventoryDiscovery,
};
