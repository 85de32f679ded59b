//! Builder configuration.

mod builder;

pub use builder::{BuilderConfig, ExtensionConfig};
