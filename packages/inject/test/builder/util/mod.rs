#![allow(dead_code)]

/*
 * Builder Test Utilities
 *
 * Shared fixtures for the builder integration tests
 */

use inject_annotation::config::BuilderConfig;
use inject_annotation::element::{InMemoryElementModel, ModelElement};
use inject_annotation::registry::ExtensionRegistry;
use inject_annotation::{AnnotationMetadata, BuildSession, Value};
use std::sync::Arc;

pub type Session = Arc<BuildSession<ModelElement>>;

pub fn model(document: serde_json::Value) -> InMemoryElementModel {
    InMemoryElementModel::from_json(document).expect("fixture document should parse")
}

pub fn element(name: &str) -> ModelElement {
    ModelElement::Declaration(name.to_string())
}

/// A session without any extensions.
pub fn session() -> Session {
    session_with(ExtensionRegistry::new())
}

pub fn session_with(registry: ExtensionRegistry) -> Session {
    Arc::new(BuildSession::new(BuilderConfig::default(), Arc::new(registry)))
}

/// The `value` member of every occurrence of a (possibly repeatable) annotation.
pub fn string_values(metadata: &AnnotationMetadata, annotation: &str) -> Vec<String> {
    metadata
        .annotation_values_by_type(annotation)
        .iter()
        .filter_map(|av| av.value("value").and_then(Value::as_name).map(str::to_string))
        .collect()
}

pub fn declared_string_values(metadata: &AnnotationMetadata, annotation: &str) -> Vec<String> {
    metadata
        .declared_annotation_values_by_type(annotation)
        .iter()
        .filter_map(|av| av.value("value").and_then(Value::as_name).map(str::to_string))
        .collect()
}
