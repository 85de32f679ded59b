// Annotation Metadata Store
//
// The per-element data store written by the builder: declared and full
// annotation partitions, stereotypes, repeatable groups and defaults.

use crate::annotation::{AnnotationValue, AnnotationValues, RetentionPolicy, Value};
use crate::annotation::names::VALUE_MEMBER;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::ops::Deref;

/// Immutable annotation data of one element.
///
/// Produced by freezing a [`MutableAnnotationMetadata`]; shared behind an `Arc`
/// inside [`super::AnnotationMetadata::Default`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultAnnotationMetadata {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    declared_annotations: IndexMap<String, AnnotationValues>,
    #[serde(rename = "annotations", skip_serializing_if = "IndexMap::is_empty")]
    all_annotations: IndexMap<String, AnnotationValues>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    declared_stereotypes: IndexMap<String, AnnotationValues>,
    #[serde(rename = "stereotypes", skip_serializing_if = "IndexMap::is_empty")]
    all_stereotypes: IndexMap<String, AnnotationValues>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    annotations_by_stereotype: IndexMap<String, Vec<String>>,
    #[serde(rename = "repeatable", skip_serializing_if = "IndexMap::is_empty")]
    repeated: IndexMap<String, String>,
    #[serde(rename = "defaults", skip_serializing_if = "IndexMap::is_empty")]
    annotation_defaults: IndexMap<String, AnnotationValues>,
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    source_retention_annotations: IndexSet<String>,
}

impl DefaultAnnotationMetadata {
    /// No annotation or stereotype is recorded. Defaults alone do not count.
    pub fn is_empty(&self) -> bool {
        self.all_annotations.is_empty() && self.all_stereotypes.is_empty()
    }

    pub fn has_annotation(&self, annotation: &str) -> bool {
        self.all_annotations.contains_key(annotation)
    }

    pub fn has_declared_annotation(&self, annotation: &str) -> bool {
        self.declared_annotations.contains_key(annotation)
    }

    /// The annotation is present directly or as a meta-annotation.
    pub fn has_stereotype(&self, annotation: &str) -> bool {
        self.all_annotations.contains_key(annotation) || self.all_stereotypes.contains_key(annotation)
    }

    pub fn has_declared_stereotype(&self, annotation: &str) -> bool {
        self.declared_annotations.contains_key(annotation)
            || self.declared_stereotypes.contains_key(annotation)
    }

    pub fn annotation_names(&self) -> impl Iterator<Item = &str> {
        self.all_annotations.keys().map(String::as_str)
    }

    pub fn declared_annotation_names(&self) -> impl Iterator<Item = &str> {
        self.declared_annotations.keys().map(String::as_str)
    }

    pub fn stereotype_names(&self) -> impl Iterator<Item = &str> {
        self.all_stereotypes.keys().map(String::as_str)
    }

    pub fn declared_stereotype_names(&self) -> impl Iterator<Item = &str> {
        self.declared_stereotypes.keys().map(String::as_str)
    }

    /// Names of the annotations through which `stereotype` was reached.
    pub fn annotation_names_by_stereotype(&self, stereotype: &str) -> Vec<String> {
        match self.annotations_by_stereotype.get(stereotype) {
            Some(names) => names.clone(),
            None if self.all_annotations.contains_key(stereotype) => vec![stereotype.to_string()],
            None => Vec::new(),
        }
    }

    /// Member values of an annotation, falling back to stereotypes.
    pub fn values(&self, annotation: &str) -> Option<&AnnotationValues> {
        self.all_annotations
            .get(annotation)
            .or_else(|| self.all_stereotypes.get(annotation))
    }

    pub fn declared_values(&self, annotation: &str) -> Option<&AnnotationValues> {
        self.declared_annotations
            .get(annotation)
            .or_else(|| self.declared_stereotypes.get(annotation))
    }

    /// A member value, falling back to the annotation's registered defaults.
    pub fn value(&self, annotation: &str, member: &str) -> Option<&Value> {
        self.values(annotation)
            .and_then(|values| values.get(member))
            .or_else(|| self.default_value(annotation, member))
    }

    pub fn string_value(&self, annotation: &str, member: &str) -> Option<&str> {
        self.value(annotation, member).and_then(Value::as_name)
    }

    pub fn default_values(&self, annotation: &str) -> Option<&AnnotationValues> {
        self.annotation_defaults.get(annotation)
    }

    pub fn default_value(&self, annotation: &str, member: &str) -> Option<&Value> {
        self.annotation_defaults
            .get(annotation)
            .and_then(|values| values.get(member))
    }

    /// The container that groups occurrences of a repeatable annotation.
    pub fn repeatable_container(&self, annotation: &str) -> Option<&str> {
        self.repeated.get(annotation).map(String::as_str)
    }

    /// All occurrences of an annotation type, unwrapping repeatable groups.
    pub fn annotation_values_by_type(&self, annotation: &str) -> Vec<AnnotationValue> {
        self.collect_by_type(annotation, &self.all_annotations, &self.all_stereotypes)
    }

    pub fn declared_annotation_values_by_type(&self, annotation: &str) -> Vec<AnnotationValue> {
        self.collect_by_type(
            annotation,
            &self.declared_annotations,
            &self.declared_stereotypes,
        )
    }

    pub fn source_retention_annotations(&self) -> impl Iterator<Item = &str> {
        self.source_retention_annotations.iter().map(String::as_str)
    }

    fn collect_by_type(
        &self,
        annotation: &str,
        annotations: &IndexMap<String, AnnotationValues>,
        stereotypes: &IndexMap<String, AnnotationValues>,
    ) -> Vec<AnnotationValue> {
        if let Some(container) = self.repeated.get(annotation) {
            return [annotations.get(container), stereotypes.get(container)]
                .into_iter()
                .flatten()
                .filter_map(|values| values.get(VALUE_MEMBER))
                .flat_map(Value::annotations)
                .filter(|av| av.annotation_name == annotation)
                .cloned()
                .collect();
        }
        annotations
            .get(annotation)
            .or_else(|| stereotypes.get(annotation))
            .map(|values| vec![AnnotationValue::with_values(annotation, values.clone())])
            .unwrap_or_default()
    }
}

/// Accumulator the builder writes into while walking an element.
///
/// Dereferences to [`DefaultAnnotationMetadata`] for queries; `freeze` turns
/// it into the query-facing result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutableAnnotationMetadata {
    data: DefaultAnnotationMetadata,
}

impl MutableAnnotationMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new accumulator seeded with a copy of existing data.
    pub fn from_existing(existing: &DefaultAnnotationMetadata) -> Self {
        Self {
            data: existing.clone(),
        }
    }

    pub fn into_inner(self) -> DefaultAnnotationMetadata {
        self.data
    }

    pub fn add_annotation(
        &mut self,
        annotation: &str,
        values: AnnotationValues,
        retention: RetentionPolicy,
    ) {
        self.put_annotation(annotation, values, retention, false);
    }

    pub fn add_declared_annotation(
        &mut self,
        annotation: &str,
        values: AnnotationValues,
        retention: RetentionPolicy,
    ) {
        self.put_annotation(annotation, values, retention, true);
    }

    pub fn add_stereotype(
        &mut self,
        parents: &[String],
        stereotype: &str,
        values: AnnotationValues,
        retention: RetentionPolicy,
    ) {
        self.put_stereotype(parents, stereotype, values, retention, false);
    }

    pub fn add_declared_stereotype(
        &mut self,
        parents: &[String],
        stereotype: &str,
        values: AnnotationValues,
        retention: RetentionPolicy,
    ) {
        self.put_stereotype(parents, stereotype, values, retention, true);
    }

    pub fn add_repeatable(&mut self, container: &str, annotation: AnnotationValue) {
        self.put_repeatable(container, annotation, false);
    }

    pub fn add_declared_repeatable(&mut self, container: &str, annotation: AnnotationValue) {
        self.put_repeatable(container, annotation, true);
    }

    pub fn add_repeatable_stereotype(
        &mut self,
        parents: &[String],
        container: &str,
        annotation: AnnotationValue,
    ) {
        self.put_repeatable_stereotype(parents, container, annotation, false);
    }

    pub fn add_declared_repeatable_stereotype(
        &mut self,
        parents: &[String],
        container: &str,
        annotation: AnnotationValue,
    ) {
        self.put_repeatable_stereotype(parents, container, annotation, true);
    }

    /// Records default member values; the first value seen for a member wins.
    pub fn add_default_annotation_values(&mut self, annotation: &str, values: AnnotationValues) {
        merge_first_wins(&mut self.data.annotation_defaults, annotation, values);
    }

    /// Layers another store's data under the current contents. Declared
    /// partitions are only copied when `keep_declared` is set.
    pub fn absorb(&mut self, other: &DefaultAnnotationMetadata, keep_declared: bool) {
        let data = &mut self.data;
        for (name, values) in &other.all_annotations {
            merge_first_wins(&mut data.all_annotations, name, values.clone());
        }
        for (name, values) in &other.all_stereotypes {
            merge_first_wins(&mut data.all_stereotypes, name, values.clone());
        }
        if keep_declared {
            for (name, values) in &other.declared_annotations {
                merge_first_wins(&mut data.declared_annotations, name, values.clone());
            }
            for (name, values) in &other.declared_stereotypes {
                merge_first_wins(&mut data.declared_stereotypes, name, values.clone());
            }
        }
        for (stereotype, parents) in &other.annotations_by_stereotype {
            let entry = data
                .annotations_by_stereotype
                .entry(stereotype.clone())
                .or_default();
            for parent in parents {
                if !entry.contains(parent) {
                    entry.push(parent.clone());
                }
            }
        }
        for (name, container) in &other.repeated {
            data.repeated
                .entry(name.clone())
                .or_insert_with(|| container.clone());
        }
        for (name, values) in &other.annotation_defaults {
            merge_first_wins(&mut data.annotation_defaults, name, values.clone());
        }
        data.source_retention_annotations
            .extend(other.source_retention_annotations.iter().cloned());
    }

    fn put_annotation(
        &mut self,
        annotation: &str,
        values: AnnotationValues,
        retention: RetentionPolicy,
        declared: bool,
    ) {
        if declared {
            merge_overriding(&mut self.data.declared_annotations, annotation, values.clone());
        }
        merge_overriding(&mut self.data.all_annotations, annotation, values);
        self.track_retention(annotation, retention);
    }

    fn put_stereotype(
        &mut self,
        parents: &[String],
        stereotype: &str,
        values: AnnotationValues,
        retention: RetentionPolicy,
        declared: bool,
    ) {
        if declared {
            merge_first_wins(&mut self.data.declared_stereotypes, stereotype, values.clone());
        }
        merge_first_wins(&mut self.data.all_stereotypes, stereotype, values);
        self.index_stereotype(parents, stereotype);
        self.track_retention(stereotype, retention);
    }

    fn put_repeatable(&mut self, container: &str, annotation: AnnotationValue, declared: bool) {
        self.track_repeatable(container, &annotation);
        if declared {
            push_repeatable(&mut self.data.declared_annotations, container, annotation.clone());
        }
        push_repeatable(&mut self.data.all_annotations, container, annotation);
    }

    fn put_repeatable_stereotype(
        &mut self,
        parents: &[String],
        container: &str,
        annotation: AnnotationValue,
        declared: bool,
    ) {
        self.track_repeatable(container, &annotation);
        self.index_stereotype(parents, container);
        if declared {
            push_repeatable(&mut self.data.declared_stereotypes, container, annotation.clone());
        }
        push_repeatable(&mut self.data.all_stereotypes, container, annotation);
    }

    fn track_repeatable(&mut self, container: &str, annotation: &AnnotationValue) {
        self.data
            .repeated
            .entry(annotation.annotation_name.clone())
            .or_insert_with(|| container.to_string());
        self.track_retention(container, annotation.retention);
    }

    fn index_stereotype(&mut self, parents: &[String], stereotype: &str) {
        if parents.is_empty() {
            return;
        }
        let entry = self
            .data
            .annotations_by_stereotype
            .entry(stereotype.to_string())
            .or_default();
        for parent in parents {
            if !entry.contains(parent) {
                entry.push(parent.clone());
            }
        }
    }

    fn track_retention(&mut self, annotation: &str, retention: RetentionPolicy) {
        if retention == RetentionPolicy::Source {
            self.data
                .source_retention_annotations
                .insert(annotation.to_string());
        }
    }
}

impl Deref for MutableAnnotationMetadata {
    type Target = DefaultAnnotationMetadata;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

fn merge_overriding(
    target: &mut IndexMap<String, AnnotationValues>,
    annotation: &str,
    values: AnnotationValues,
) {
    let existing = target.entry(annotation.to_string()).or_default();
    for (member, value) in values {
        existing.insert(member, value);
    }
}

fn merge_first_wins(
    target: &mut IndexMap<String, AnnotationValues>,
    annotation: &str,
    values: AnnotationValues,
) {
    let existing = target.entry(annotation.to_string()).or_default();
    for (member, value) in values {
        existing.entry(member).or_insert(value);
    }
}

fn push_repeatable(
    target: &mut IndexMap<String, AnnotationValues>,
    container: &str,
    annotation: AnnotationValue,
) {
    let values = target.entry(container.to_string()).or_default();
    let slot = values
        .entry(VALUE_MEMBER.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if !matches!(slot, Value::Array(_)) {
        let previous = std::mem::replace(slot, Value::Array(Vec::new()));
        if let Value::Array(items) = slot {
            items.push(previous);
        }
    }
    if let Value::Array(items) = slot {
        let annotation = Value::from(annotation);
        if !items.contains(&annotation) {
            items.push(annotation);
        }
    }
}
