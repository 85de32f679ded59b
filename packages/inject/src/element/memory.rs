// In-Memory Element Model
//
// An element model backed by a JSON document describing annotation types and
// annotated declarations. Used by the command line tool and by tests.

use super::model::{ElementModel, RawMemberValues};
use super::validator::AnnotatedElementValidator;
use crate::annotation::names::{CONSTRAINT, VALUE_MEMBER};
use crate::annotation::{AnnotationValue, AnnotationValues, RetentionPolicy, Value};
use crate::diagnostics::{Diagnostic, ModelError};
use crate::registry::VisitorContext;
use anyhow::Context;
use indexmap::{IndexMap, IndexSet};
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// The JSON document an [`InMemoryElementModel`] is loaded from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModelDocument {
    #[serde(default)]
    pub annotations: IndexMap<String, AnnotationTypeDeclaration>,
    #[serde(default)]
    pub elements: IndexMap<String, ElementDeclaration>,
}

/// Declaration of an annotation type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AnnotationTypeDeclaration {
    #[serde(default)]
    pub retention: RetentionPolicy,
    /// Container annotation grouping repeated occurrences of this type.
    #[serde(default)]
    pub repeatable: Option<String>,
    #[serde(default)]
    pub members: IndexMap<String, MemberDeclaration>,
    /// Meta-annotations present on the annotation type.
    #[serde(default)]
    pub annotations: Vec<AnnotationValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MemberDeclaration {
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub annotations: Vec<AnnotationValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Class,
    Method,
    Field,
    Constructor,
}

/// Declaration of a class or class member.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ElementDeclaration {
    pub kind: ElementKind,
    #[serde(default)]
    pub declaring_type: Option<String>,
    #[serde(default)]
    pub supertypes: Vec<String>,
    #[serde(default)]
    pub overrides: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationValue>,
    /// Set when the host compiler aborts while reading this declaration.
    #[serde(default)]
    pub abort: Option<String>,
}

/// Element handle of the in-memory model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModelElement {
    Declaration(String),
    AnnotationType(String),
    Member { annotation: String, member: String },
}

pub struct InMemoryElementModel {
    document: ModelDocument,
    containers: HashSet<String>,
    visitor_options: IndexMap<String, String>,
    validator: Option<Arc<dyn AnnotatedElementValidator>>,
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl fmt::Debug for InMemoryElementModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryElementModel")
            .field("annotations", &self.document.annotations.len())
            .field("elements", &self.document.elements.len())
            .field("has_validator", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}

impl InMemoryElementModel {
    pub fn from_document(document: ModelDocument) -> Self {
        let containers = document
            .annotations
            .values()
            .filter_map(|declaration| declaration.repeatable.clone())
            .collect();
        Self {
            document,
            containers,
            visitor_options: IndexMap::new(),
            validator: None,
            diagnostics: Mutex::new(Vec::new()),
        }
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(Self::from_document(serde_json::from_value(value)?))
    }

    pub fn from_json_str(source: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::from_document(serde_json::from_str(source)?))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read element model {}", path.display()))?;
        Self::from_json_str(&source)
            .with_context(|| format!("invalid element model {}", path.display()))
    }

    /// Applies nested alias resolution to annotation values, including those
    /// inside arrays and deeper nested annotations.
    fn resolve_nested(&self, originating: &ModelElement, value: &Value) -> Value {
        match value {
            Value::Annotation(nested) => {
                let mut inner = nested.as_ref().clone();
                for member in inner.values.values_mut() {
                    *member = self.resolve_nested(originating, member);
                }
                self.read_nested_annotation_value(originating, &inner).into()
            }
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.resolve_nested(originating, item))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn AnnotatedElementValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn with_visitor_options(mut self, options: IndexMap<String, String>) -> Self {
        self.visitor_options = options;
        self
    }

    /// Handle of a declared class or member.
    pub fn element(&self, name: &str) -> Option<ModelElement> {
        self.document
            .elements
            .contains_key(name)
            .then(|| ModelElement::Declaration(name.to_string()))
    }

    pub fn element_names(&self) -> impl Iterator<Item = &str> {
        self.document.elements.keys().map(String::as_str)
    }

    pub fn element_kind(&self, element: &ModelElement) -> Option<ElementKind> {
        match element {
            ModelElement::Declaration(name) => self.document.elements.get(name).map(|d| d.kind),
            _ => None,
        }
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.lock().iter().any(Diagnostic::is_error)
    }

    fn declaration(&self, name: &str) -> Result<&ElementDeclaration, ModelError> {
        self.document
            .elements
            .get(name)
            .ok_or_else(|| ModelError::failure(format!("unknown element {name}")))
    }

    fn member_declaration(&self, annotation: &str, member: &str) -> Option<&MemberDeclaration> {
        self.document
            .annotations
            .get(annotation)
            .and_then(|declaration| declaration.members.get(member))
    }

    fn direct_annotations(&self, element: &ModelElement) -> &[AnnotationValue] {
        let annotations = match element {
            ModelElement::Declaration(name) => self
                .document
                .elements
                .get(name)
                .map(|d| d.annotations.as_slice()),
            ModelElement::AnnotationType(name) => self
                .document
                .annotations
                .get(name)
                .map(|d| d.annotations.as_slice()),
            ModelElement::Member { annotation, member } => self
                .member_declaration(annotation, member)
                .map(|d| d.annotations.as_slice()),
        };
        annotations.unwrap_or_default()
    }

    fn unwrap_containers(&self, annotations: &[AnnotationValue]) -> Vec<AnnotationValue> {
        let mut unwrapped = Vec::with_capacity(annotations.len());
        for annotation in annotations {
            if self.containers.contains(&annotation.annotation_name) {
                if let Some(value) = annotation.value(VALUE_MEMBER) {
                    unwrapped.extend(value.annotations().into_iter().cloned());
                }
            } else {
                unwrapped.push(annotation.clone());
            }
        }
        unwrapped
    }

    fn type_hierarchy(&self, name: &str, hierarchy: &mut IndexSet<ModelElement>) -> Result<(), ModelError> {
        let declaration = self.declaration(name)?;
        if !hierarchy.insert(ModelElement::Declaration(name.to_string())) {
            return Ok(());
        }
        for supertype in &declaration.supertypes {
            if !self.document.elements.contains_key(supertype) {
                return Err(ModelError::failure(format!(
                    "unresolved supertype {supertype} of {name}"
                )));
            }
            self.type_hierarchy(supertype, hierarchy)?;
        }
        Ok(())
    }

    fn overridden(&self, name: &str, hierarchy: &mut IndexSet<ModelElement>) -> Result<(), ModelError> {
        for overridden in &self.declaration(name)?.overrides {
            if hierarchy.insert(ModelElement::Declaration(overridden.clone())) {
                self.overridden(overridden, hierarchy)?;
            }
        }
        Ok(())
    }

    fn member_defaults(&self, annotation_name: &str) -> RawMemberValues<ModelElement, Value> {
        let Some(declaration) = self.document.annotations.get(annotation_name) else {
            return Vec::new();
        };
        declaration
            .members
            .iter()
            .filter_map(|(member, declaration)| {
                declaration.default.as_ref().map(|value| {
                    (
                        ModelElement::Member {
                            annotation: annotation_name.to_string(),
                            member: member.clone(),
                        },
                        value.clone(),
                    )
                })
            })
            .collect()
    }

    fn element_label(&self, element: &ModelElement) -> String {
        match element {
            ModelElement::Declaration(name) | ModelElement::AnnotationType(name) => name.clone(),
            ModelElement::Member { annotation, member } => format!("{annotation}.{member}"),
        }
    }
}

impl ElementModel for InMemoryElementModel {
    type Element = ModelElement;
    type Mirror = AnnotationValue;
    type RawValue = Value;

    fn is_method_or_class_element(&self, element: &ModelElement) -> bool {
        match element {
            ModelElement::Declaration(_) => !matches!(
                self.element_kind(element),
                Some(ElementKind::Field) | None
            ),
            ModelElement::AnnotationType(_) | ModelElement::Member { .. } => true,
        }
    }

    fn declaring_type(&self, element: &ModelElement) -> String {
        match element {
            ModelElement::Declaration(name) => self
                .document
                .elements
                .get(name)
                .and_then(|d| d.declaring_type.clone())
                .unwrap_or_else(|| name.clone()),
            ModelElement::AnnotationType(name) => name.clone(),
            ModelElement::Member { annotation, .. } => annotation.clone(),
        }
    }

    fn type_for_annotation(&self, mirror: &AnnotationValue) -> ModelElement {
        ModelElement::AnnotationType(mirror.annotation_name.clone())
    }

    fn has_annotation(&self, element: &ModelElement, annotation: &str) -> bool {
        self.unwrap_containers(self.direct_annotations(element))
            .iter()
            .any(|a| a.annotation_name == annotation)
    }

    fn annotation_type_name(&self, mirror: &AnnotationValue) -> String {
        mirror.annotation_name.clone()
    }

    fn element_name(&self, element: &ModelElement) -> String {
        match element {
            ModelElement::Declaration(name) | ModelElement::AnnotationType(name) => name.clone(),
            ModelElement::Member { member, .. } => member.clone(),
        }
    }

    fn annotations_for_type(&self, element: &ModelElement) -> Result<Vec<AnnotationValue>, ModelError> {
        if let ModelElement::Declaration(name) = element {
            let declaration = self.declaration(name)?;
            if let Some(reason) = &declaration.abort {
                return Err(ModelError::EnvironmentDefect(reason.clone()));
            }
        }
        Ok(self.unwrap_containers(self.direct_annotations(element)))
    }

    fn build_hierarchy(
        &self,
        element: &ModelElement,
        inherit_type_annotations: bool,
        declared_only: bool,
    ) -> Result<Vec<ModelElement>, ModelError> {
        let ModelElement::Declaration(name) = element else {
            return Ok(vec![element.clone()]);
        };
        let declaration = self.declaration(name)?;
        if declared_only {
            return Ok(vec![element.clone()]);
        }
        let mut hierarchy = IndexSet::new();
        match declaration.kind {
            ElementKind::Class => self.type_hierarchy(name, &mut hierarchy)?,
            ElementKind::Method | ElementKind::Constructor => {
                hierarchy.insert(element.clone());
                if inherit_type_annotations {
                    if let Some(owner) = &declaration.declaring_type {
                        self.type_hierarchy(owner, &mut hierarchy)?;
                    }
                }
                self.overridden(name, &mut hierarchy)?;
            }
            ElementKind::Field => {
                hierarchy.insert(element.clone());
            }
        }
        Ok(hierarchy.into_iter().collect())
    }

    fn read_annotation_raw_values(
        &self,
        mirror: &AnnotationValue,
    ) -> Result<RawMemberValues<ModelElement, Value>, ModelError> {
        Ok(mirror
            .values
            .iter()
            .map(|(member, value)| {
                (
                    ModelElement::Member {
                        annotation: mirror.annotation_name.clone(),
                        member: member.clone(),
                    },
                    value.clone(),
                )
            })
            .collect())
    }

    fn read_annotation_value(
        &self,
        originating: &ModelElement,
        _member: &ModelElement,
        _member_name: &str,
        raw: &Value,
    ) -> Option<Value> {
        Some(self.resolve_nested(originating, raw))
    }

    fn read_annotation_default_values(
        &self,
        mirror: &AnnotationValue,
    ) -> Result<RawMemberValues<ModelElement, Value>, ModelError> {
        Ok(self.member_defaults(&mirror.annotation_name))
    }

    fn read_annotation_default_values_for_type(
        &self,
        annotation_name: &str,
        _annotation_type: &ModelElement,
    ) -> Result<RawMemberValues<ModelElement, Value>, ModelError> {
        Ok(self.member_defaults(annotation_name))
    }

    fn annotation_values(
        &self,
        _originating: &ModelElement,
        member: &ModelElement,
        annotation: &str,
    ) -> AnnotationValues {
        self.direct_annotations(member)
            .iter()
            .find(|a| a.annotation_name == annotation)
            .map(|a| a.values.clone())
            .unwrap_or_default()
    }

    fn annotation_member_name(&self, member: &ModelElement) -> String {
        self.element_name(member)
    }

    fn repeatable_name(&self, mirror: &AnnotationValue) -> Option<String> {
        self.document
            .annotations
            .get(&mirror.annotation_name)
            .and_then(|d| d.repeatable.clone())
    }

    fn repeatable_name_for_type(&self, annotation_type: &ModelElement) -> Option<String> {
        match annotation_type {
            ModelElement::AnnotationType(name) => self
                .document
                .annotations
                .get(name)
                .and_then(|d| d.repeatable.clone()),
            _ => None,
        }
    }

    fn annotation_mirror(&self, annotation_name: &str) -> Option<ModelElement> {
        self.document
            .annotations
            .contains_key(annotation_name)
            .then(|| ModelElement::AnnotationType(annotation_name.to_string()))
    }

    fn annotation_member(&self, annotation_type: &ModelElement, member: &str) -> Option<ModelElement> {
        let ModelElement::AnnotationType(annotation) = annotation_type else {
            return None;
        };
        self.member_declaration(annotation, member)
            .map(|_| ModelElement::Member {
                annotation: annotation.clone(),
                member: member.to_string(),
            })
    }

    fn retention_policy(&self, annotation_type: &ModelElement) -> RetentionPolicy {
        match annotation_type {
            ModelElement::AnnotationType(name) => self
                .document
                .annotations
                .get(name)
                .map(|d| d.retention)
                .unwrap_or_default(),
            _ => RetentionPolicy::Runtime,
        }
    }

    fn add_error(&self, originating: &ModelElement, message: &str) {
        let diagnostic = Diagnostic::error(self.element_label(originating), message);
        self.diagnostics.lock().push(diagnostic);
    }

    fn add_warning(&self, originating: &ModelElement, message: &str) {
        let diagnostic = Diagnostic::warning(self.element_label(originating), message);
        self.diagnostics.lock().push(diagnostic);
    }

    fn create_visitor_context(&self) -> VisitorContext {
        VisitorContext::new(self.visitor_options.clone())
    }

    fn is_validation_required(&self, member: &ModelElement) -> bool {
        self.direct_annotations(member).iter().any(|a| {
            self.document
                .annotations
                .get(&a.annotation_name)
                .is_some_and(|d| d.annotations.iter().any(|m| m.annotation_name == CONSTRAINT))
        })
    }

    fn element_validator(&self) -> Option<&dyn AnnotatedElementValidator> {
        self.validator.as_deref()
    }
}
