// Element Model
//
// The interface a host compiler front-end implements so the builder can read
// elements, annotation occurrences and annotation type declarations.

use super::validator::AnnotatedElementValidator;
use crate::annotation::names::ALIAS_FOR;
use crate::annotation::{AnnotationValue, AnnotationValues, RetentionPolicy, Value};
use crate::diagnostics::ModelError;
use crate::registry::VisitorContext;
use std::fmt::Debug;
use std::hash::Hash;

/// Member/value pairs as read from an annotation occurrence or declaration.
pub type RawMemberValues<E, V> = Vec<(E, V)>;

/// Access to the program model of a host compiler.
///
/// `Element` identifies declarations: classes, methods, fields, constructors,
/// annotation types and annotation members. Identity is equality, never name.
/// `Mirror` is one annotation occurrence. `RawValue` is a member value before
/// normalization; builders convert mapper output back into it so that it can
/// go through alias resolution again.
pub trait ElementModel {
    type Element: Clone + Eq + Hash + Debug;
    type Mirror: Clone + Debug;
    type RawValue: Clone + Debug + From<Value>;

    /// Whether the element is a class or an executable member.
    fn is_method_or_class_element(&self, element: &Self::Element) -> bool;

    /// Name of the type declaring the element; a class declares itself.
    fn declaring_type(&self, element: &Self::Element) -> String;

    /// The annotation type declaration of an occurrence.
    fn type_for_annotation(&self, mirror: &Self::Mirror) -> Self::Element;

    fn has_annotation(&self, element: &Self::Element, annotation: &str) -> bool;

    fn annotation_type_name(&self, mirror: &Self::Mirror) -> String;

    fn element_name(&self, element: &Self::Element) -> String;

    /// Annotation occurrences directly present on the element, with repeatable
    /// containers already unwrapped into individual occurrences.
    fn annotations_for_type(&self, element: &Self::Element)
        -> Result<Vec<Self::Mirror>, ModelError>;

    /// The element followed by the elements it inherits annotations from,
    /// most derived first.
    fn build_hierarchy(
        &self,
        element: &Self::Element,
        inherit_type_annotations: bool,
        declared_only: bool,
    ) -> Result<Vec<Self::Element>, ModelError>;

    /// Explicitly specified member values of an occurrence.
    fn read_annotation_raw_values(
        &self,
        mirror: &Self::Mirror,
    ) -> Result<RawMemberValues<Self::Element, Self::RawValue>, ModelError>;

    /// Normalizes a raw member value. `None` drops the member.
    fn read_annotation_value(
        &self,
        originating: &Self::Element,
        member: &Self::Element,
        member_name: &str,
        raw: &Self::RawValue,
    ) -> Option<Value>;

    /// Resolves aliases between members of a nested annotation value. A member
    /// aliased to another member of the same annotation also writes its value
    /// there; aliases naming another annotation are ignored. Values already
    /// present are never replaced.
    fn read_nested_annotation_value(
        &self,
        originating: &Self::Element,
        nested: &AnnotationValue,
    ) -> AnnotationValue {
        let Some(annotation_type) = self.annotation_mirror(&nested.annotation_name) else {
            return nested.clone();
        };

        let mut resolved = AnnotationValues::new();
        for (member_name, value) in &nested.values {
            if let Some(member) = self.annotation_member(&annotation_type, member_name) {
                let alias_for = self.annotation_values(originating, &member, ALIAS_FOR);
                let other_annotation =
                    alias_for.contains_key("annotation") || alias_for.contains_key("annotationName");
                if let Some(aliased) = alias_for.get("member").and_then(Value::as_str) {
                    if !other_annotation {
                        resolved
                            .entry(aliased.to_string())
                            .or_insert_with(|| value.clone());
                    }
                }
            }
            resolved
                .entry(member_name.clone())
                .or_insert_with(|| value.clone());
        }

        let mut nested = nested.clone();
        nested.values = resolved;
        nested
    }

    /// Reads one member value and stores it under `member_name` unless a
    /// value is already present. Returns the stored value.
    fn read_annotation_raw_value(
        &self,
        originating: &Self::Element,
        _annotation_name: &str,
        member: &Self::Element,
        member_name: &str,
        raw: &Self::RawValue,
        values: &mut AnnotationValues,
    ) -> Option<Value> {
        if values.contains_key(member_name) {
            return None;
        }
        let value = self.read_annotation_value(originating, member, member_name, raw)?;
        values.insert(member_name.to_string(), value.clone());
        Some(value)
    }

    /// Default member values declared by the occurrence's annotation type.
    fn read_annotation_default_values(
        &self,
        mirror: &Self::Mirror,
    ) -> Result<RawMemberValues<Self::Element, Self::RawValue>, ModelError>;

    /// Default member values declared by a named annotation type.
    fn read_annotation_default_values_for_type(
        &self,
        annotation_name: &str,
        annotation_type: &Self::Element,
    ) -> Result<RawMemberValues<Self::Element, Self::RawValue>, ModelError>;

    /// Values of `annotation` present on an annotation member; empty when the
    /// member does not carry it.
    fn annotation_values(
        &self,
        originating: &Self::Element,
        member: &Self::Element,
        annotation: &str,
    ) -> AnnotationValues;

    fn annotation_member_name(&self, member: &Self::Element) -> String;

    /// Container of the occurrence's annotation type when it is repeatable.
    fn repeatable_name(&self, mirror: &Self::Mirror) -> Option<String>;

    fn repeatable_name_for_type(&self, annotation_type: &Self::Element) -> Option<String>;

    /// The declaration of a named annotation type, if it can be resolved.
    fn annotation_mirror(&self, annotation_name: &str) -> Option<Self::Element>;

    fn annotation_member(&self, annotation_type: &Self::Element, member: &str)
        -> Option<Self::Element>;

    fn retention_policy(&self, annotation_type: &Self::Element) -> RetentionPolicy;

    fn add_error(&self, originating: &Self::Element, message: &str);

    fn add_warning(&self, originating: &Self::Element, message: &str);

    fn create_visitor_context(&self) -> VisitorContext;

    /// Whether values of the member must be passed to the element validator.
    fn is_validation_required(&self, member: &Self::Element) -> bool;

    fn element_validator(&self) -> Option<&dyn AnnotatedElementValidator> {
        None
    }
}
