// Annotation Value Reader
//
// Reads the member values of one occurrence, registering defaults, resolving
// aliases, validating values and running mappers.

use super::alias::AliasSource;
use super::facade::{AnnotationMetadataBuilder, Outcome};
use super::placement::{extend_chain, Placement};
use crate::annotation::names::{ALIAS_FOR, INSTANTIATED_MEMBER};
use crate::annotation::{simple_name, AnnotationValue, AnnotationValues, ClassValue, RetentionPolicy, Value};
use crate::element::{ElementModel, NamedElement, RawMemberValues};
use crate::metadata::MutableAnnotationMetadata;
use std::cell::Cell;
use tracing::trace;

/// Member values read from an occurrence.
pub(super) struct PopulatedAnnotation {
    pub(super) values: AnnotationValues,
    /// Mappers replaced the occurrence; it is neither stored nor transformed.
    pub(super) mapped: bool,
}

/// Turns validation off until dropped.
struct ValidationSuspended<'a>(&'a Cell<bool>);

impl<'a> ValidationSuspended<'a> {
    fn new(flag: &'a Cell<bool>) -> Self {
        flag.set(false);
        Self(flag)
    }
}

impl Drop for ValidationSuspended<'_> {
    fn drop(&mut self) {
        self.0.set(true);
    }
}

impl<'m, M: ElementModel> AnnotationMetadataBuilder<'m, M> {
    pub(super) fn populate_annotation_data(
        &self,
        originating: &M::Element,
        mirror: &M::Mirror,
        metadata: &mut MutableAnnotationMetadata,
        declared: bool,
        retention: RetentionPolicy,
        allow_aliases: bool,
        enclosing: &[String],
    ) -> Outcome<PopulatedAnnotation> {
        let model = self.model;
        let annotation_name = model.annotation_type_name(mirror);

        if retention == RetentionPolicy::Runtime {
            let defaults = model.read_annotation_default_values(mirror)?;
            self.process_annotation_defaults(originating, metadata, &annotation_name, &defaults);
        }

        let parents = [annotation_name.clone()];
        let chain = extend_chain(enclosing, &annotation_name);
        let mut values = AnnotationValues::new();
        for (member, raw) in model.read_annotation_raw_values(mirror)? {
            if model.has_annotation(&member, INSTANTIATED_MEMBER) {
                let member_name = model.annotation_member_name(&member);
                if let Some(Value::Class(class)) =
                    model.read_annotation_value(originating, &member, &member_name, &raw)
                {
                    values.insert(member_name, ClassValue::instantiated(class.name).into());
                }
            }

            if allow_aliases {
                let source = AliasSource {
                    annotation_name: &annotation_name,
                    parents: &parents,
                    chain: &chain,
                    member: &member,
                    raw: &raw,
                };
                self.handle_annotation_alias(originating, metadata, declared, source, &mut values)?;
            } else {
                let member_name = model.annotation_member_name(&member);
                self.read_raw_value(originating, &annotation_name, &member, &member_name, &raw, &mut values)?;
            }
        }

        let mappers = self.session.registry().mappers(&annotation_name);
        if mappers.is_empty() {
            return Ok(PopulatedAnnotation { values, mapped: false });
        }
        let source = AnnotationValue::with_values(annotation_name.as_str(), values.clone());
        let context = model.create_visitor_context();
        for mapper in mappers {
            for mapped in mapper.map(&source, &context) {
                trace!(from = %annotation_name, to = %mapped.annotation_name, "mapped annotation");
                self.store_mapped_annotation(originating, metadata, declared, mapped)?;
            }
        }
        Ok(PopulatedAnnotation { values, mapped: true })
    }

    /// Stores one mapper result as if it had been declared, then resolves its
    /// member aliases, defaults and stereotypes.
    fn store_mapped_annotation(
        &self,
        originating: &M::Element,
        metadata: &mut MutableAnnotationMetadata,
        declared: bool,
        mapped: AnnotationValue,
    ) -> Outcome<()> {
        let model = self.model;
        let name = mapped.annotation_name.clone();
        let retention = mapped.retention;
        let annotation_type = model.annotation_mirror(&name);
        let container = annotation_type
            .as_ref()
            .and_then(|t| model.repeatable_name_for_type(t));

        match &container {
            Some(container) => {
                Placement::Annotation.add_repeatable(metadata, declared, container, mapped.clone())
            }
            None => Placement::Annotation.add(metadata, declared, &name, mapped.values.clone(), retention),
        }

        let Some(annotation_type) = annotation_type else {
            return Ok(());
        };

        let mut aliased = AnnotationValues::new();
        for (member_name, value) in &mapped.values {
            if let Some(member) = model.annotation_member(&annotation_type, member_name) {
                let raw = M::RawValue::from(value.clone());
                let source = AliasSource {
                    annotation_name: &name,
                    parents: &[],
                    chain: std::slice::from_ref(&name),
                    member: &member,
                    raw: &raw,
                };
                self.handle_annotation_alias(originating, metadata, declared, source, &mut aliased)?;
            }
        }
        aliased.retain(|member, _| !mapped.values.contains_key(member));
        if container.is_none() && !aliased.is_empty() {
            Placement::Annotation.add(metadata, declared, &name, aliased, retention);
        }

        let defaults = model.read_annotation_default_values_for_type(&name, &annotation_type)?;
        if retention == RetentionPolicy::Runtime {
            self.process_annotation_defaults(originating, metadata, &name, &defaults);
        }
        self.process_annotation_stereotype(&[], &annotation_type, &name, metadata, declared)
    }

    /// Records the default member values of an annotation on the metadata and
    /// in the session registry.
    pub(super) fn process_annotation_defaults(
        &self,
        originating: &M::Element,
        metadata: &mut MutableAnnotationMetadata,
        annotation_name: &str,
        raw_defaults: &RawMemberValues<M::Element, M::RawValue>,
    ) {
        let mut defaults = AnnotationValues::new();
        for (member, raw) in raw_defaults {
            let member_name = self.model.annotation_member_name(member);
            self.model.read_annotation_raw_value(
                originating,
                annotation_name,
                member,
                &member_name,
                raw,
                &mut defaults,
            );
        }
        self.session.defaults().register(annotation_name, &defaults);
        metadata.add_default_annotation_values(annotation_name, defaults);
    }

    /// Reads one member value into `values` and validates it when it was stored.
    pub(super) fn read_raw_value(
        &self,
        originating: &M::Element,
        annotation_name: &str,
        member: &M::Element,
        member_name: &str,
        raw: &M::RawValue,
        values: &mut AnnotationValues,
    ) -> Outcome<()> {
        let stored = self.model.read_annotation_raw_value(
            originating,
            annotation_name,
            member,
            member_name,
            raw,
            values,
        );
        match stored {
            Some(value) => {
                self.validate_annotation_value(originating, annotation_name, member, member_name, &value)
            }
            None => Ok(()),
        }
    }

    fn validate_annotation_value(
        &self,
        originating: &M::Element,
        annotation_name: &str,
        member: &M::Element,
        member_name: &str,
        value: &Value,
    ) -> Outcome<()> {
        if !self.validating.get() {
            return Ok(());
        }
        let Some(validator) = self.model.element_validator() else {
            return Ok(());
        };
        if self.erroneous.borrow().contains(member)
            || annotation_name == ALIAS_FOR
            || value.is_placeholder()
            || !self.model.is_validation_required(member)
        {
            return Ok(());
        }

        let member_metadata = {
            let _suspended = ValidationSuspended::new(&self.validating);
            self.build_declared_for_validation(member)?
        };
        let errors = validator
            .validate_annotated_element(&NamedElement::new(member_name, &member_metadata), value);
        if errors.is_empty() {
            return Ok(());
        }

        self.erroneous.borrow_mut().insert(member.clone());
        let prefix = format!("@{}.{}: ", simple_name(annotation_name), member_name);
        for error in errors {
            self.model.add_error(originating, &format!("{prefix}{error}"));
        }
        Ok(())
    }
}
