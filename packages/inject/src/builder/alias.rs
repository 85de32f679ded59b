// Alias Resolver
//
// Members marked with an alias also write their value under another member of
// the same annotation or as a stereotype of another annotation.

use super::facade::{AnnotationMetadataBuilder, Outcome};
use super::placement::Placement;
use crate::annotation::names::{ALIASES, ALIAS_FOR, VALUE_MEMBER};
use crate::annotation::{AnnotationValue, AnnotationValues, RetentionPolicy, Value};
use crate::element::ElementModel;
use crate::metadata::MutableAnnotationMetadata;
use crate::registry::RemapOutcome;
use tracing::trace;

const ALIAS_ANNOTATION: &str = "annotation";
const ALIAS_ANNOTATION_NAME: &str = "annotationName";
const ALIAS_MEMBER: &str = "member";

/// The occurrence a member value is read from.
pub(super) struct AliasSource<'a, E, R> {
    pub(super) annotation_name: &'a str,
    pub(super) parents: &'a [String],
    /// Every annotation on the path from the element to this occurrence, the
    /// occurrence included.
    pub(super) chain: &'a [String],
    pub(super) member: &'a E,
    pub(super) raw: &'a R,
}

impl<'m, M: ElementModel> AnnotationMetadataBuilder<'m, M> {
    /// Resolves the aliases declared on a member, then reads the member under
    /// its own name.
    pub(super) fn handle_annotation_alias(
        &self,
        originating: &M::Element,
        metadata: &mut MutableAnnotationMetadata,
        declared: bool,
        source: AliasSource<'_, M::Element, M::RawValue>,
        values: &mut AnnotationValues,
    ) -> Outcome<()> {
        let model = self.model;
        let aliases = model.annotation_values(originating, source.member, ALIASES);
        match aliases.get(VALUE_MEMBER) {
            Some(list) => {
                for alias in list.annotations() {
                    self.process_annotation_alias(
                        originating,
                        metadata,
                        declared,
                        &source,
                        values,
                        &alias.values,
                    )?;
                }
            }
            None => {
                let alias_for = model.annotation_values(originating, source.member, ALIAS_FOR);
                self.process_annotation_alias(
                    originating,
                    metadata,
                    declared,
                    &source,
                    values,
                    &alias_for,
                )?;
            }
        }

        let member_name = model.annotation_member_name(source.member);
        self.read_raw_value(
            originating,
            source.annotation_name,
            source.member,
            &member_name,
            source.raw,
            values,
        )
    }

    fn process_annotation_alias(
        &self,
        originating: &M::Element,
        metadata: &mut MutableAnnotationMetadata,
        declared: bool,
        source: &AliasSource<'_, M::Element, M::RawValue>,
        values: &mut AnnotationValues,
        alias_for: &AnnotationValues,
    ) -> Outcome<()> {
        let Some(aliased_member) = alias_for.get(ALIAS_MEMBER).and_then(Value::as_str) else {
            return Ok(());
        };
        let target = alias_for
            .get(ALIAS_ANNOTATION)
            .or_else(|| alias_for.get(ALIAS_ANNOTATION_NAME))
            .and_then(Value::as_name);

        let model = self.model;
        let Some(target) = target else {
            if let Some(value) =
                model.read_annotation_value(originating, source.member, aliased_member, source.raw)
            {
                values.insert(aliased_member.to_string(), value);
            }
            return self.read_raw_value(
                originating,
                source.annotation_name,
                source.member,
                aliased_member,
                source.raw,
                values,
            );
        };

        let Some(value) =
            model.read_annotation_value(originating, source.member, aliased_member, source.raw)
        else {
            return Ok(());
        };

        for remapped in self.remap_annotation(target) {
            let name = remapped.annotation_name.as_str();
            let revisits = source.chain.iter().any(|parent| parent == name);
            trace!(from = source.annotation_name, to = name, member = aliased_member, "aliased member");
            let annotation_type = model.annotation_mirror(name);
            let mut retention = RetentionPolicy::Runtime;
            let mut container = None;
            if let Some(annotation_type) = &annotation_type {
                let defaults = model.read_annotation_default_values_for_type(name, annotation_type)?;
                self.process_annotation_defaults(originating, metadata, name, &defaults);
                retention = model.retention_policy(annotation_type);
                container = model.repeatable_name_for_type(annotation_type);
            }

            let mut members = AnnotationValues::new();
            members.insert(aliased_member.to_string(), value.clone());
            match container {
                Some(container) => {
                    let occurrence = AnnotationValue::builder(name)
                        .members(&members)
                        .retention(retention)
                        .build();
                    Placement::Stereotype(source.parents).add_repeatable(
                        metadata,
                        declared,
                        &container,
                        occurrence,
                    );
                }
                None => Placement::Stereotype(&[]).add(metadata, declared, name, members, retention),
            }

            // A target already on the chain keeps its value but is not walked again.
            if revisits {
                continue;
            }
            match &annotation_type {
                Some(annotation_type) => self.process_annotation_stereotype(
                    source.chain,
                    annotation_type,
                    name,
                    metadata,
                    declared,
                )?,
                None => {
                    self.process_annotation_value_stereotype(source.chain, &remapped, metadata, declared)
                }
            }
        }
        Ok(())
    }

    /// The annotations an alias target stands for once package remappers
    /// have run.
    fn remap_annotation(&self, annotation_name: &str) -> Vec<AnnotationValue> {
        let remappers = self.session.registry().remappers_for(annotation_name);
        let original = AnnotationValue::new(annotation_name);
        if remappers.is_empty() {
            return vec![original];
        }

        let context = self.model.create_visitor_context();
        let mut remapped = Vec::new();
        let mut kept = false;
        for remapper in remappers {
            match remapper.remap(&original, &context) {
                RemapOutcome::Unchanged if !kept => {
                    remapped.push(original.clone());
                    kept = true;
                }
                RemapOutcome::Unchanged => {}
                RemapOutcome::Replaced(values) => remapped.extend(values),
            }
        }
        remapped
    }
}
