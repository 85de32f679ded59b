// Stereotype Graph Builder
//
// Walks the meta-annotations of every stored annotation, recording each one
// as a stereotype under the chain of annotations that led to it.

use super::facade::{AnnotationMetadataBuilder, Outcome};
use super::placement::{extend_chain, Placement};
use super::transform::Disposition;
use crate::annotation::names::{
    is_interception_kind, AROUND, INTERCEPTOR_BINDING, INTERCEPTOR_BINDINGS,
    INTERCEPTOR_TYPE_MEMBER, INTRODUCTION, KIND_MEMBER, TYPE, VALUE_MEMBER,
};
use crate::annotation::{AnnotationValue, AnnotationValueBuilder, ClassValue, Value};
use crate::element::ElementModel;
use crate::metadata::MutableAnnotationMetadata;
use tracing::trace;

impl<'m, M: ElementModel> AnnotationMetadataBuilder<'m, M> {
    /// Stereotypes of an occurrence stored directly on an element.
    pub(super) fn process_mirror_stereotypes(
        &self,
        mirror: &M::Mirror,
        metadata: &mut MutableAnnotationMetadata,
        declared: bool,
    ) -> Outcome<()> {
        let name = self.model.annotation_type_name(mirror);
        if name.ends_with(".Nullable") {
            return Ok(());
        }
        let annotation_type = self.model.type_for_annotation(mirror);
        self.process_annotation_stereotypes(metadata, declared, &annotation_type, &name, &[])
    }

    /// Stereotypes of a root annotation, skipping the names in `excludes`.
    pub(super) fn process_annotation_stereotypes(
        &self,
        metadata: &mut MutableAnnotationMetadata,
        declared: bool,
        annotation_type: &M::Element,
        annotation_name: &str,
        excludes: &[String],
    ) -> Outcome<()> {
        let parents = [annotation_name.to_string()];
        self.build_stereotype_hierarchy(&parents, annotation_type, metadata, declared, excludes)
    }

    pub(super) fn process_annotation_stereotype(
        &self,
        parents: &[String],
        annotation_type: &M::Element,
        annotation_name: &str,
        metadata: &mut MutableAnnotationMetadata,
        declared: bool,
    ) -> Outcome<()> {
        let chain = extend_chain(parents, annotation_name);
        self.build_stereotype_hierarchy(&chain, annotation_type, metadata, declared, &[])
    }

    /// Stereotypes carried by an annotation value that has no declaration in
    /// the element model, such as the output of a remapper.
    pub(super) fn process_annotation_value_stereotype(
        &self,
        parents: &[String],
        annotation: &AnnotationValue,
        metadata: &mut MutableAnnotationMetadata,
        declared: bool,
    ) {
        let chain = extend_chain(parents, &annotation.annotation_name);
        self.build_value_stereotype_hierarchy(&chain, annotation, metadata, declared);
    }

    fn build_stereotype_hierarchy(
        &self,
        parents: &[String],
        annotation_type: &M::Element,
        metadata: &mut MutableAnnotationMetadata,
        declared: bool,
        excludes: &[String],
    ) -> Outcome<()> {
        let model = self.model;
        let mirrors = model.annotations_for_type(annotation_type)?;
        if mirrors.is_empty() {
            return Ok(());
        }

        let self_name = model.element_name(annotation_type);
        let last_parent = parents.last().map(String::as_str);
        let placement = Placement::Stereotype(parents);
        let mut binding: Option<AnnotationValueBuilder> = None;
        let mut interceptor_type: Option<ClassValue> = None;
        let mut top_level = Vec::with_capacity(mirrors.len());

        for mirror in &mirrors {
            let name = model.annotation_type_name(mirror);
            if !self.is_stereotype_candidate(&name, &self_name, parents, excludes) {
                continue;
            }
            if last_parent.is_some_and(is_interception_kind) && name == INTERCEPTOR_BINDING {
                continue;
            }
            if binding.is_none() {
                binding = last_parent.and_then(|parent| interceptor_binding_for(parent, &name));
            }
            trace!(stereotype = %name, parents = ?parents, "stereotype");

            let member_type = model.type_for_annotation(mirror);
            let retention = model.retention_policy(&member_type);
            let populated = self.populate_annotation_data(
                annotation_type,
                mirror,
                metadata,
                declared,
                retention,
                true,
                parents,
            )?;

            if name == INTERCEPTOR_BINDING {
                if let Some(binding) = binding.as_mut() {
                    binding.merge_members(&populated.values);
                    top_level.push(mirror);
                    continue;
                }
            }
            if name == TYPE {
                if let Some(class) = populated.values.get(VALUE_MEMBER).and_then(Value::first_class) {
                    interceptor_type = Some(class.clone());
                }
            }

            let disposition = if populated.mapped {
                Disposition::Keep
            } else {
                self.apply_transformations(metadata, declared, mirror, populated.values, placement)?
            };
            if disposition == Disposition::Keep {
                top_level.push(mirror);
            }
        }

        for mirror in top_level {
            let name = model.annotation_type_name(mirror);
            let member_type = model.type_for_annotation(mirror);
            self.process_annotation_stereotype(parents, &member_type, &name, metadata, declared)?;
        }

        if let Some(mut binding) = binding {
            if let Some(interceptor_type) = interceptor_type {
                binding.set_member(INTERCEPTOR_TYPE_MEMBER, interceptor_type);
            }
            Placement::Annotation.add_repeatable(metadata, declared, INTERCEPTOR_BINDINGS, binding.build());
        }
        Ok(())
    }

    fn build_value_stereotype_hierarchy(
        &self,
        parents: &[String],
        annotation: &AnnotationValue,
        metadata: &mut MutableAnnotationMetadata,
        declared: bool,
    ) {
        if annotation.stereotypes.is_empty() {
            return;
        }

        let last_parent = parents.last().map(String::as_str);
        let placement = Placement::Stereotype(parents);
        let mut binding: Option<AnnotationValueBuilder> = None;
        let mut interceptor_type: Option<ClassValue> = None;
        let mut top_level = Vec::with_capacity(annotation.stereotypes.len());

        for stereotype in &annotation.stereotypes {
            let name = stereotype.annotation_name.as_str();
            if !self.is_stereotype_candidate(name, &annotation.annotation_name, parents, &[]) {
                continue;
            }
            if last_parent.is_some_and(is_interception_kind) && name == INTERCEPTOR_BINDING {
                continue;
            }
            if binding.is_none() {
                binding = last_parent.and_then(|parent| interceptor_binding_for(parent, name));
            }

            top_level.push(stereotype);
            if name == INTERCEPTOR_BINDING {
                if let Some(binding) = binding.as_mut() {
                    binding.merge_members(&stereotype.values);
                    continue;
                }
            }
            if name == TYPE {
                if let Some(class) = stereotype.value(VALUE_MEMBER).and_then(Value::first_class) {
                    interceptor_type = Some(class.clone());
                }
            }
            placement.add(metadata, declared, name, stereotype.values.clone(), stereotype.retention);
        }

        for stereotype in top_level {
            self.process_annotation_value_stereotype(parents, stereotype, metadata, declared);
        }

        if let Some(mut binding) = binding {
            if let Some(interceptor_type) = interceptor_type {
                binding.set_member(INTERCEPTOR_TYPE_MEMBER, interceptor_type);
            }
            Placement::Annotation.add_repeatable(metadata, declared, INTERCEPTOR_BINDINGS, binding.build());
        }
    }

    /// Whether a meta-annotation takes part in the walk. Annotations already on
    /// the parent chain are skipped so that cyclic meta-annotations terminate.
    fn is_stereotype_candidate(
        &self,
        name: &str,
        self_name: &str,
        parents: &[String],
        excludes: &[String],
    ) -> bool {
        name != self_name
            && !parents.iter().any(|parent| parent == name)
            && !self.session.config().is_internal(name)
            && !excludes.iter().any(|exclude| exclude == name)
    }
}

/// The binding recorded when an interception annotation appears under
/// `parent`.
fn interceptor_binding_for(parent: &str, annotation_name: &str) -> Option<AnnotationValueBuilder> {
    let kind = match annotation_name {
        AROUND | INTERCEPTOR_BINDING => "AROUND",
        INTRODUCTION => "INTRODUCTION",
        _ => return None,
    };
    Some(
        AnnotationValue::builder(INTERCEPTOR_BINDING)
            .member(VALUE_MEMBER, ClassValue::new(parent))
            .member(KIND_MEMBER, kind),
    )
}
