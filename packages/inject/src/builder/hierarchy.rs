// Hierarchy Walker
//
// Visits an element's hierarchy from the most general element to the element
// itself and stores the annotations found on each one.

use super::facade::{AnnotationMetadataBuilder, Outcome};
use super::options::BuildOptions;
use super::placement::Placement;
use super::transform::Disposition;
use crate::annotation::names::{DEFAULT_SCOPE, SCOPE, VALUE_MEMBER};
use crate::annotation::{package_name, AnnotationValue, AnnotationValues, RetentionPolicy};
use crate::element::ElementModel;
use crate::metadata::MutableAnnotationMetadata;
use tracing::{debug, trace};

impl<'m, M: ElementModel> AnnotationMetadataBuilder<'m, M> {
    pub(super) fn build_internal(
        &self,
        parent: Option<&M::Element>,
        element: &M::Element,
        metadata: &mut MutableAnnotationMetadata,
        options: BuildOptions,
    ) -> Outcome<()> {
        let model = self.model;
        let inherit = options.inherit_type_annotations();
        let declared_only = options.declared_only();

        let mut hierarchy = model.build_hierarchy(element, inherit, declared_only)?;
        if let Some(parent) = parent {
            let mut chain = model.build_hierarchy(parent, inherit, declared_only)?;
            chain.append(&mut hierarchy);
            hierarchy = chain;
        }
        trace!(element = ?element, depth = hierarchy.len(), "walking hierarchy");

        for current in hierarchy.iter().rev() {
            let annotations = model.annotations_for_type(current)?;
            if annotations.is_empty() {
                continue;
            }
            let declared = current == element;
            self.include_annotations(metadata, current, declared, &annotations, options.allow_aliases())?;
        }

        promote_default_scope(metadata);
        Ok(())
    }

    /// Stores the given occurrences of one element, then walks the stereotypes
    /// of every occurrence that was not replaced.
    pub(super) fn include_annotations(
        &self,
        metadata: &mut MutableAnnotationMetadata,
        element: &M::Element,
        declared: bool,
        annotations: &[M::Mirror],
        allow_aliases: bool,
    ) -> Outcome<()> {
        let model = self.model;
        let config = self.session.config();
        let mut retained = Vec::with_capacity(annotations.len());

        for mirror in annotations {
            let name = model.annotation_type_name(mirror);
            if config.is_internal(&name) {
                continue;
            }
            if let Some(replacement) = config.deprecated_replacement(&name) {
                model.add_warning(
                    element,
                    &format!(
                        "Usages of deprecated annotation {name} found. You should use {replacement} instead."
                    ),
                );
            }

            let annotation_type = model.type_for_annotation(mirror);
            let retention = model.retention_policy(&annotation_type);
            let populated = self.populate_annotation_data(
                element,
                mirror,
                metadata,
                declared,
                retention,
                allow_aliases,
                &[],
            )?;
            let disposition = if populated.mapped {
                Disposition::Keep
            } else {
                self.apply_transformations(
                    metadata,
                    declared,
                    mirror,
                    populated.values,
                    Placement::Annotation,
                )?
            };
            if disposition == Disposition::Keep {
                retained.push(mirror);
            }
        }

        for mirror in retained {
            let name = model.annotation_type_name(mirror);
            if !config.is_stereotype_excluded(package_name(&name)) {
                self.process_mirror_stereotypes(mirror, metadata, declared)?;
            }
        }
        Ok(())
    }

    /// Adds an annotation to a metadata store as if it had been declared.
    pub(super) fn annotate_store(
        &self,
        store: &mut MutableAnnotationMetadata,
        annotation: &AnnotationValue,
    ) -> Outcome<()> {
        let model = self.model;
        let name = annotation.annotation_name.as_str();
        let Some(annotation_type) = model.annotation_mirror(name) else {
            debug!(annotation = name, "annotating with an unresolved annotation type");
            store.add_declared_annotation(name, annotation.values.clone(), annotation.retention);
            return Ok(());
        };

        let retention = model.retention_policy(&annotation_type);
        match model.repeatable_name_for_type(&annotation_type) {
            Some(container) => {
                let mut occurrence = annotation.clone();
                occurrence.retention = retention;
                store.add_declared_repeatable(&container, occurrence);
            }
            None => store.add_declared_annotation(name, annotation.values.clone(), retention),
        }

        let defaults = model.read_annotation_default_values_for_type(name, &annotation_type)?;
        self.process_annotation_defaults(&annotation_type, store, name, &defaults);
        let excludes = &self.session.config().annotate_excludes;
        self.process_annotation_stereotypes(store, true, &annotation_type, name, excludes)
    }
}

/// A declared default scope becomes a declared annotation unless the element
/// already declares a scope.
fn promote_default_scope(metadata: &mut MutableAnnotationMetadata) {
    if metadata.has_declared_stereotype(SCOPE) || !metadata.has_declared_stereotype(DEFAULT_SCOPE) {
        return;
    }
    let Some(scope) = metadata
        .string_value(DEFAULT_SCOPE, VALUE_MEMBER)
        .map(str::to_string)
    else {
        return;
    };
    metadata.add_declared_annotation(&scope, AnnotationValues::new(), RetentionPolicy::Runtime);
}
