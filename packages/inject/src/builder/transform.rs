// Transformer and Remapper Pipeline
//
// Decides how an occurrence is stored once its values are read: unchanged,
// replaced by remapper output, or replaced by transformer output.

use super::facade::{AnnotationMetadataBuilder, Outcome};
use super::placement::Placement;
use crate::annotation::names::{NON_NULL, NULLABLE};
use crate::annotation::{package_name, AnnotationValue, AnnotationValues};
use crate::element::ElementModel;
use crate::metadata::MutableAnnotationMetadata;
use crate::registry::{AnnotationRemapper, AnnotationTransformer, RemapOutcome, VisitorContext};
use std::sync::Arc;
use tracing::trace;

/// Whether an occurrence stays in the stereotype walk after storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Disposition {
    Keep,
    Removed,
}

impl<'m, M: ElementModel> AnnotationMetadataBuilder<'m, M> {
    pub(super) fn apply_transformations(
        &self,
        metadata: &mut MutableAnnotationMetadata,
        declared: bool,
        mirror: &M::Mirror,
        values: AnnotationValues,
        placement: Placement<'_>,
    ) -> Outcome<Disposition> {
        let model = self.model;
        let annotation_name = model.annotation_type_name(mirror);
        let container = model.repeatable_name(mirror);
        let retention = model.retention_policy(&model.type_for_annotation(mirror));
        let registry = self.session.registry();
        let remappers = registry.remappers_for(&annotation_name);
        let transformers = registry.transformers(&annotation_name);

        let occurrence = AnnotationValue::builder(annotation_name.as_str())
            .members(&values)
            .retention(retention)
            .build();

        if remappers.is_empty() && transformers.is_empty() {
            match &container {
                Some(container) => placement.add_repeatable(metadata, declared, container, occurrence),
                None => placement.add(metadata, declared, &annotation_name, values, retention),
            }
            return Ok(Disposition::Keep);
        }

        let context = model.create_visitor_context();
        match container {
            Some(container) if !remappers.is_empty() => Ok(self.remap_repeatable(
                metadata, declared, placement, remappers, &container, occurrence, &context,
            )),
            Some(container) => {
                self.transform_repeatable(
                    metadata, declared, placement, transformers, &container, occurrence, &context,
                )?;
                Ok(Disposition::Removed)
            }
            None if !remappers.is_empty() => {
                self.remap_single(metadata, declared, placement, remappers, occurrence, &context)
            }
            None => {
                self.transform_single(metadata, declared, placement, transformers, occurrence, &context)?;
                Ok(Disposition::Removed)
            }
        }
    }

    /// Remaps the occurrence together with its container. A remapper that
    /// leaves the occurrence unchanged stores it once under its own container.
    #[allow(clippy::too_many_arguments)]
    fn remap_repeatable(
        &self,
        metadata: &mut MutableAnnotationMetadata,
        declared: bool,
        placement: Placement<'_>,
        remappers: &[Arc<dyn AnnotationRemapper>],
        container: &str,
        occurrence: AnnotationValue,
        context: &VisitorContext,
    ) -> Disposition {
        let group = AnnotationValue::builder(container)
            .values(vec![occurrence.clone()])
            .build();
        let mut remapped = false;
        let mut kept = false;
        for remapper in remappers {
            let groups = match remapper.remap(&group, context) {
                RemapOutcome::Unchanged => vec![container.to_string()],
                RemapOutcome::Replaced(groups) => {
                    groups.into_iter().map(|g| g.annotation_name).collect()
                }
            };
            match remapper.remap(&occurrence, context) {
                RemapOutcome::Unchanged => {
                    if !kept && !groups.is_empty() {
                        placement.add_repeatable(metadata, declared, container, occurrence.clone());
                        kept = true;
                    }
                }
                RemapOutcome::Replaced(replacements) => {
                    remapped = true;
                    for group_name in &groups {
                        for replacement in &replacements {
                            placement.add_repeatable(metadata, declared, group_name, replacement.clone());
                        }
                    }
                }
            }
        }
        if remapped {
            Disposition::Removed
        } else {
            Disposition::Keep
        }
    }

    /// Transforms the occurrence, first through the container's transformers
    /// when the container has any.
    #[allow(clippy::too_many_arguments)]
    fn transform_repeatable(
        &self,
        metadata: &mut MutableAnnotationMetadata,
        declared: bool,
        placement: Placement<'_>,
        transformers: &[Arc<dyn AnnotationTransformer>],
        container: &str,
        occurrence: AnnotationValue,
        context: &VisitorContext,
    ) -> Outcome<()> {
        let group_transformers = self.session.registry().transformers(container);
        let containers: Vec<String> = if group_transformers.is_empty() {
            vec![container.to_string()]
        } else {
            let group = AnnotationValue::builder(container)
                .values(vec![occurrence.clone()])
                .build();
            group_transformers
                .iter()
                .flat_map(|transformer| transformer.transform(&group, context))
                .map(|group| group.annotation_name)
                .collect()
        };

        for container in &containers {
            for transformer in transformers {
                for transformed in transformer.transform(&occurrence, context) {
                    trace!(from = %occurrence.annotation_name, to = %transformed.annotation_name, "transformed annotation");
                    placement.add_repeatable(metadata, declared, container, transformed.clone());
                    self.add_transformed_stereotypes(metadata, declared, &transformed, placement.parents())?;
                }
            }
        }
        Ok(())
    }

    fn remap_single(
        &self,
        metadata: &mut MutableAnnotationMetadata,
        declared: bool,
        placement: Placement<'_>,
        remappers: &[Arc<dyn AnnotationRemapper>],
        occurrence: AnnotationValue,
        context: &VisitorContext,
    ) -> Outcome<Disposition> {
        let mut remapped = false;
        let mut kept = false;
        for remapper in remappers {
            match remapper.remap(&occurrence, context) {
                RemapOutcome::Unchanged => {
                    if !kept {
                        placement.add(
                            metadata,
                            declared,
                            &occurrence.annotation_name,
                            occurrence.values.clone(),
                            occurrence.retention,
                        );
                        kept = true;
                    }
                }
                RemapOutcome::Replaced(replacements) => {
                    remapped = true;
                    for replacement in replacements {
                        trace!(from = %occurrence.annotation_name, to = %replacement.annotation_name, "remapped annotation");
                        placement.add(
                            metadata,
                            declared,
                            &replacement.annotation_name,
                            replacement.values.clone(),
                            replacement.retention,
                        );
                        self.add_transformed_stereotypes(metadata, declared, &replacement, placement.parents())?;
                    }
                }
            }
        }
        Ok(if remapped {
            Disposition::Removed
        } else {
            Disposition::Keep
        })
    }

    fn transform_single(
        &self,
        metadata: &mut MutableAnnotationMetadata,
        declared: bool,
        placement: Placement<'_>,
        transformers: &[Arc<dyn AnnotationTransformer>],
        occurrence: AnnotationValue,
        context: &VisitorContext,
    ) -> Outcome<()> {
        let model = self.model;
        for transformer in transformers {
            for transformed in transformer.transform(&occurrence, context) {
                let name = transformed.annotation_name.as_str();
                trace!(from = %occurrence.annotation_name, to = name, "transformed annotation");
                let container = if self.is_repeatable_candidate(name) {
                    model
                        .annotation_mirror(name)
                        .and_then(|annotation_type| model.repeatable_name_for_type(&annotation_type))
                } else {
                    None
                };
                match container {
                    Some(container) => {
                        placement.add_repeatable(metadata, declared, &container, transformed.clone())
                    }
                    None => placement.add(
                        metadata,
                        declared,
                        name,
                        transformed.values.clone(),
                        transformed.retention,
                    ),
                }
                self.add_transformed_stereotypes(metadata, declared, &transformed, placement.parents())?;
            }
        }
        Ok(())
    }

    /// Stereotypes of an annotation produced by a transformer or remapper.
    /// Stereotypes carried on the value are used when present, otherwise the
    /// annotation's declaration is walked.
    pub(super) fn add_transformed_stereotypes(
        &self,
        metadata: &mut MutableAnnotationMetadata,
        declared: bool,
        annotation: &AnnotationValue,
        parents: &[String],
    ) -> Outcome<()> {
        let name = annotation.annotation_name.as_str();
        let config = self.session.config();
        if config.is_internal(name) || config.is_stereotype_excluded(package_name(name)) {
            return Ok(());
        }
        if !annotation.stereotypes.is_empty() {
            self.process_annotation_value_stereotype(parents, annotation, metadata, declared);
            return Ok(());
        }
        match self.model.annotation_mirror(name) {
            Some(annotation_type) => {
                self.process_annotation_stereotype(parents, &annotation_type, name, metadata, declared)
            }
            None => Ok(()),
        }
    }

    fn is_repeatable_candidate(&self, annotation_name: &str) -> bool {
        !self.session.config().is_internal(annotation_name)
            && annotation_name != NULLABLE
            && annotation_name != NON_NULL
    }
}
