// Annotation Metadata Builder
//
// Public entry points. Each one picks the hierarchy flags, consults the
// mutation cache where applicable and converts model failures into results.

use super::options::BuildOptions;
use super::session::BuildSession;
use crate::annotation::AnnotationValue;
use crate::diagnostics::{BuildError, ModelError};
use crate::element::ElementModel;
use crate::metadata::{AnnotationMetadata, MutableAnnotationMetadata};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Result of the internal walk; model failures are converted at the boundary.
pub(super) type Outcome<T> = Result<T, ModelError>;

/// Builds [`AnnotationMetadata`] for elements of one element model.
///
/// A builder is cheap and meant to be used from a single thread; share the
/// [`BuildSession`] to build on several threads.
pub struct AnnotationMetadataBuilder<'m, M: ElementModel> {
    pub(super) model: &'m M,
    pub(super) session: Arc<BuildSession<M::Element>>,
    pub(super) validating: Cell<bool>,
    pub(super) erroneous: RefCell<HashSet<M::Element>>,
}

impl<'m, M: ElementModel> AnnotationMetadataBuilder<'m, M> {
    pub fn new(model: &'m M, session: Arc<BuildSession<M::Element>>) -> Self {
        Self {
            model,
            session,
            validating: Cell::new(true),
            erroneous: RefCell::new(HashSet::new()),
        }
    }

    pub fn model(&self) -> &'m M {
        self.model
    }

    pub fn session(&self) -> &Arc<BuildSession<M::Element>> {
        &self.session
    }

    /// Full metadata of an element: its own annotations, inherited ones and
    /// type level annotations for members.
    pub fn build(&self, element: &M::Element) -> Result<AnnotationMetadata, BuildError> {
        let declaring_type = self.model.declaring_type(element);
        self.build_with_declaring_type(&declaring_type, element)
    }

    pub fn build_with_declaring_type(
        &self,
        declaring_type: &str,
        element: &M::Element,
    ) -> Result<AnnotationMetadata, BuildError> {
        if let Some(existing) = self.lookup_existing(declaring_type, element) {
            return Ok(existing);
        }
        debug!(element = ?element, declaring_type, "building annotation metadata");
        self.build_fresh(
            None,
            element,
            MutableAnnotationMetadata::new(),
            BuildOptions::INHERIT_TYPE_ANNOTATIONS | BuildOptions::ALLOW_ALIASES,
        )
    }

    /// Only the annotations present on the element itself.
    pub fn build_declared(&self, element: &M::Element) -> Result<AnnotationMetadata, BuildError> {
        debug!(element = ?element, "building declared annotation metadata");
        self.build_fresh(
            None,
            element,
            MutableAnnotationMetadata::new(),
            BuildOptions::INHERIT_TYPE_ANNOTATIONS
                | BuildOptions::DECLARED_ONLY
                | BuildOptions::ALLOW_ALIASES,
        )
    }

    /// Declared metadata for an explicit list of occurrences, optionally
    /// layered over the annotations present on the element.
    pub fn build_declared_annotations(
        &self,
        element: &M::Element,
        annotations: &[M::Mirror],
        include_type_annotations: bool,
    ) -> Result<AnnotationMetadata, BuildError> {
        if annotations.is_empty() {
            return Ok(AnnotationMetadata::Empty);
        }
        let mut metadata = MutableAnnotationMetadata::new();
        let outcome = (|| {
            if include_type_annotations {
                self.build_internal(
                    None,
                    element,
                    &mut metadata,
                    BuildOptions::DECLARED_ONLY | BuildOptions::ALLOW_ALIASES,
                )?;
            }
            self.include_annotations(&mut metadata, element, true, annotations, true)
        })();
        self.finish(element, outcome, metadata)
    }

    /// Metadata of a member and the members it overrides, without type level
    /// annotations.
    pub fn build_overridden(&self, element: &M::Element) -> Result<AnnotationMetadata, BuildError> {
        let declaring_type = self.model.declaring_type(element);
        if let Some(existing) = self.lookup_existing(&declaring_type, element) {
            return Ok(existing);
        }
        self.build_fresh(
            None,
            element,
            MutableAnnotationMetadata::new(),
            BuildOptions::ALLOW_ALIASES,
        )
    }

    pub fn build_for_method(&self, element: &M::Element) -> Result<AnnotationMetadata, BuildError> {
        let declaring_type = self.model.declaring_type(element);
        if let Some(existing) = self.lookup_existing(&declaring_type, element) {
            return Ok(existing);
        }
        self.build_fresh(
            None,
            element,
            MutableAnnotationMetadata::new(),
            BuildOptions::ALLOW_ALIASES,
        )
    }

    /// Metadata of an element combined with a parent element, for example a
    /// field and its accessor. Mutated metadata of the element is used as the
    /// starting point.
    pub fn build_for_parent(
        &self,
        parent: &M::Element,
        element: &M::Element,
    ) -> Result<AnnotationMetadata, BuildError> {
        let declaring_type = self.model.declaring_type(element);
        self.build_for_parent_with_declaring_type(&declaring_type, parent, element)
    }

    pub fn build_for_parent_with_declaring_type(
        &self,
        declaring_type: &str,
        parent: &M::Element,
        element: &M::Element,
    ) -> Result<AnnotationMetadata, BuildError> {
        let seed = self.seed_from_existing(declaring_type, element);
        self.build_fresh(Some(parent), element, seed, BuildOptions::ALLOW_ALIASES)
    }

    pub fn build_for_parent_inheriting(
        &self,
        parent: &M::Element,
        element: &M::Element,
        inherit_type_annotations: bool,
    ) -> Result<AnnotationMetadata, BuildError> {
        let declaring_type = self.model.declaring_type(element);
        let seed = self.seed_from_existing(&declaring_type, element);
        let mut options = BuildOptions::ALLOW_ALIASES;
        options.set(BuildOptions::INHERIT_TYPE_ANNOTATIONS, inherit_type_annotations);
        self.build_fresh(Some(parent), element, seed, options)
    }

    /// Adds a declared annotation to existing metadata and returns the result.
    /// The input is never modified.
    pub fn annotate(
        &self,
        metadata: &AnnotationMetadata,
        annotation: AnnotationValue,
    ) -> Result<AnnotationMetadata, BuildError> {
        match metadata {
            AnnotationMetadata::Default(existing) => {
                let mut store = MutableAnnotationMetadata::from_existing(existing);
                match self.annotate_store(&mut store, &annotation) {
                    Ok(()) => Ok(AnnotationMetadata::from_store(store)),
                    Err(error) => self.recover(&annotation.annotation_name, error, metadata),
                }
            }
            AnnotationMetadata::Hierarchy(hierarchy) => {
                let declared = self.annotate(hierarchy.declared(), annotation)?;
                Ok(hierarchy.create_sibling(declared))
            }
            AnnotationMetadata::Empty | AnnotationMetadata::Reference(_) => {
                let mut store = MutableAnnotationMetadata::new();
                if let Err(error) = self.annotate_store(&mut store, &annotation) {
                    return self.recover(&annotation.annotation_name, error, metadata);
                }
                let annotated = AnnotationMetadata::from_store(store);
                match metadata {
                    AnnotationMetadata::Reference(_) => {
                        Ok(AnnotationMetadata::hierarchy(metadata.clone(), annotated))
                    }
                    _ => Ok(annotated),
                }
            }
        }
    }

    pub fn add_mutated_metadata(
        &self,
        declaring_type: &str,
        element: &M::Element,
        metadata: AnnotationMetadata,
    ) {
        self.session.add_mutated_metadata(declaring_type, element, metadata);
    }

    pub fn is_metadata_mutated(&self, declaring_type: &str, element: &M::Element) -> bool {
        self.session.is_metadata_mutated(declaring_type, element)
    }

    pub fn clear_mutated(&self) {
        self.session.clear_mutated();
    }

    pub fn is_annotation_mapped(&self, annotation_name: &str) -> bool {
        self.session.registry().is_annotation_mapped(annotation_name)
    }

    pub fn mapped_annotation_names(&self) -> BTreeSet<String> {
        self.session.registry().mapped_annotation_names()
    }

    pub fn mapped_annotation_packages(&self) -> BTreeSet<String> {
        self.session.registry().mapped_annotation_packages()
    }

    /// Declared metadata of an annotation member, read without alias
    /// resolution while its values are being validated.
    pub(super) fn build_declared_for_validation(&self, member: &M::Element) -> Outcome<AnnotationMetadata> {
        let mut metadata = MutableAnnotationMetadata::new();
        match self.build_internal(None, member, &mut metadata, BuildOptions::DECLARED_ONLY) {
            Ok(()) => Ok(AnnotationMetadata::from_store(metadata)),
            Err(ModelError::EnvironmentDefect(_)) => Ok(AnnotationMetadata::Empty),
            Err(error) => Err(error),
        }
    }

    fn build_fresh(
        &self,
        parent: Option<&M::Element>,
        element: &M::Element,
        mut metadata: MutableAnnotationMetadata,
        options: BuildOptions,
    ) -> Result<AnnotationMetadata, BuildError> {
        let outcome = self.build_internal(parent, element, &mut metadata, options);
        self.finish(element, outcome, metadata)
    }

    fn finish(
        &self,
        element: &M::Element,
        outcome: Outcome<()>,
        metadata: MutableAnnotationMetadata,
    ) -> Result<AnnotationMetadata, BuildError> {
        match outcome {
            Ok(()) => Ok(AnnotationMetadata::from_store(metadata)),
            Err(ModelError::EnvironmentDefect(reason)) => {
                debug!(element = ?element, %reason, "host compiler defect, using empty metadata");
                Ok(AnnotationMetadata::Empty)
            }
            Err(error) => Err(BuildError::model(self.model.element_name(element), error)),
        }
    }

    fn recover(
        &self,
        annotation_name: &str,
        error: ModelError,
        original: &AnnotationMetadata,
    ) -> Result<AnnotationMetadata, BuildError> {
        match error {
            ModelError::EnvironmentDefect(reason) => {
                debug!(annotation = annotation_name, %reason, "host compiler defect while annotating");
                Ok(original.clone())
            }
            error => Err(BuildError::model(annotation_name, error)),
        }
    }

    fn lookup_existing(&self, declaring_type: &str, element: &M::Element) -> Option<AnnotationMetadata> {
        let existing = self.session.mutated().get(declaring_type, element);
        if existing.is_some() {
            debug!(element = ?element, declaring_type, "using mutated annotation metadata");
        }
        existing
    }

    fn seed_from_existing(&self, declaring_type: &str, element: &M::Element) -> MutableAnnotationMetadata {
        match self.lookup_existing(declaring_type, element) {
            Some(AnnotationMetadata::Default(existing)) => {
                MutableAnnotationMetadata::from_existing(&existing)
            }
            Some(AnnotationMetadata::Hierarchy(hierarchy)) => match hierarchy.declared() {
                AnnotationMetadata::Default(declared) => {
                    MutableAnnotationMetadata::from_existing(declared)
                }
                _ => MutableAnnotationMetadata::new(),
            },
            _ => MutableAnnotationMetadata::new(),
        }
    }
}
