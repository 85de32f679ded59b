use crate::annotation::{AnnotationValue, AnnotationValues, RetentionPolicy};
use crate::metadata::MutableAnnotationMetadata;
use smallvec::SmallVec;

/// Names of the annotations leading from a directly present annotation to
/// the meta-annotation being processed.
pub(super) type ParentChain = SmallVec<[String; 4]>;

pub(super) fn extend_chain(parents: &[String], name: &str) -> ParentChain {
    let mut chain: ParentChain = parents.iter().cloned().collect();
    chain.push(name.to_string());
    chain
}

/// Where an occurrence is written: as an annotation of the element or as a
/// stereotype reached through a parent chain.
#[derive(Debug, Clone, Copy)]
pub(super) enum Placement<'p> {
    Annotation,
    Stereotype(&'p [String]),
}

impl<'p> Placement<'p> {
    pub(super) fn parents(&self) -> &'p [String] {
        match *self {
            Placement::Annotation => &[],
            Placement::Stereotype(parents) => parents,
        }
    }

    pub(super) fn add(
        &self,
        metadata: &mut MutableAnnotationMetadata,
        declared: bool,
        name: &str,
        values: AnnotationValues,
        retention: RetentionPolicy,
    ) {
        match (self, declared) {
            (Placement::Annotation, true) => metadata.add_declared_annotation(name, values, retention),
            (Placement::Annotation, false) => metadata.add_annotation(name, values, retention),
            (Placement::Stereotype(parents), true) => {
                metadata.add_declared_stereotype(parents, name, values, retention)
            }
            (Placement::Stereotype(parents), false) => {
                metadata.add_stereotype(parents, name, values, retention)
            }
        }
    }

    pub(super) fn add_repeatable(
        &self,
        metadata: &mut MutableAnnotationMetadata,
        declared: bool,
        container: &str,
        annotation: AnnotationValue,
    ) {
        match (self, declared) {
            (Placement::Annotation, true) => metadata.add_declared_repeatable(container, annotation),
            (Placement::Annotation, false) => metadata.add_repeatable(container, annotation),
            (Placement::Stereotype(parents), true) => {
                metadata.add_declared_repeatable_stereotype(parents, container, annotation)
            }
            (Placement::Stereotype(parents), false) => {
                metadata.add_repeatable_stereotype(parents, container, annotation)
            }
        }
    }
}
