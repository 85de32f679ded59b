//! The element model the builder reads programs through, plus an in-memory
//! implementation backed by JSON.

pub mod memory;
pub mod model;
pub mod validator;

pub use memory::{
    AnnotationTypeDeclaration, ElementDeclaration, ElementKind, InMemoryElementModel,
    MemberDeclaration, ModelDocument, ModelElement,
};
pub use model::{ElementModel, RawMemberValues};
pub use validator::{AnnotatedElementValidator, NamedElement};
