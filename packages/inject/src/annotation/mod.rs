//! Annotation values and well-known annotation names.

pub mod names;
pub mod value;

pub use names::{package_name, simple_name};
pub use value::{
    AnnotationValue, AnnotationValueBuilder, AnnotationValues, ClassValue, EnumValue,
    RetentionPolicy, Value,
};
