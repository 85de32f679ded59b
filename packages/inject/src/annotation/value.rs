// Annotation Values
//
// Normalized member values and annotation occurrences shared by the builder,
// the metadata store and the extension traits.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether an annotation survives to source, compiled output or runtime lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RetentionPolicy {
    Source,
    Class,
    #[default]
    Runtime,
}

impl RetentionPolicy {
    pub fn is_runtime(&self) -> bool {
        matches!(self, RetentionPolicy::Runtime)
    }
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RetentionPolicy::Source => "SOURCE",
            RetentionPolicy::Class => "CLASS",
            RetentionPolicy::Runtime => "RUNTIME",
        };
        f.write_str(s)
    }
}

/// A reference to a class by name.
///
/// `instantiated` marks values of members that are meant to be instantiated
/// rather than merely referenced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassValue {
    #[serde(rename = "class")]
    pub name: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub instantiated: bool,
}

impl ClassValue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instantiated: false,
        }
    }

    pub fn instantiated(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instantiated: true,
        }
    }
}

/// A reference to an enum constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumValue {
    #[serde(rename = "enum")]
    pub type_name: String,
    pub constant: String,
}

impl EnumValue {
    pub fn new(type_name: impl Into<String>, constant: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            constant: constant.into(),
        }
    }
}

/// A normalized annotation member value.
///
/// The JSON form is untagged: scalars and arrays map to themselves, class
/// references are `{"class": ..}`, enum constants `{"enum": .., "constant": ..}`
/// and nested annotations `{"annotation": .., "values": {..}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Long(i64),
    Double(f64),
    String(String),
    Array(Vec<Value>),
    Class(ClassValue),
    Enum(EnumValue),
    Annotation(Box<AnnotationValue>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(l) => Some(*l),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassValue> {
        match self {
            Value::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_annotation(&self) -> Option<&AnnotationValue> {
        match self {
            Value::Annotation(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    /// The textual name carried by the value: string contents, the class name
    /// of a class reference or the constant of an enum reference. A single
    /// element array yields its element's name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Class(c) => Some(&c.name),
            Value::Enum(e) => Some(&e.constant),
            Value::Array(values) if values.len() == 1 => values[0].as_name(),
            _ => None,
        }
    }

    /// The class reference held directly, or the first one of a class array.
    pub fn first_class(&self) -> Option<&ClassValue> {
        match self {
            Value::Class(c) => Some(c),
            Value::Array(values) => values.first().and_then(Value::as_class),
            _ => None,
        }
    }

    /// Nested annotations held directly or inside an array.
    pub fn annotations(&self) -> Vec<&AnnotationValue> {
        match self {
            Value::Annotation(a) => vec![a.as_ref()],
            Value::Array(values) => values.iter().filter_map(Value::as_annotation).collect(),
            _ => Vec::new(),
        }
    }

    /// Whether the value is a string containing a `${..}` placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Value::String(s) if s.contains("${"))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<ClassValue> for Value {
    fn from(value: ClassValue) -> Self {
        Value::Class(value)
    }
}

impl From<EnumValue> for Value {
    fn from(value: EnumValue) -> Self {
        Value::Enum(value)
    }
}

impl From<AnnotationValue> for Value {
    fn from(value: AnnotationValue) -> Self {
        Value::Annotation(Box::new(value))
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(values)
    }
}

/// Ordered member name to value mapping of one annotation.
pub type AnnotationValues = IndexMap<String, Value>;

/// One annotation occurrence with its resolved member values.
///
/// `stereotypes` carries meta-annotations for occurrences synthesized by
/// extensions whose type cannot be resolved through the element model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnotationValue {
    #[serde(rename = "annotation")]
    pub annotation_name: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub values: AnnotationValues,
    #[serde(default, skip_serializing_if = "RetentionPolicy::is_runtime")]
    pub retention: RetentionPolicy,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stereotypes: Vec<AnnotationValue>,
}

impl AnnotationValue {
    pub fn new(annotation_name: impl Into<String>) -> Self {
        Self::with_values(annotation_name, AnnotationValues::new())
    }

    pub fn with_values(annotation_name: impl Into<String>, values: AnnotationValues) -> Self {
        Self {
            annotation_name: annotation_name.into(),
            values,
            retention: RetentionPolicy::Runtime,
            stereotypes: Vec::new(),
        }
    }

    pub fn builder(annotation_name: impl Into<String>) -> AnnotationValueBuilder {
        AnnotationValueBuilder::new(annotation_name)
    }

    pub fn value(&self, member: &str) -> Option<&Value> {
        self.values.get(member)
    }

    pub fn string_value(&self, member: &str) -> Option<&str> {
        self.values.get(member).and_then(Value::as_name)
    }
}

/// Incrementally assembles an [`AnnotationValue`].
#[derive(Debug, Clone)]
pub struct AnnotationValueBuilder {
    annotation_name: String,
    values: AnnotationValues,
    retention: RetentionPolicy,
    stereotypes: Vec<AnnotationValue>,
}

impl AnnotationValueBuilder {
    pub fn new(annotation_name: impl Into<String>) -> Self {
        Self {
            annotation_name: annotation_name.into(),
            values: AnnotationValues::new(),
            retention: RetentionPolicy::Runtime,
            stereotypes: Vec::new(),
        }
    }

    pub fn annotation_name(&self) -> &str {
        &self.annotation_name
    }

    pub fn member(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_member(name, value);
        self
    }

    pub fn set_member(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Merges the given members, replacing existing values of the same name.
    pub fn members(mut self, values: &AnnotationValues) -> Self {
        self.merge_members(values);
        self
    }

    pub fn merge_members(&mut self, values: &AnnotationValues) {
        for (name, value) in values {
            self.values.insert(name.clone(), value.clone());
        }
    }

    /// Sets the `value` member to the given nested annotations.
    pub fn values(mut self, annotations: Vec<AnnotationValue>) -> Self {
        let array = annotations.into_iter().map(Value::from).collect();
        self.values.insert("value".to_string(), Value::Array(array));
        self
    }

    pub fn retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    pub fn stereotype(mut self, stereotype: AnnotationValue) -> Self {
        self.stereotypes.push(stereotype);
        self
    }

    pub fn build(self) -> AnnotationValue {
        AnnotationValue {
            annotation_name: self.annotation_name,
            values: self.values,
            retention: self.retention,
            stereotypes: self.stereotypes,
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
