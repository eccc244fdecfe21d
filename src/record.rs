//! Record and field value types.
//!
//! A [`Record`] is one embedded document: the original text, scalar metadata,
//! and one or two vector fields, keyed by the field names declared in the
//! collection schema.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::vector::{SparseVector, Vector};

/// A single field value inside a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Missing value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit integer value.
    Int64(i64),
    /// 32-bit float value.
    Float(f32),
    /// Length-bounded string value.
    Varchar(String),
    /// Dense vector value.
    FloatVector(Vector),
    /// Sparse vector value.
    SparseFloatVector(SparseVector),
}

impl FieldValue {
    /// The value as an integer, if it is one.
    pub fn as_int64(&self) -> Option<i64> {
        match self {
            FieldValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as a float. Integers widen to float for filter comparisons.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Int64(v) => Some(*v as f32),
            _ => None,
        }
    }

    /// The value as a string slice, if it is a varchar.
    pub fn as_varchar(&self) -> Option<&str> {
        match self {
            FieldValue::Varchar(v) => Some(v),
            _ => None,
        }
    }

    /// The value as a bool, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as a dense vector, if it is one.
    pub fn as_float_vector(&self) -> Option<&Vector> {
        match self {
            FieldValue::FloatVector(v) => Some(v),
            _ => None,
        }
    }

    /// The value as a sparse vector, if it is one.
    pub fn as_sparse_vector(&self) -> Option<&SparseVector> {
        match self {
            FieldValue::SparseFloatVector(v) => Some(v),
            _ => None,
        }
    }

    /// Whether the value is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// A short name for the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Int64(_) => "int64",
            FieldValue::Float(_) => "float",
            FieldValue::Varchar(_) => "varchar",
            FieldValue::FloatVector(_) => "float_vector",
            FieldValue::SparseFloatVector(_) => "sparse_float_vector",
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int64(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Varchar(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Varchar(v)
    }
}

impl From<Vector> for FieldValue {
    fn from(v: Vector) -> Self {
        FieldValue::FloatVector(v)
    }
}

impl From<Vec<f32>> for FieldValue {
    fn from(v: Vec<f32>) -> Self {
        FieldValue::FloatVector(Vector::new(v))
    }
}

impl From<SparseVector> for FieldValue {
    fn from(v: SparseVector) -> Self {
        FieldValue::SparseFloatVector(v)
    }
}

/// One embedded document, keyed by schema field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: HashMap<String, FieldValue>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Record {
            fields: HashMap::new(),
        }
    }

    /// Add a field value, consuming and returning the record for chaining.
    pub fn add_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Add a varchar field.
    pub fn add_varchar(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_field(name, FieldValue::Varchar(value.into()))
    }

    /// Add an integer field.
    pub fn add_int64(self, name: impl Into<String>, value: i64) -> Self {
        self.add_field(name, FieldValue::Int64(value))
    }

    /// Add a float field.
    pub fn add_float(self, name: impl Into<String>, value: f32) -> Self {
        self.add_field(name, FieldValue::Float(value))
    }

    /// Add a dense vector field.
    pub fn add_float_vector(self, name: impl Into<String>, value: impl Into<Vector>) -> Self {
        self.add_field(name, FieldValue::FloatVector(value.into()))
    }

    /// Add a sparse vector field.
    pub fn add_sparse_vector(self, name: impl Into<String>, value: SparseVector) -> Self {
        self.add_field(name, FieldValue::SparseFloatVector(value))
    }

    /// Set a field value in place.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Get a field value.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Whether the record has a field with the given name.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterate over (name, value) pairs in arbitrary order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// The number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
