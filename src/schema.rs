//! Collection schema definition.
//!
//! A [`CollectionSchema`] declares the fixed record shape stored per item:
//! exactly one primary-key field, the original text, scalar metadata fields,
//! and one or two vector fields with declared dimensionality. Schemas are
//! created once and are immutable for the life of a collection; changing the
//! shape requires dropping and recreating the collection.

use serde::{Deserialize, Serialize};

use crate::error::{CrocusError, Result};
use crate::record::{FieldValue, Record};

/// The type of a schema field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    /// Boolean scalar.
    Bool,
    /// 64-bit integer scalar.
    Int64,
    /// 32-bit float scalar.
    Float,
    /// String bounded to `max_length` characters.
    Varchar {
        /// Maximum length in characters.
        max_length: usize,
    },
    /// Dense float vector of fixed dimension.
    FloatVector {
        /// Number of components.
        dim: usize,
    },
    /// Sparse weighted-term vector; unbounded index space.
    SparseFloatVector,
}

impl FieldType {
    /// Whether the type is a vector type.
    pub fn is_vector(&self) -> bool {
        matches!(
            self,
            FieldType::FloatVector { .. } | FieldType::SparseFloatVector
        )
    }

    /// Whether the type may carry the primary key.
    pub fn is_primary_key_capable(&self) -> bool {
        matches!(self, FieldType::Int64 | FieldType::Varchar { .. })
    }

    /// A short name for the type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Bool => "bool",
            FieldType::Int64 => "int64",
            FieldType::Float => "float",
            FieldType::Varchar { .. } => "varchar",
            FieldType::FloatVector { .. } => "float_vector",
            FieldType::SparseFloatVector => "sparse_float_vector",
        }
    }
}

/// One field declaration inside a collection schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Field name.
    pub name: String,
    /// Field type and constraints.
    pub field_type: FieldType,
    /// Whether this field is the primary key.
    #[serde(default)]
    pub is_primary: bool,
    /// Whether primary-key values are generated by the store on insert.
    #[serde(default)]
    pub auto_id: bool,
    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldSchema {
    /// Create a field declaration.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        FieldSchema {
            name: name.into(),
            field_type,
            is_primary: false,
            auto_id: false,
            description: None,
        }
    }

    /// Mark the field as the primary key.
    pub fn primary_key(mut self) -> Self {
        self.is_primary = true;
        self
    }

    /// Let the store generate primary-key values on insert.
    pub fn auto_id(mut self) -> Self {
        self.auto_id = true;
        self
    }

    /// Attach a description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The fixed field layout applied to all records in a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchema {
    fields: Vec<FieldSchema>,
    #[serde(default)]
    enable_dynamic_field: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl CollectionSchema {
    /// Start building a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// The declared fields, in declaration order.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The primary-key field.
    pub fn primary_field(&self) -> &FieldSchema {
        // Validation guarantees exactly one primary field.
        self.fields
            .iter()
            .find(|f| f.is_primary)
            .expect("validated schema has a primary field")
    }

    /// Whether records may carry fields not declared in the schema.
    pub fn dynamic_fields_enabled(&self) -> bool {
        self.enable_dynamic_field
    }

    /// The vector fields, in declaration order.
    pub fn vector_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|f| f.field_type.is_vector())
    }

    /// Whether another schema describes the same record shape.
    ///
    /// Descriptions are ignored; field order, names, types, constraints, and
    /// the dynamic-field flag all matter.
    pub fn is_compatible(&self, other: &CollectionSchema) -> bool {
        if self.enable_dynamic_field != other.enable_dynamic_field {
            return false;
        }
        if self.fields.len() != other.fields.len() {
            return false;
        }
        self.fields.iter().zip(other.fields.iter()).all(|(a, b)| {
            a.name == b.name
                && a.field_type == b.field_type
                && a.is_primary == b.is_primary
                && a.auto_id == b.auto_id
        })
    }

    /// Check a record against the schema before insertion.
    ///
    /// Every declared field must be present with a matching type, except an
    /// `auto_id` primary key, which must be absent (the store generates it).
    /// Unknown fields are rejected unless dynamic fields are enabled.
    pub fn validate_record(&self, record: &Record) -> Result<()> {
        for field in &self.fields {
            let value = record.get(&field.name);
            if field.is_primary && field.auto_id {
                if value.is_some() {
                    return Err(CrocusError::invalid_argument(format!(
                        "field '{}' is auto_id; explicit values are not accepted",
                        field.name
                    )));
                }
                continue;
            }
            let value = value.ok_or_else(|| {
                CrocusError::invalid_argument(format!("missing value for field '{}'", field.name))
            })?;
            self.check_value(field, value)?;
        }

        if !self.enable_dynamic_field {
            for (name, _) in record.fields() {
                if self.field(name).is_none() {
                    return Err(CrocusError::invalid_argument(format!(
                        "unknown field '{}' (dynamic fields are disabled)",
                        name
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_value(&self, field: &FieldSchema, value: &FieldValue) -> Result<()> {
        let mismatch = |expected: &str| {
            Err(CrocusError::invalid_argument(format!(
                "field '{}' expects {}, got {}",
                field.name,
                expected,
                value.type_name()
            )))
        };
        match &field.field_type {
            FieldType::Bool => match value {
                FieldValue::Bool(_) => Ok(()),
                _ => mismatch("bool"),
            },
            FieldType::Int64 => match value {
                FieldValue::Int64(_) => Ok(()),
                _ => mismatch("int64"),
            },
            FieldType::Float => match value {
                FieldValue::Float(_) => Ok(()),
                _ => mismatch("float"),
            },
            FieldType::Varchar { max_length } => match value {
                FieldValue::Varchar(s) => {
                    let len = s.chars().count();
                    if len > *max_length {
                        return Err(CrocusError::invalid_argument(format!(
                            "field '{}' exceeds max_length {}: got {} characters",
                            field.name, max_length, len
                        )));
                    }
                    Ok(())
                }
                _ => mismatch("varchar"),
            },
            FieldType::FloatVector { dim } => match value {
                FieldValue::FloatVector(v) => {
                    if v.dimension() != *dim {
                        return Err(CrocusError::invalid_argument(format!(
                            "field '{}' expects dimension {}, got {}",
                            field.name,
                            dim,
                            v.dimension()
                        )));
                    }
                    if !v.is_valid() {
                        return Err(CrocusError::invalid_argument(format!(
                            "field '{}' contains non-finite values",
                            field.name
                        )));
                    }
                    Ok(())
                }
                _ => mismatch("float_vector"),
            },
            FieldType::SparseFloatVector => match value {
                FieldValue::SparseFloatVector(v) => {
                    if !v.is_valid() {
                        return Err(CrocusError::invalid_argument(format!(
                            "field '{}' contains non-finite weights",
                            field.name
                        )));
                    }
                    Ok(())
                }
                _ => mismatch("sparse_float_vector"),
            },
        }
    }
}

/// Builder for [`CollectionSchema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<FieldSchema>,
    enable_dynamic_field: bool,
    description: Option<String>,
}

impl SchemaBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        SchemaBuilder::default()
    }

    /// Add a field declaration.
    pub fn add_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Allow records to carry fields not declared in the schema.
    pub fn enable_dynamic_field(mut self, enabled: bool) -> Self {
        self.enable_dynamic_field = enabled;
        self
    }

    /// Attach a description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Validate and build the schema.
    pub fn build(self) -> Result<CollectionSchema> {
        if self.fields.is_empty() {
            return Err(CrocusError::schema("schema must declare at least one field"));
        }

        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(CrocusError::schema("field names must not be empty"));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(CrocusError::schema(format!(
                    "duplicate field name '{}'",
                    field.name
                )));
            }
        }

        let primary_count = self.fields.iter().filter(|f| f.is_primary).count();
        if primary_count != 1 {
            return Err(CrocusError::schema(format!(
                "schema must declare exactly one primary-key field, found {}",
                primary_count
            )));
        }

        for field in &self.fields {
            if field.is_primary && !field.field_type.is_primary_key_capable() {
                return Err(CrocusError::schema(format!(
                    "primary-key field '{}' must be int64 or varchar, got {}",
                    field.name,
                    field.field_type.type_name()
                )));
            }
            if field.auto_id && !field.is_primary {
                return Err(CrocusError::schema(format!(
                    "auto_id is only valid on the primary-key field, found on '{}'",
                    field.name
                )));
            }
            match &field.field_type {
                FieldType::FloatVector { dim } if *dim == 0 => {
                    return Err(CrocusError::schema(format!(
                        "vector field '{}' must declare a dimension of at least 1",
                        field.name
                    )));
                }
                FieldType::Varchar { max_length } if *max_length == 0 => {
                    return Err(CrocusError::schema(format!(
                        "varchar field '{}' must declare a max_length of at least 1",
                        field.name
                    )));
                }
                _ => {}
            }
        }

        Ok(CollectionSchema {
            fields: self.fields,
            enable_dynamic_field: self.enable_dynamic_field,
            description: self.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review_schema() -> CollectionSchema {
        CollectionSchema::builder()
            .add_field(
                FieldSchema::new("pk", FieldType::Varchar { max_length: 100 })
                    .primary_key()
                    .auto_id(),
            )
            .add_field(FieldSchema::new(
                "comment",
                FieldType::Varchar { max_length: 65535 },
            ))
            .add_field(FieldSchema::new("rating", FieldType::Float))
            .add_field(FieldSchema::new("product_id", FieldType::Int64))
            .add_field(FieldSchema::new("vector", FieldType::FloatVector { dim: 4 }))
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_and_lookup() {
        let schema = review_schema();
        assert_eq!(schema.fields().len(), 5);
        assert_eq!(schema.primary_field().name, "pk");
        assert!(schema.primary_field().auto_id);
        assert_eq!(schema.vector_fields().count(), 1);
        assert!(schema.field("rating").is_some());
        assert!(schema.field("missing").is_none());
    }

    #[test]
    fn test_requires_exactly_one_primary_key() {
        let none = CollectionSchema::builder()
            .add_field(FieldSchema::new("a", FieldType::Int64))
            .build();
        assert!(none.is_err());

        let two = CollectionSchema::builder()
            .add_field(FieldSchema::new("a", FieldType::Int64).primary_key())
            .add_field(FieldSchema::new("b", FieldType::Int64).primary_key())
            .build();
        assert!(two.is_err());
    }

    #[test]
    fn test_auto_id_requires_primary() {
        let result = CollectionSchema::builder()
            .add_field(FieldSchema::new("id", FieldType::Int64).primary_key())
            .add_field(FieldSchema::new("other", FieldType::Int64).auto_id())
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_primary_key_type() {
        let result = CollectionSchema::builder()
            .add_field(FieldSchema::new("id", FieldType::Float).primary_key())
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let result = CollectionSchema::builder()
            .add_field(FieldSchema::new("id", FieldType::Int64).primary_key())
            .add_field(FieldSchema::new("v", FieldType::FloatVector { dim: 0 }))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_compatibility() {
        let a = review_schema();
        let b = review_schema();
        assert!(a.is_compatible(&b));

        let c = CollectionSchema::builder()
            .add_field(
                FieldSchema::new("pk", FieldType::Varchar { max_length: 100 })
                    .primary_key()
                    .auto_id(),
            )
            .add_field(FieldSchema::new(
                "comment",
                FieldType::Varchar { max_length: 65535 },
            ))
            .add_field(FieldSchema::new("rating", FieldType::Float))
            .add_field(FieldSchema::new("product_id", FieldType::Int64))
            .add_field(FieldSchema::new("vector", FieldType::FloatVector { dim: 8 }))
            .build()
            .unwrap();
        assert!(!a.is_compatible(&c));
    }

    #[test]
    fn test_validate_record() {
        let schema = review_schema();

        let good = Record::new()
            .add_varchar("comment", "solid product, works as advertised")
            .add_float("rating", 5.0)
            .add_int64("product_id", 100)
            .add_float_vector("vector", vec![0.1, 0.2, 0.3, 0.4]);
        assert!(schema.validate_record(&good).is_ok());

        let missing = Record::new()
            .add_varchar("comment", "missing the rest")
            .add_float_vector("vector", vec![0.1, 0.2, 0.3, 0.4]);
        assert!(schema.validate_record(&missing).is_err());

        let wrong_dim = good.clone().add_float_vector("vector", vec![0.1, 0.2]);
        assert!(schema.validate_record(&wrong_dim).is_err());

        let explicit_pk = good.clone().add_varchar("pk", "not allowed");
        assert!(schema.validate_record(&explicit_pk).is_err());

        let unknown = good.clone().add_int64("extra", 1);
        assert!(schema.validate_record(&unknown).is_err());
    }

    #[test]
    fn test_dynamic_fields_allow_unknown() {
        let schema = CollectionSchema::builder()
            .add_field(FieldSchema::new("id", FieldType::Int64).primary_key())
            .enable_dynamic_field(true)
            .build()
            .unwrap();
        let record = Record::new().add_int64("id", 1).add_varchar("extra", "ok");
        assert!(schema.validate_record(&record).is_ok());
    }
}
