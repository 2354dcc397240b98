//! Core type definitions for the catalog.

use mintnet_proto::Value;

/// Scalar data types used by entity fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    /// Boolean value.
    Bool,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
    /// Timestamp (microseconds since Unix epoch).
    Timestamp,
    /// UUID (128-bit identifier).
    Uuid,
}

/// Field types - flat representation without recursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// A scalar value.
    Scalar(ScalarType),
    /// An optional scalar value (nullable).
    OptionalScalar(ScalarType),
    /// An array of scalar values.
    ArrayScalar(ScalarType),
}

impl ScalarType {
    /// Check if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ScalarType::Int64 | ScalarType::Float64)
    }

    /// Type name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Int64 => "int64",
            ScalarType::Float64 => "float64",
            ScalarType::String => "string",
            ScalarType::Timestamp => "timestamp",
            ScalarType::Uuid => "uuid",
        }
    }

    /// Check whether a non-null value has this scalar type.
    pub fn matches(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ScalarType::Bool, Value::Bool(_))
                | (ScalarType::Int64, Value::Int64(_))
                | (ScalarType::Float64, Value::Float64(_) | Value::Int64(_))
                | (ScalarType::String, Value::String(_))
                | (ScalarType::Timestamp, Value::Timestamp(_))
                | (ScalarType::Uuid, Value::Uuid(_))
        )
    }
}

impl FieldType {
    /// Check if this type is nullable.
    pub fn is_nullable(&self) -> bool {
        matches!(self, FieldType::OptionalScalar(_))
    }

    /// Check if this type is an array.
    pub fn is_array(&self) -> bool {
        matches!(self, FieldType::ArrayScalar(_))
    }

    /// Get the inner scalar type.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            FieldType::Scalar(s) | FieldType::OptionalScalar(s) | FieldType::ArrayScalar(s) => *s,
        }
    }

    /// Check whether a value can be stored in a field of this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldType::Scalar(s), v) => s.matches(v),
            (FieldType::OptionalScalar(_), Value::Null) => true,
            (FieldType::OptionalScalar(s), v) => s.matches(v),
            (FieldType::ArrayScalar(ScalarType::String), Value::StringArray(_)) => true,
            (FieldType::ArrayScalar(_), _) => false,
        }
    }

    /// The value a field of this type holds when nothing was provided.
    pub fn empty_value(&self) -> Value {
        match self {
            FieldType::ArrayScalar(_) => Value::StringArray(Vec::new()),
            _ => Value::Null,
        }
    }

    /// Human readable type description for error messages.
    pub fn describe(&self) -> String {
        match self {
            FieldType::Scalar(s) => s.name().to_string(),
            FieldType::OptionalScalar(s) => format!("{}?", s.name()),
            FieldType::ArrayScalar(s) => format!("[{}]", s.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_type_checks() {
        assert!(ScalarType::Int64.is_numeric());
        assert!(ScalarType::Float64.is_numeric());
        assert!(!ScalarType::String.is_numeric());

        assert!(ScalarType::Float64.matches(&Value::Int64(3)));
        assert!(!ScalarType::Int64.matches(&Value::Float64(3.0)));
        assert!(!ScalarType::String.matches(&Value::Null));
    }

    #[test]
    fn test_field_type_accepts() {
        let required = FieldType::Scalar(ScalarType::String);
        assert!(required.accepts(&Value::from("x")));
        assert!(!required.accepts(&Value::Null));

        let optional = FieldType::OptionalScalar(ScalarType::Timestamp);
        assert!(optional.accepts(&Value::Null));
        assert!(optional.accepts(&Value::Timestamp(1)));
        assert!(!optional.accepts(&Value::Int64(1)));

        let tags = FieldType::ArrayScalar(ScalarType::String);
        assert!(tags.is_array());
        assert!(tags.accepts(&Value::from(vec!["a"])));
        assert!(!tags.accepts(&Value::Null));
    }

    #[test]
    fn test_empty_value_and_describe() {
        assert_eq!(
            FieldType::ArrayScalar(ScalarType::String).empty_value(),
            Value::StringArray(vec![])
        );
        assert_eq!(FieldType::OptionalScalar(ScalarType::String).empty_value(), Value::Null);
        assert_eq!(FieldType::OptionalScalar(ScalarType::Int64).describe(), "int64?");
        assert_eq!(FieldType::ArrayScalar(ScalarType::String).describe(), "[string]");
    }
}
