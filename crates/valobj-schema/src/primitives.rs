//! Scalar schemas: strings, numbers, booleans, and literals.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{invalid_type, IssueCode, SchemaError, SchemaResult};
use crate::schema::Schema;

/// String schema with optional length bounds.
#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    min: Option<usize>,
    max: Option<usize>,
}

/// Accept any string.
pub fn string() -> StringSchema {
    StringSchema::default()
}

impl StringSchema {
    /// Require at least `len` characters.
    pub fn min(mut self, len: usize) -> Self {
        self.min = Some(len);
        self
    }

    /// Allow at most `len` characters.
    pub fn max(mut self, len: usize) -> Self {
        self.max = Some(len);
        self
    }
}

#[async_trait]
impl Schema for StringSchema {
    fn parse(&self, value: &Value) -> SchemaResult<Value> {
        let Value::String(s) = value else {
            return Err(invalid_type("string", value));
        };
        let len = s.chars().count();
        if let Some(min) = self.min {
            if len < min {
                return Err(SchemaError::issue(
                    IssueCode::TooSmall { minimum: min as f64 },
                    format!("String must contain at least {min} character(s)"),
                ));
            }
        }
        if let Some(max) = self.max {
            if len > max {
                return Err(SchemaError::issue(
                    IssueCode::TooBig { maximum: max as f64 },
                    format!("String must contain at most {max} character(s)"),
                ));
            }
        }
        Ok(value.clone())
    }

    async fn parse_async(&self, value: &Value) -> SchemaResult<Value> {
        self.parse(value)
    }
}

/// Number schema with optional integer and range constraints.
#[derive(Debug, Clone, Default)]
pub struct NumberSchema {
    int: bool,
    min: Option<f64>,
    max: Option<f64>,
}

/// Accept any number.
pub fn number() -> NumberSchema {
    NumberSchema::default()
}

impl NumberSchema {
    /// Reject numbers with a fractional part.
    pub fn int(mut self) -> Self {
        self.int = true;
        self
    }

    /// Inclusive lower bound.
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Inclusive upper bound.
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }
}

#[async_trait]
impl Schema for NumberSchema {
    fn parse(&self, value: &Value) -> SchemaResult<Value> {
        let Value::Number(n) = value else {
            return Err(invalid_type("number", value));
        };
        // Every serde_json number converts to f64 (possibly lossy for huge ints).
        let as_f64 = n.as_f64().unwrap_or_default();
        if self.int && !(n.is_i64() || n.is_u64() || as_f64.fract() == 0.0) {
            return Err(SchemaError::issue(
                IssueCode::InvalidType {
                    expected: "integer",
                    received: "float",
                },
                "Expected integer, received float",
            ));
        }
        if let Some(min) = self.min {
            if as_f64 < min {
                return Err(SchemaError::issue(
                    IssueCode::TooSmall { minimum: min },
                    format!("Number must be greater than or equal to {min}"),
                ));
            }
        }
        if let Some(max) = self.max {
            if as_f64 > max {
                return Err(SchemaError::issue(
                    IssueCode::TooBig { maximum: max },
                    format!("Number must be less than or equal to {max}"),
                ));
            }
        }
        Ok(value.clone())
    }

    async fn parse_async(&self, value: &Value) -> SchemaResult<Value> {
        self.parse(value)
    }
}

/// Boolean schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanSchema;

/// Accept `true` or `false`.
pub fn boolean() -> BooleanSchema {
    BooleanSchema
}

#[async_trait]
impl Schema for BooleanSchema {
    fn parse(&self, value: &Value) -> SchemaResult<Value> {
        match value {
            Value::Bool(_) => Ok(value.clone()),
            other => Err(invalid_type("boolean", other)),
        }
    }

    async fn parse_async(&self, value: &Value) -> SchemaResult<Value> {
        self.parse(value)
    }
}

/// Schema accepting exactly one value.
#[derive(Debug, Clone)]
pub struct LiteralSchema {
    expected: Value,
}

/// Accept only `expected`.
pub fn literal(expected: impl Into<Value>) -> LiteralSchema {
    LiteralSchema {
        expected: expected.into(),
    }
}

#[async_trait]
impl Schema for LiteralSchema {
    fn parse(&self, value: &Value) -> SchemaResult<Value> {
        if *value == self.expected {
            Ok(value.clone())
        } else {
            Err(SchemaError::issue(
                IssueCode::InvalidLiteral {
                    expected: self.expected.clone(),
                },
                format!("Invalid literal value, expected {}", self.expected),
            ))
        }
    }

    async fn parse_async(&self, value: &Value) -> SchemaResult<Value> {
        self.parse(value)
    }
}
