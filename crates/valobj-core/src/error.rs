use valobj_schema::{AsyncStep, Issue, SchemaError};
use valobj_types::{TypeError, TypeTag};

/// A schema rejected a value.
///
/// Wraps the schema engine's diagnostic without altering it: the message
/// and the per-field issues read exactly as the engine produced them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{diagnostic}")]
pub struct InvalidValue {
    diagnostic: SchemaError,
}

impl InvalidValue {
    pub fn new(diagnostic: SchemaError) -> Self {
        Self { diagnostic }
    }

    /// The original diagnostic.
    pub fn diagnostic(&self) -> &SchemaError {
        &self.diagnostic
    }

    /// Per-field issues, in the order the engine reported them.
    pub fn issues(&self) -> &[Issue] {
        self.diagnostic.issues()
    }
}

/// Errors produced by value-object operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    /// The schema rejected the value.
    #[error(transparent)]
    Invalid(#[from] InvalidValue),

    /// Synchronous construction reached an asynchronous schema step.
    #[error("{}. Use {kind}::create_async() instead of {kind}::create()", .step.description())]
    RequiresAsync { kind: String, step: AsyncStep },

    /// The tag is already bound to a kind in this registry.
    #[error("type already defined: {0}")]
    DuplicateType(TypeTag),

    /// A role was requested from an instance of another type.
    #[error("role {role} views type {expected}, not {actual}")]
    RoleMismatch {
        role: &'static str,
        expected: &'static str,
        actual: TypeTag,
    },

    #[error("invalid type tag: {0}")]
    Type(#[from] TypeError),

    /// Configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ValueError {
    /// Re-type a schema failure; `kind` names the type in async diagnostics.
    pub fn from_schema(error: SchemaError, kind: &str) -> Self {
        match error {
            SchemaError::AsyncStep(step) => Self::RequiresAsync {
                kind: kind.to_string(),
                step,
            },
            invalid => Self::Invalid(InvalidValue::new(invalid)),
        }
    }

    /// Returns `true` if the schema rejected the value.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// Returns `true` if the caller must use the asynchronous creation path.
    pub fn requires_async(&self) -> bool {
        matches!(self, Self::RequiresAsync { .. })
    }

    /// Per-field issues when the schema rejected the value; empty otherwise.
    pub fn issues(&self) -> &[Issue] {
        match self {
            Self::Invalid(invalid) => invalid.issues(),
            _ => &[],
        }
    }
}

/// Result alias for value-object operations.
pub type ValueResult<T> = Result<T, ValueError>;
