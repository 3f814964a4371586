use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Errors produced by schema parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// The value does not conform; carries every issue found.
    #[error("{0}")]
    Invalid(Issues),

    /// A synchronous parse reached a step that must be awaited.
    #[error("{0}")]
    AsyncStep(AsyncStep),
}

impl SchemaError {
    /// Invalid with a single issue at the root path.
    pub fn issue(code: IssueCode, message: impl Into<String>) -> Self {
        Self::Invalid(Issues(vec![Issue::new(code, message)]))
    }

    /// The issues carried by an `Invalid` error (empty for `AsyncStep`).
    pub fn issues(&self) -> &[Issue] {
        match self {
            Self::Invalid(issues) => &issues.0,
            Self::AsyncStep(_) => &[],
        }
    }

    /// Prepend a path segment to every issue (used by composite schemas).
    pub fn at(self, segment: PathSegment) -> Self {
        match self {
            Self::Invalid(Issues(issues)) => Self::Invalid(Issues(
                issues
                    .into_iter()
                    .map(|mut issue| {
                        issue.path.insert(0, segment.clone());
                        issue
                    })
                    .collect(),
            )),
            other => other,
        }
    }
}

/// Result alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// The kind of asynchronous step that stopped a synchronous parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AsyncStep {
    Refinement,
    Transform,
}

impl AsyncStep {
    /// The diagnostic without the trailing remedy sentence.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Refinement => "Async refinement encountered during synchronous parse operation",
            Self::Transform => {
                "Asynchronous transform encountered during synchronous parse operation"
            }
        }
    }
}

impl fmt::Display for AsyncStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. Use .parseAsync instead.", self.description())
    }
}

/// Ordered collection of issues found in one parse.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Issues(pub Vec<Issue>);

impl Issues {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.0.iter()
    }
}

impl fmt::Display for Issues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

/// A single rule violation, located by its path inside the parsed value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub path: Vec<PathSegment>,
    pub code: IssueCode,
    pub message: String,
}

impl Issue {
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            code,
            message: message.into(),
        }
    }

    /// Dotted path, e.g. `address.lines.0`. Empty at the root.
    pub fn path_string(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path_string(), self.message)
        }
    }
}

/// One step of an issue path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Machine-readable classification of an issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum IssueCode {
    InvalidType {
        expected: &'static str,
        received: &'static str,
    },
    InvalidLiteral {
        expected: Value,
    },
    TooSmall {
        minimum: f64,
    },
    TooBig {
        maximum: f64,
    },
    Custom,
}

/// Name of a JSON value's type as used in diagnostics.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Issue for a value of the wrong type.
pub(crate) fn invalid_type(expected: &'static str, value: &Value) -> SchemaError {
    let received = type_name(value);
    SchemaError::issue(
        IssueCode::InvalidType { expected, received },
        format!("Expected {expected}, received {received}"),
    )
}
