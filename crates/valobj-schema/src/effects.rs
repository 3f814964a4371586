//! Refinements and transforms, synchronous and asynchronous.
//!
//! An effect runs only after its inner schema has accepted the value. The
//! asynchronous variants refuse to run inside a synchronous parse and report
//! [`SchemaError::AsyncStep`] instead, so callers can switch to the async
//! path.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AsyncStep, IssueCode, SchemaError, SchemaResult};
use crate::schema::{IntoSchema, Schema, SchemaRef};

/// Default message for a failed refinement.
pub const DEFAULT_REFINE_MESSAGE: &str = "Invalid input";

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
type Mapper = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// An asynchronous predicate over a parsed value.
#[async_trait]
pub trait AsyncRefinement: Send + Sync {
    async fn check(&self, value: &Value) -> bool;
}

/// An asynchronous mapping over a parsed value.
#[async_trait]
pub trait AsyncTransform: Send + Sync {
    async fn apply(&self, value: Value) -> Value;
}

struct FnRefinement<F>(F);

#[async_trait]
impl<F, Fut> AsyncRefinement for FnRefinement<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = bool> + Send,
{
    async fn check(&self, value: &Value) -> bool {
        (self.0)(value.clone()).await
    }
}

struct FnTransform<F>(F);

#[async_trait]
impl<F, Fut> AsyncTransform for FnTransform<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Value> + Send,
{
    async fn apply(&self, value: Value) -> Value {
        (self.0)(value).await
    }
}

/// Synchronous refinement.
#[derive(Clone)]
pub struct Refine {
    inner: SchemaRef,
    predicate: Predicate,
    message: String,
}

/// Accept values of `inner` for which `predicate` holds.
pub fn refine<F>(inner: impl IntoSchema, predicate: F, message: impl Into<String>) -> Refine
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Refine {
        inner: inner.into_schema(),
        predicate: Arc::new(predicate),
        message: message.into(),
    }
}

impl fmt::Debug for Refine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refine")
            .field("inner", &self.inner)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Schema for Refine {
    fn parse(&self, value: &Value) -> SchemaResult<Value> {
        let parsed = self.inner.parse(value)?;
        if (self.predicate)(&parsed) {
            Ok(parsed)
        } else {
            Err(SchemaError::issue(IssueCode::Custom, self.message.clone()))
        }
    }

    async fn parse_async(&self, value: &Value) -> SchemaResult<Value> {
        let parsed = self.inner.parse_async(value).await?;
        if (self.predicate)(&parsed) {
            Ok(parsed)
        } else {
            Err(SchemaError::issue(IssueCode::Custom, self.message.clone()))
        }
    }

    fn is_async(&self) -> bool {
        self.inner.is_async()
    }
}

/// Asynchronous refinement.
#[derive(Clone)]
pub struct RefineAsync {
    inner: SchemaRef,
    refinement: Arc<dyn AsyncRefinement>,
    message: String,
}

/// Accept values of `inner` for which `refinement` resolves to `true`.
pub fn refine_async(
    inner: impl IntoSchema,
    refinement: impl AsyncRefinement + 'static,
) -> RefineAsync {
    RefineAsync {
        inner: inner.into_schema(),
        refinement: Arc::new(refinement),
        message: DEFAULT_REFINE_MESSAGE.to_string(),
    }
}

/// [`refine_async`] from an async closure.
pub fn refine_async_fn<F, Fut>(inner: impl IntoSchema, check: F) -> RefineAsync
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    refine_async(inner, FnRefinement(check))
}

impl RefineAsync {
    /// Replace the default failure message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl fmt::Debug for RefineAsync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefineAsync")
            .field("inner", &self.inner)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Schema for RefineAsync {
    fn parse(&self, value: &Value) -> SchemaResult<Value> {
        self.inner.parse(value)?;
        Err(SchemaError::AsyncStep(AsyncStep::Refinement))
    }

    async fn parse_async(&self, value: &Value) -> SchemaResult<Value> {
        let parsed = self.inner.parse_async(value).await?;
        if self.refinement.check(&parsed).await {
            Ok(parsed)
        } else {
            Err(SchemaError::issue(IssueCode::Custom, self.message.clone()))
        }
    }

    fn is_async(&self) -> bool {
        true
    }
}

/// Synchronous transform.
#[derive(Clone)]
pub struct Transform {
    inner: SchemaRef,
    mapper: Mapper,
}

/// Parse with `inner`, then map the result through `mapper`.
pub fn transform<F>(inner: impl IntoSchema, mapper: F) -> Transform
where
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    Transform {
        inner: inner.into_schema(),
        mapper: Arc::new(mapper),
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Schema for Transform {
    fn parse(&self, value: &Value) -> SchemaResult<Value> {
        self.inner.parse(value).map(|parsed| (self.mapper)(parsed))
    }

    async fn parse_async(&self, value: &Value) -> SchemaResult<Value> {
        let parsed = self.inner.parse_async(value).await?;
        Ok((self.mapper)(parsed))
    }

    fn is_async(&self) -> bool {
        self.inner.is_async()
    }
}

/// Asynchronous transform.
#[derive(Clone)]
pub struct TransformAsync {
    inner: SchemaRef,
    transform: Arc<dyn AsyncTransform>,
}

/// Parse with `inner`, then map the result through an awaited `transform`.
pub fn transform_async(
    inner: impl IntoSchema,
    transform: impl AsyncTransform + 'static,
) -> TransformAsync {
    TransformAsync {
        inner: inner.into_schema(),
        transform: Arc::new(transform),
    }
}

/// [`transform_async`] from an async closure.
pub fn transform_async_fn<F, Fut>(inner: impl IntoSchema, mapper: F) -> TransformAsync
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Value> + Send + 'static,
{
    transform_async(inner, FnTransform(mapper))
}

impl fmt::Debug for TransformAsync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformAsync")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Schema for TransformAsync {
    fn parse(&self, value: &Value) -> SchemaResult<Value> {
        self.inner.parse(value)?;
        Err(SchemaError::AsyncStep(AsyncStep::Transform))
    }

    async fn parse_async(&self, value: &Value) -> SchemaResult<Value> {
        let parsed = self.inner.parse_async(value).await?;
        Ok(self.transform.apply(parsed).await)
    }

    fn is_async(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::{array, object};
    use crate::primitives::{number, string};
    use serde_json::json;

    fn upper(value: Value) -> Value {
        match value {
            Value::String(s) => Value::String(s.to_uppercase()),
            other => other,
        }
    }

    #[test]
    fn refine_applies_after_inner() {
        let even = refine(number(), |v| v.as_i64().is_some_and(|n| n % 2 == 0), "must be even");
        assert!(even.parse(&json!(4)).is_ok());
        assert_eq!(even.parse(&json!(3)).unwrap_err().to_string(), "must be even");
        assert_eq!(
            even.parse(&json!("4")).unwrap_err().to_string(),
            "Expected number, received string"
        );
    }

    #[test]
    fn transform_maps_parsed_value() {
        let schema = transform(string(), upper);
        assert_eq!(schema.parse(&json!("abc")).unwrap(), json!("ABC"));
        assert!(!schema.is_async());
    }

    #[test]
    fn async_refinement_blocks_sync_parse() {
        let schema = refine_async_fn(string(), |_| async { true });
        assert_eq!(
            schema.parse(&json!("John Doe")),
            Err(SchemaError::AsyncStep(AsyncStep::Refinement))
        );
        assert!(schema.is_async());
    }

    #[test]
    fn async_transform_blocks_sync_parse() {
        let schema = transform_async_fn(string(), |_| async { json!("") });
        assert_eq!(
            schema.parse(&json!("John Doe")),
            Err(SchemaError::AsyncStep(AsyncStep::Transform))
        );
    }

    #[test]
    fn inner_failure_wins_over_async_step() {
        let schema = refine_async_fn(string(), |_| async { true });
        assert!(matches!(schema.parse(&json!(1)), Err(SchemaError::Invalid(_))));
    }

    #[test]
    fn nested_async_step_aborts_composite_parse() {
        let schema = object().field("tags", array(transform_async_fn(string(), |v| async { v })));
        assert!(schema.is_async());
        assert_eq!(
            schema.parse(&json!({ "tags": ["a"] })),
            Err(SchemaError::AsyncStep(AsyncStep::Transform))
        );
    }

    #[tokio::test]
    async fn async_refinement_reports_default_message() {
        let schema = refine_async_fn(string(), |_| async { false });
        let err = schema.parse_async(&json!("John Doe")).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid input");
    }

    #[tokio::test]
    async fn async_refinement_custom_message() {
        let schema = refine_async_fn(string(), |_| async { false }).message("taken");
        let err = schema.parse_async(&json!("x")).await.unwrap_err();
        assert_eq!(err.to_string(), "taken");
    }

    #[tokio::test]
    async fn async_transform_runs_on_async_path() {
        let schema = transform_async_fn(string(), |v| async move { upper(v) });
        assert_eq!(schema.parse_async(&json!("abc")).await.unwrap(), json!("ABC"));
    }

    #[tokio::test]
    async fn sync_effects_work_on_async_path() {
        let schema = transform(refine(string(), |v| v.as_str() != Some(""), "empty"), upper);
        assert_eq!(schema.parse_async(&json!("x")).await.unwrap(), json!("X"));
        assert!(schema.parse_async(&json!("")).await.is_err());
    }
}
