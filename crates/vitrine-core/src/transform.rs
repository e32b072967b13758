//! The transform stage.
//!
//! Converts authored source text into text ready for evaluation. Hooks may be
//! synchronous or asynchronous and may fail either way; both calling
//! conventions are normalized to a single awaitable shape here, so the
//! coordinator never needs to care which kind it was handed.

use std::fmt;
use std::future::{self, Future};
use std::pin::Pin;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;

use crate::error::{Error, Result};

/// Future returned by a transform hook.
///
/// The settled value is dynamic on purpose: hooks that cross a host boundary
/// (a preprocessor plugin, an external service) can resolve with something
/// other than source text, and the stage has to detect that by inspecting the
/// value rather than by catching a failure.
pub type TransformFuture =
    Pin<Box<dyn Future<Output = std::result::Result<Value, String>> + Send>>;

type HookFn = dyn Fn(String) -> TransformFuture + Send + Sync;

/// A user-supplied transform step, shared and cloneable.
///
/// The default hook is the identity: the input resolves to itself,
/// immediately.
#[derive(Clone)]
pub struct TransformHook {
    hook: Arc<HookFn>,
}

impl TransformHook {
    /// Build a hook with full control over the settled value.
    ///
    /// Most callers want [`TransformHook::from_fn`] or
    /// [`TransformHook::from_async`], which keep the hook honest by
    /// construction; this constructor exists for hooks whose settled value
    /// genuinely is dynamic.
    pub fn raw<F>(hook: F) -> Self
    where
        F: Fn(String) -> TransformFuture + Send + Sync + 'static,
    {
        Self {
            hook: Arc::new(hook),
        }
    }

    /// The identity transform.
    pub fn identity() -> Self {
        Self::raw(|code| future::ready(Ok(Value::String(code))).boxed())
    }

    /// Wrap a synchronous fallible transform.
    pub fn from_fn<F, E>(f: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<String, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        Self::raw(move |code| {
            let settled = f(&code).map(Value::String).map_err(|e| e.to_string());
            future::ready(settled).boxed()
        })
    }

    /// Wrap an asynchronous fallible transform.
    pub fn from_async<F, Fut, E>(f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<String, E>> + Send + 'static,
        E: fmt::Display,
    {
        Self::raw(move |code| {
            let fut = f(code);
            async move { fut.await.map(Value::String).map_err(|e| e.to_string()) }.boxed()
        })
    }

    /// Run the hook and validate what it settled with.
    ///
    /// A failed hook becomes [`Error::Transform`]; a hook that settled with a
    /// non-string value becomes [`Error::TransformResultInvalid`].
    pub async fn apply(&self, code: String) -> Result<String> {
        let settled = (self.hook)(code).await.map_err(Error::Transform)?;
        match settled {
            Value::String(transformed) => Ok(transformed),
            other => Err(Error::TransformResultInvalid {
                actual: value_kind(&other),
            }),
        }
    }

    /// Poll the hook exactly once, for cycles that must not suspend.
    ///
    /// The initial cycle has to produce the first paint out of a synchronous
    /// call chain, so a hook that is not immediately ready fails that cycle
    /// instead of suspending it.
    pub fn apply_sync(&self, code: String) -> Result<String> {
        match self.apply(code).now_or_never() {
            Some(outcome) => outcome,
            None => Err(Error::Transform(
                "hook did not settle synchronously".to_string(),
            )),
        }
    }
}

impl Default for TransformHook {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for TransformHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TransformHook")
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn identity_resolves_to_input() {
        let hook = TransformHook::identity();
        let out = hook.apply("let x = 1".to_string()).await.unwrap();
        assert_eq!(out, "let x = 1");
    }

    #[tokio::test]
    async fn sync_hook_failure_is_transform_error() {
        let hook = TransformHook::from_fn(|_code| Err::<String, _>("macro pass exploded"));
        let err = hook.apply("x".to_string()).await.unwrap_err();
        assert!(matches!(err, Error::Transform(_)));
        assert!(err.to_string().contains("macro pass exploded"));
    }

    #[tokio::test]
    async fn async_hook_is_awaited() {
        let hook = TransformHook::from_async(|code: String| async move {
            tokio::task::yield_now().await;
            Ok::<_, String>(code.to_uppercase())
        });
        let out = hook.apply("abc".to_string()).await.unwrap();
        assert_eq!(out, "ABC");
    }

    #[tokio::test]
    async fn non_string_settlement_is_invalid_result() {
        let hook = TransformHook::raw(|_code| {
            std::future::ready(Ok(json!({ "compiled": true }))).boxed()
        });
        let err = hook.apply("x".to_string()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::TransformResultInvalid { actual: "an object" }
        ));
    }

    #[tokio::test]
    async fn apply_sync_rejects_pending_hooks() {
        let hook = TransformHook::from_async(|code: String| async move {
            tokio::task::yield_now().await;
            Ok::<_, String>(code)
        });
        let err = hook.apply_sync("x".to_string()).unwrap_err();
        assert!(err.to_string().contains("did not settle synchronously"));

        // An immediately-ready hook is fine.
        let out = TransformHook::identity().apply_sync("y".to_string()).unwrap();
        assert_eq!(out, "y");
    }
}
