//! Evaluator capability traits and the settlement channel.
//!
//! "Running code against a scope" is modeled as an injected capability: the
//! coordinator is generic over an [`Evaluator`] whose associated types carry
//! the host's renderable unit and binding value. The two methods are the two
//! evaluation strategies; the configuration flag picks which one a cycle
//! dispatches to.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;

/// Input handed to an evaluator for one attempt.
///
/// Built fresh per cycle and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct EvaluationInput<V> {
    /// Transformed source text.
    pub code: String,
    /// Name→value bindings visible to the executed code.
    pub scope: Arc<HashMap<String, V>>,
    /// Whether the typed superset of the host language is accepted.
    pub typed: bool,
}

/// What a deferred evaluation settled with: the unit, or a raw failure text
/// that the coordinator normalizes into an evaluation-failure descriptor.
pub type SettledOutcome<U> = std::result::Result<U, String>;

/// One-shot channel through which deferred code reports its outcome.
///
/// This replaces the dual throw-vs-callback convention with a single two-case
/// settlement. Consuming `self` makes "invoke exactly one of success/error"
/// a property of the type rather than a runtime obligation; the executed code
/// may hold the handle for an arbitrary delay before settling, or drop it and
/// leave the coordinator pending forever.
pub struct Settlement<U> {
    publish: Box<dyn FnOnce(SettledOutcome<U>) + Send>,
}

impl<U> Settlement<U> {
    /// Build a settlement around a publication sink.
    ///
    /// The coordinator wires this to its own state; evaluator implementations
    /// use it directly in tests to capture what their programs settle with.
    pub fn new(publish: impl FnOnce(SettledOutcome<U>) + Send + 'static) -> Self {
        Self {
            publish: Box::new(publish),
        }
    }

    /// Report the renderable unit the executed code produced.
    pub fn resolve(self, unit: U) {
        (self.publish)(Ok(unit));
    }

    /// Report a failure raised by the executed code.
    pub fn reject(self, error: impl fmt::Display) {
        (self.publish)(Err(error.to_string()));
    }
}

impl<U> fmt::Debug for Settlement<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Settlement")
    }
}

/// A host evaluator: executes transformed code against a binding scope.
pub trait Evaluator: Send + Sync + 'static {
    /// Renderable result consumed by a display layer. Opaque to the core:
    /// replaced wholesale on every successful settlement, never patched.
    type Unit: Clone + Send + Sync + fmt::Debug + 'static;

    /// Scope binding value.
    type Value: Clone + Send + Sync + 'static;

    /// Inline strategy: produce the unit synchronously, or fail. Must never
    /// suspend.
    fn evaluate(&self, input: &EvaluationInput<Self::Value>) -> Result<Self::Unit>;

    /// Deferred strategy: the executed code itself eventually settles.
    ///
    /// The call returns immediately and carries no result; the unit or error
    /// arrives whenever the code invokes the settlement — possibly
    /// synchronously inside this call, possibly much later, possibly never.
    fn evaluate_deferred(
        &self,
        input: EvaluationInput<Self::Value>,
        settlement: Settlement<Self::Unit>,
    );
}
