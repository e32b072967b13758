//! Reference host language for Vitrine live previews.
//!
//! A small JSX-like markup language: elements with attributes, scope-bound
//! interpolations, native components, and an optional typed superset. The
//! [`MarkupEvaluator`] plugs into `vitrine-core` as the injected evaluator
//! and supports both the inline strategy (single-expression programs) and
//! the deferred strategy (`let` bindings plus a self-driven `render(...)`).

pub mod element;
pub mod error;
pub mod eval;
pub mod parser;
pub mod value;

pub use element::{Element, Node};
pub use error::{MarkupError, Result};
pub use eval::MarkupEvaluator;
pub use value::{Component, Props, Value};
