//! Error types for vitrine-markup.

use thiserror::Error;

/// Result type for markup parsing and evaluation.
pub type Result<T> = std::result::Result<T, MarkupError>;

/// Failures raised while parsing or evaluating a markup program.
///
/// These flatten into the coordinator's evaluation-failure descriptor at the
/// capability boundary; the structured form only exists host-side.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MarkupError {
    /// Source text did not parse.
    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// An identifier resolved to nothing in locals or scope.
    #[error("name `{0}` is not defined")]
    Unbound(String),

    /// A capitalized tag resolved to a non-component value.
    #[error("`{0}` is not a component")]
    NotComponent(String),

    /// Field access on a value without that field.
    #[error("no field `{field}` on {kind}")]
    Field { field: String, kind: &'static str },

    /// A typed annotation did not match the value's shape.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A value cannot appear where the program put it.
    #[error("cannot render {kind} {context}")]
    Unrenderable {
        kind: &'static str,
        context: &'static str,
    },

    /// `render(...)` used outside the deferred strategy.
    #[error("`render` is only available under the deferred strategy")]
    RenderNotAvailable,

    /// The program's shape does not fit the selected strategy.
    #[error("{0}")]
    InvalidProgram(String),
}
