//! Error types for vitrine-core.

use thiserror::Error;

/// Result type for vitrine-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures a single evaluation cycle can produce.
///
/// Every variant is flattened to its `Display` text before publication;
/// consumers only ever see the descriptor string, never the enum.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The transform hook failed, synchronously or as a rejected future.
    #[error("transform failed: {0}")]
    Transform(String),

    /// The transform hook settled, but not with source text.
    ///
    /// Distinct from [`Error::Transform`]: a hook can succeed and still hand
    /// back something unusable, so the settled value's type is checked, not
    /// only the failure path.
    #[error("transform produced {actual} instead of source text")]
    TransformResultInvalid {
        /// What the hook actually settled with.
        actual: &'static str,
    },

    /// The evaluated code failed, synchronously or through its settlement.
    #[error("evaluation failed: {0}")]
    Evaluation(String),
}
