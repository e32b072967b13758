//! Live evaluation coordinator for embeddable code previews.
//!
//! This crate provides:
//! - The coordinator state machine: intake of source edits, one-shot guard
//!   around the duplicated initial evaluation, atomic unit-or-error
//!   publication over a watch channel
//! - The transform stage: sync/async user hooks normalized to one shape,
//!   with settled-value validation
//! - The evaluator capability traits and the deferred settlement channel
//! - The editor surface contract for hosts that capture edits
//!
//! The host language itself is injected: see `vitrine-markup` for the
//! reference evaluator.

pub mod coordinator;
pub mod editor;
pub mod error;
pub mod evaluate;
pub mod transform;

pub use coordinator::{LiveCoordinator, LiveOptions, Snapshot, Theme};
pub use editor::{BufferEditor, EditorSurface};
pub use error::{Error, Result};
pub use evaluate::{EvaluationInput, Evaluator, SettledOutcome, Settlement};
pub use transform::{TransformFuture, TransformHook};
