//! Shared session setup for the render and watch commands.
//!
//! Both commands drive the same thing: a coordinator wired to the markup
//! evaluator, seeded from a snippet file, with scope bindings from the
//! command line. The file plus the watcher stand in for an editor surface.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use vitrine_core::{LiveCoordinator, LiveOptions};
use vitrine_markup::{MarkupEvaluator, Node, Value};

use crate::scope;

/// Snippet selection and evaluation flags shared by `render` and `watch`.
#[derive(Debug, Args)]
pub struct SnippetArgs {
    /// Path to the snippet file
    pub file: PathBuf,

    /// Print escaped HTML markup instead of text content
    #[arg(long)]
    pub html: bool,

    /// Bind a scope value (repeatable)
    #[arg(long = "scope", value_name = "NAME=JSON")]
    pub scope: Vec<String>,

    /// Use the deferred strategy: the program must call render(...) itself
    #[arg(long)]
    pub no_inline: bool,

    /// Accept only the base language, without type annotations
    #[arg(long)]
    pub untyped: bool,
}

/// What the published state says right now.
pub enum Outcome {
    Unit(Node),
    Error(String),
    /// A deferred program that has not called `render(...)`.
    Pending,
}

/// A coordinator wired to the markup evaluator for one snippet file.
pub struct Session {
    live: LiveCoordinator<MarkupEvaluator>,
}

impl Session {
    /// Read the snippet and run the coordinator up to its first settlement.
    pub async fn start(args: &SnippetArgs) -> anyhow::Result<Self> {
        let code = fs::read_to_string(&args.file)
            .with_context(|| format!("cannot read {}", args.file.display()))?;

        let mut scope: HashMap<String, Value> = HashMap::new();
        for binding in &args.scope {
            let (name, value) = scope::parse_binding(binding)?;
            scope.insert(name, value);
        }

        let options = LiveOptions {
            code,
            typed: !args.untyped,
            scope,
            no_inline: args.no_inline,
            ..LiveOptions::default()
        };
        let (live, _rx) = LiveCoordinator::start(MarkupEvaluator::new(), options).await;
        Ok(Self { live })
    }

    /// Feed updated snippet text through the coordinator intake.
    pub async fn refresh(&self, code: String) {
        self.live.on_change(code).await;
    }

    pub fn outcome(&self) -> Outcome {
        let snapshot = self.live.snapshot();
        match (snapshot.unit, snapshot.error) {
            (Some(unit), _) => Outcome::Unit(unit),
            (None, Some(error)) => Outcome::Error(error),
            (None, None) => Outcome::Pending,
        }
    }
}
