//! The live evaluation coordinator.
//!
//! Owns the authoritative unit-or-error state, decides when to re-run the
//! transform/evaluate pipeline, and guards the initial evaluation against the
//! reactive wiring's guaranteed duplicate mount pass.
//!
//! # Wiring
//!
//! Construction runs the initial cycle synchronously (unless skipped), then
//! runs the change-cycle handler once with the same inputs — that second run
//! is the mount pass of the reactive wiring, and it is exactly the duplicate
//! the [`CacheMarker`] exists to swallow. After that an observer task re-runs
//! the handler whenever a cycle-triggering input changes. Editor keystrokes
//! bypass the wiring and enter through [`LiveCoordinator::on_change`].
//!
//! # Ordering
//!
//! Within one cycle the transform fully settles before the evaluator runs.
//! Across cycles there is no ordering guarantee and no cancellation: a
//! superseded cycle runs to completion and still publishes, and whichever
//! settlement lands last determines the published state.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

use crate::error::{Error, Result};
use crate::evaluate::{EvaluationInput, Evaluator, Settlement};
use crate::transform::TransformHook;

/// Opaque style object handed through to display consumers.
pub type Theme = serde_json::Value;

/// Construction options for a coordinator.
///
/// `V` is the host evaluator's binding value type.
#[derive(Debug, Clone)]
pub struct LiveOptions<V> {
    /// Initial source text.
    pub code: String,
    /// Display language tag for highlighting consumers. Display-only.
    pub language: String,
    /// Opaque style object. Display-only.
    pub theme: Option<Theme>,
    /// Accept the typed superset of the host language.
    pub typed: bool,
    /// Freeze editing surfaces. Display-only.
    pub disabled: bool,
    /// Name→value bindings visible to evaluated code.
    pub scope: HashMap<String, V>,
    /// Transform hook; identity when absent.
    pub transform: Option<TransformHook>,
    /// Select the deferred evaluation strategy.
    pub no_inline: bool,
    /// Skip the initial cycle entirely; the published state starts empty and
    /// the wiring's mount pass performs the first evaluation.
    pub skip_initial_render: bool,
}

impl<V> Default for LiveOptions<V> {
    fn default() -> Self {
        Self {
            code: String::new(),
            language: "markup".to_string(),
            theme: None,
            typed: true,
            disabled: false,
            scope: HashMap::new(),
            transform: None,
            no_inline: false,
            skip_initial_render: false,
        }
    }
}

/// Read-only snapshot published to consumers.
///
/// At most one of `unit`/`error` is present after any settlement. Both are
/// absent before the first settlement and while a deferred cycle is pending.
#[derive(Debug, Clone)]
pub struct Snapshot<U> {
    /// Current renderable unit.
    pub unit: Option<U>,
    /// Current error descriptor.
    pub error: Option<String>,
    /// Canonical source text as set by the host (not per-keystroke).
    pub code: String,
    /// Display language tag.
    pub language: String,
    /// Opaque style object.
    pub theme: Option<Theme>,
    /// Whether editing surfaces should freeze.
    pub disabled: bool,
}

/// One-shot guard for the duplicate mount evaluation.
///
/// `Primed` holds the exact code the initial cycle just evaluated; the first
/// change-cycle intake matching it is swallowed and the marker moves to
/// `Consumed`, after which every intake evaluates normally — including a
/// literal resubmission of the same code.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CacheMarker {
    Unset,
    Primed(String),
    Consumed,
}

/// Cycle-triggering inputs, observed over a watch channel.
#[derive(Debug, Clone)]
struct CycleInputs<V> {
    code: String,
    scope: Arc<HashMap<String, V>>,
    typed: bool,
    no_inline: bool,
    transform: TransformHook,
}

struct Shared<U> {
    snapshot: watch::Sender<Snapshot<U>>,
    marker: Mutex<CacheMarker>,
}

impl<U: Clone> Shared<U> {
    /// Whole-pair replacement; a settlement never merges old and new fields.
    fn publish_unit(&self, unit: U) {
        self.snapshot.send_modify(|s| {
            s.unit = Some(unit);
            s.error = None;
        });
    }

    fn publish_error(&self, descriptor: String) {
        self.snapshot.send_modify(|s| {
            s.unit = None;
            s.error = Some(descriptor);
        });
    }

    /// Transitional "unit pending, error cleared" state for deferred cycles.
    fn publish_pending(&self) {
        self.snapshot.send_modify(|s| {
            s.unit = None;
            s.error = None;
        });
    }

    fn marker(&self) -> std::sync::MutexGuard<'_, CacheMarker> {
        self.marker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The coordinator handle. Cheap to clone; all clones share one state.
pub struct LiveCoordinator<E: Evaluator> {
    shared: Arc<Shared<E::Unit>>,
    inputs: watch::Sender<CycleInputs<E::Value>>,
    evaluator: Arc<E>,
}

impl<E: Evaluator> Clone for LiveCoordinator<E> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            inputs: self.inputs.clone(),
            evaluator: self.evaluator.clone(),
        }
    }
}

impl<E: Evaluator> fmt::Debug for LiveCoordinator<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LiveCoordinator")
    }
}

impl<E: Evaluator> LiveCoordinator<E> {
    /// Construct the coordinator and run it up to a steady state: the initial
    /// cycle (unless skipped), then the wiring's mount pass, then a spawned
    /// observer for later input changes.
    ///
    /// Returns the cloneable handle and a receiver for published snapshots.
    /// Must be called within a tokio runtime. `start` resolves once the mount
    /// pass has run its transform stage; a deferred settlement may still be
    /// outstanding at that point.
    pub async fn start(
        evaluator: E,
        options: LiveOptions<E::Value>,
    ) -> (Self, watch::Receiver<Snapshot<E::Unit>>) {
        let LiveOptions {
            code,
            language,
            theme,
            typed,
            disabled,
            scope,
            transform,
            no_inline,
            skip_initial_render,
        } = options;

        let evaluator = Arc::new(evaluator);
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot {
            unit: None,
            error: None,
            code: code.clone(),
            language,
            theme,
            disabled,
        });
        let shared = Arc::new(Shared {
            snapshot: snapshot_tx,
            marker: Mutex::new(CacheMarker::Unset),
        });

        let initial = CycleInputs {
            code,
            scope: Arc::new(scope),
            typed,
            no_inline,
            transform: transform.unwrap_or_default(),
        };

        // First paint comes out of this call, synchronously where possible.
        if !skip_initial_render {
            initial_cycle(&shared, &evaluator, &initial);
        }

        let (inputs_tx, mut inputs_rx) = watch::channel(initial.clone());

        // Mount pass: the wiring observes the same inputs the initial cycle
        // just used, so this is the duplicate the marker swallows.
        run_guarded(&shared, &evaluator, initial).await;

        {
            let shared = shared.clone();
            let evaluator = evaluator.clone();
            tokio::spawn(async move {
                while inputs_rx.changed().await.is_ok() {
                    let inputs = inputs_rx.borrow_and_update().clone();
                    run_guarded(&shared, &evaluator, inputs).await;
                }
            });
        }

        let coordinator = Self {
            shared,
            inputs: inputs_tx,
            evaluator,
        };
        (coordinator, snapshot_rx)
    }

    /// Sole intake for new source text; runs a change cycle before returning.
    ///
    /// With the inline strategy the snapshot reflects the outcome by the time
    /// this returns. With the deferred strategy the pending state has been
    /// published and the settlement chain started; the outcome lands whenever
    /// the executed code settles.
    ///
    /// The canonical `code` field of the snapshot is not touched here — that
    /// belongs to the host via [`LiveCoordinator::set_code`].
    pub async fn on_change(&self, new_code: impl Into<String>) {
        let mut inputs = self.inputs.borrow().clone();
        inputs.code = new_code.into();
        run_guarded(&self.shared, &self.evaluator, inputs).await;
    }

    /// Force an error state from outside the pipeline (e.g. an editor surface
    /// reporting a capture fault). Clears any current unit.
    pub fn on_error(&self, descriptor: impl fmt::Display) {
        self.shared.publish_error(descriptor.to_string());
    }

    /// Subscribe an additional consumer to the published snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<E::Unit>> {
        self.shared.snapshot.subscribe()
    }

    /// The current snapshot, cloned out of the channel.
    pub fn snapshot(&self) -> Snapshot<E::Unit> {
        self.shared.snapshot.borrow().clone()
    }

    /// Set the canonical source text. Re-runs the pipeline via the wiring and
    /// refreshes the text editor surfaces display.
    pub fn set_code(&self, code: impl Into<String>) {
        let code = code.into();
        self.shared
            .snapshot
            .send_modify(|s| s.code = code.clone());
        self.inputs.send_modify(|i| i.code = code);
    }

    /// Replace the binding scope. Cycle-triggering.
    pub fn set_scope(&self, scope: HashMap<String, E::Value>) {
        self.inputs.send_modify(|i| i.scope = Arc::new(scope));
    }

    /// Toggle the typed superset of the host language. Cycle-triggering.
    pub fn set_typed(&self, typed: bool) {
        self.inputs.send_modify(|i| i.typed = typed);
    }

    /// Switch between the inline and deferred strategies. Cycle-triggering.
    pub fn set_no_inline(&self, no_inline: bool) {
        self.inputs.send_modify(|i| i.no_inline = no_inline);
    }

    /// Replace the transform hook. Cycle-triggering.
    pub fn set_transform(&self, transform: TransformHook) {
        self.inputs.send_modify(|i| i.transform = transform);
    }

    /// Display-only; never triggers a cycle.
    pub fn set_language(&self, language: impl Into<String>) {
        let language = language.into();
        self.shared.snapshot.send_modify(|s| s.language = language);
    }

    /// Display-only; never triggers a cycle.
    pub fn set_theme(&self, theme: Option<Theme>) {
        self.shared.snapshot.send_modify(|s| s.theme = theme);
    }

    /// Display-only; never triggers a cycle.
    pub fn set_disabled(&self, disabled: bool) {
        self.shared.snapshot.send_modify(|s| s.disabled = disabled);
    }
}

/// Construction-time cycle. The transform is polled exactly once instead of
/// awaited so the first paint can come out of a synchronous call chain; the
/// deferred strategy is still permitted — it starts the settlement chain
/// without blocking.
fn initial_cycle<E: Evaluator>(
    shared: &Arc<Shared<E::Unit>>,
    evaluator: &Arc<E>,
    inputs: &CycleInputs<E::Value>,
) {
    match inputs.transform.apply_sync(inputs.code.clone()) {
        Ok(code) => {
            let input = EvaluationInput {
                code,
                scope: inputs.scope.clone(),
                typed: inputs.typed,
            };
            dispatch(shared, evaluator, input, inputs.no_inline);
        }
        Err(err) => shared.publish_error(err.to_string()),
    }

    // Recorded regardless of outcome: the mount pass must not repeat this
    // cycle even when it settled with an error.
    *shared.marker() = CacheMarker::Primed(inputs.code.clone());
}

/// Outer guard around the change cycle: wiring failures route into the same
/// error-publication path instead of escaping the coordinator.
async fn run_guarded<E: Evaluator>(
    shared: &Arc<Shared<E::Unit>>,
    evaluator: &Arc<E>,
    inputs: CycleInputs<E::Value>,
) {
    if let Err(err) = change_cycle(shared, evaluator, inputs).await {
        shared.publish_error(err.to_string());
    }
}

async fn change_cycle<E: Evaluator>(
    shared: &Arc<Shared<E::Unit>>,
    evaluator: &Arc<E>,
    inputs: CycleInputs<E::Value>,
) -> Result<()> {
    if consume_marker(shared, &inputs.code) {
        tracing::debug!("suppressed duplicate evaluation of the initial code");
        return Ok(());
    }

    // A deferred settlement replaces the state whenever it lands, so the
    // previous unit must stop looking current before this cycle suspends.
    if inputs.no_inline {
        shared.publish_pending();
    }

    let transformed = match inputs.transform.apply(inputs.code.clone()).await {
        Ok(code) => code,
        Err(err) => {
            tracing::debug!(error = %err, "transform stage failed");
            shared.publish_error(err.to_string());
            return Ok(());
        }
    };

    let input = EvaluationInput {
        code: transformed,
        scope: inputs.scope,
        typed: inputs.typed,
    };
    dispatch(shared, evaluator, input, inputs.no_inline);
    Ok(())
}

fn dispatch<E: Evaluator>(
    shared: &Arc<Shared<E::Unit>>,
    evaluator: &Arc<E>,
    input: EvaluationInput<E::Value>,
    no_inline: bool,
) {
    if no_inline {
        evaluator.evaluate_deferred(input, settlement_for(shared));
    } else {
        match evaluator.evaluate(&input) {
            Ok(unit) => shared.publish_unit(unit),
            Err(err) => shared.publish_error(err.to_string()),
        }
    }
}

/// Settlement that publishes straight into the shared state, whenever the
/// executed code gets around to it. Last write wins; there is no check that
/// the settling cycle is still the latest issued.
fn settlement_for<U: Clone + Send + Sync + 'static>(shared: &Arc<Shared<U>>) -> Settlement<U> {
    let shared = shared.clone();
    Settlement::new(move |outcome| match outcome {
        Ok(unit) => shared.publish_unit(unit),
        Err(message) => shared.publish_error(Error::Evaluation(message).to_string()),
    })
}

/// One-shot duplicate check. True when this intake is the reactive wiring's
/// repeat of the already-completed initial cycle.
fn consume_marker<U: Clone>(shared: &Shared<U>, code: &str) -> bool {
    let mut marker = shared.marker();
    match &*marker {
        CacheMarker::Primed(primed) if primed == code => {
            *marker = CacheMarker::Consumed;
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use futures::FutureExt;
    use serde_json::json;
    use tokio::sync::Notify;

    /// Inline+deferred evaluator over plain strings. Code containing "boom"
    /// fails; anything else becomes `unit:<code>`.
    struct CountingEvaluator {
        calls: Arc<AtomicUsize>,
    }

    impl CountingEvaluator {
        fn new() -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    calls: calls.clone(),
                },
                calls,
            )
        }

        fn run(&self, input: &EvaluationInput<String>) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if input.code.contains("boom") {
                Err(Error::Evaluation("boom".to_string()))
            } else {
                Ok(format!("unit:{}", input.code))
            }
        }
    }

    impl Evaluator for CountingEvaluator {
        type Unit = String;
        type Value = String;

        fn evaluate(&self, input: &EvaluationInput<String>) -> Result<String> {
            self.run(input)
        }

        fn evaluate_deferred(
            &self,
            input: EvaluationInput<String>,
            settlement: Settlement<String>,
        ) {
            match self.run(&input) {
                Ok(unit) => settlement.resolve(unit),
                Err(err) => settlement.reject(err.to_string()),
            }
        }
    }

    fn options(code: &str) -> LiveOptions<String> {
        LiveOptions {
            code: code.to_string(),
            ..LiveOptions::default()
        }
    }

    async fn wait_for_calls(calls: &Arc<AtomicUsize>, expected: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while calls.load(Ordering::SeqCst) < expected {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("observer never ran the expected cycle");
    }

    #[tokio::test]
    async fn initial_code_is_evaluated_exactly_once() {
        let (evaluator, calls) = CountingEvaluator::new();
        let (_live, rx) = LiveCoordinator::start(evaluator, options("a")).await;

        // Initial cycle plus the mount pass; the mount pass is swallowed.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let snapshot = rx.borrow();
        assert_eq!(snapshot.unit.as_deref(), Some("unit:a"));
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn marker_consumption_is_one_shot() {
        let (evaluator, calls) = CountingEvaluator::new();
        let (live, rx) = LiveCoordinator::start(evaluator, options("a")).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        live.on_change("b").await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Resubmitting the initial code after the marker was consumed must
        // trigger a real evaluation, not another suppression.
        live.on_change("a").await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(rx.borrow().unit.as_deref(), Some("unit:a"));
    }

    #[tokio::test]
    async fn settlements_are_mutually_exclusive() {
        let (evaluator, _calls) = CountingEvaluator::new();
        let (live, rx) = LiveCoordinator::start(evaluator, options("a")).await;

        live.on_change("boom").await;
        {
            let snapshot = rx.borrow();
            assert!(snapshot.unit.is_none());
            assert_eq!(
                snapshot.error.as_deref(),
                Some("evaluation failed: boom")
            );
        }

        live.on_change("c").await;
        {
            let snapshot = rx.borrow();
            assert_eq!(snapshot.unit.as_deref(), Some("unit:c"));
            assert!(snapshot.error.is_none());
        }
    }

    #[tokio::test]
    async fn inline_outcome_lands_before_intake_returns() {
        let (evaluator, _calls) = CountingEvaluator::new();
        let (live, _rx) = LiveCoordinator::start(evaluator, options("a")).await;

        live.on_change("b").await;
        assert_eq!(live.snapshot().unit.as_deref(), Some("unit:b"));
    }

    /// Deferred evaluator that records whether the pending state was visible
    /// at the moment it was invoked, then settles synchronously.
    struct PendingProbe {
        rx: Mutex<Option<watch::Receiver<Snapshot<String>>>>,
        saw_pending: Arc<AtomicBool>,
    }

    impl Evaluator for PendingProbe {
        type Unit = String;
        type Value = String;

        fn evaluate(&self, _input: &EvaluationInput<String>) -> Result<String> {
            Ok("inline".to_string())
        }

        fn evaluate_deferred(
            &self,
            input: EvaluationInput<String>,
            settlement: Settlement<String>,
        ) {
            if let Some(rx) = self.rx.lock().unwrap().as_ref() {
                let snapshot = rx.borrow();
                self.saw_pending.store(
                    snapshot.unit.is_none() && snapshot.error.is_none(),
                    Ordering::SeqCst,
                );
            }
            settlement.resolve(format!("deferred:{}", input.code));
        }
    }

    #[tokio::test]
    async fn deferred_intake_clears_prior_unit_before_settlement() {
        let saw_pending = Arc::new(AtomicBool::new(false));
        // The probe needs a receiver, which only exists after start, so it is
        // injected through the Mutex inside the evaluator afterwards.
        let evaluator = PendingProbe {
            rx: Mutex::new(None),
            saw_pending: saw_pending.clone(),
        };
        let mut opts = options("first");
        opts.no_inline = true;
        let (live, rx) = LiveCoordinator::start(evaluator, opts).await;
        assert_eq!(rx.borrow().unit.as_deref(), Some("deferred:first"));

        // Arm the probe, then submit: even though the settlement arrives
        // synchronously, the unit must already be absent when the evaluator
        // is invoked.
        *live.evaluator.rx.lock().unwrap() = Some(live.subscribe());
        live.on_change("second").await;
        assert!(saw_pending.load(Ordering::SeqCst));
        assert_eq!(rx.borrow().unit.as_deref(), Some("deferred:second"));
    }

    #[tokio::test]
    async fn transform_failure_short_circuits_the_evaluator() {
        let (evaluator, calls) = CountingEvaluator::new();
        let mut opts = options("a");
        opts.transform = Some(TransformHook::from_fn(|_| {
            Err::<String, _>("bad preprocessor")
        }));
        let (live, rx) = LiveCoordinator::start(evaluator, opts).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            rx.borrow().error.as_deref(),
            Some("transform failed: bad preprocessor")
        );
        assert!(rx.borrow().unit.is_none());

        // Still short-circuits on explicit intake.
        live.on_change("b").await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_string_transform_result_is_reported_distinctly() {
        let (evaluator, calls) = CountingEvaluator::new();
        let mut opts = options("a");
        opts.skip_initial_render = true;
        opts.transform = Some(TransformHook::raw(|_code| {
            std::future::ready(Ok(json!(42))).boxed()
        }));
        let (_live, rx) = LiveCoordinator::start(evaluator, opts).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            rx.borrow().error.as_deref(),
            Some("transform produced a number instead of source text")
        );
    }

    #[tokio::test]
    async fn skip_initial_render_defers_to_the_mount_pass() {
        let (evaluator, calls) = CountingEvaluator::new();
        let mut opts = options("a");
        opts.skip_initial_render = true;
        let (_live, rx) = LiveCoordinator::start(evaluator, opts).await;

        // Still exactly one evaluation, performed by the wiring instead of
        // the initial cycle.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(rx.borrow().unit.as_deref(), Some("unit:a"));
    }

    #[tokio::test]
    async fn late_transform_settlement_overwrites_newer_state() {
        let (evaluator, _calls) = CountingEvaluator::new();
        let gate = Arc::new(Notify::new());
        let hook_gate = gate.clone();
        let mut opts = options("a");
        opts.transform = Some(TransformHook::from_async(move |code: String| {
            let gate = hook_gate.clone();
            async move {
                if code == "slow" {
                    gate.notified().await;
                    Ok::<_, String>("slow-out".to_string())
                } else {
                    Ok(code)
                }
            }
        }));
        let (live, rx) = LiveCoordinator::start(evaluator, opts).await;

        // A cycle stuck in its transform stage...
        let stuck = tokio::spawn({
            let live = live.clone();
            async move { live.on_change("slow").await }
        });

        // ...while two newer submissions settle.
        live.on_change("b").await;
        live.on_change("c").await;
        assert_eq!(rx.borrow().unit.as_deref(), Some("unit:c"));

        // The superseded cycle still publishes when it finally settles:
        // last write wins, with no cycle identity check.
        gate.notify_one();
        stuck.await.unwrap();
        assert_eq!(rx.borrow().unit.as_deref(), Some("unit:slow-out"));
    }

    #[tokio::test]
    async fn on_error_clears_the_current_unit() {
        let (evaluator, _calls) = CountingEvaluator::new();
        let (live, rx) = LiveCoordinator::start(evaluator, options("a")).await;
        assert!(rx.borrow().unit.is_some());

        live.on_error("editor lost the selection");
        let snapshot = rx.borrow();
        assert!(snapshot.unit.is_none());
        assert_eq!(snapshot.error.as_deref(), Some("editor lost the selection"));
    }

    #[tokio::test]
    async fn cycle_triggering_setters_reach_the_observer() {
        let (evaluator, calls) = CountingEvaluator::new();
        let (live, _rx) = LiveCoordinator::start(evaluator, options("a")).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        live.set_scope(HashMap::from([("x".to_string(), "1".to_string())]));
        wait_for_calls(&calls, 2).await;

        live.set_code("fresh");
        wait_for_calls(&calls, 3).await;
        assert_eq!(live.snapshot().code, "fresh");
        assert_eq!(live.snapshot().unit.as_deref(), Some("unit:fresh"));
    }

    #[tokio::test]
    async fn display_setters_never_trigger_a_cycle() {
        let (evaluator, calls) = CountingEvaluator::new();
        let (live, _rx) = LiveCoordinator::start(evaluator, options("a")).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        live.set_language("text");
        live.set_theme(Some(json!({ "plain": { "color": "#eee" } })));
        live.set_disabled(true);
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let snapshot = live.snapshot();
        assert_eq!(snapshot.language, "text");
        assert!(snapshot.disabled);
        assert_eq!(snapshot.unit.as_deref(), Some("unit:a"));
    }

    #[tokio::test]
    async fn on_change_does_not_move_the_canonical_code() {
        let (evaluator, _calls) = CountingEvaluator::new();
        let (live, _rx) = LiveCoordinator::start(evaluator, options("a")).await;

        live.on_change("edited text").await;
        let snapshot = live.snapshot();
        assert_eq!(snapshot.code, "a");
        assert_eq!(snapshot.unit.as_deref(), Some("unit:edited text"));
    }
}
