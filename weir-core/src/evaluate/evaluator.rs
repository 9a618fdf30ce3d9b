use super::*;

// ── StepContext ───────────────────────────────────────────────────────────────

/// Step-scoped mutable context an evaluation runs against: the committed
/// window state and pending timers for every key of the step.
///
/// Moved into a [`GroupByWindowEvaluator`] for the duration of a batch and
/// handed back, committed, in the [`TransformResult`]. Ownership is the
/// serialization mechanism: the surrounding engine must never run two
/// evaluations of the same step's context concurrently, and the move makes
/// that impossible within one process.
#[derive(Debug)]
pub struct StepContext<V> {
    pub state: CopyOnAccessStateStore<V>,
    pub timers: HashMap<Vec<u8>, TimerStore>,
}

impl<V> Default for StepContext<V> {
    fn default() -> Self {
        Self {
            state: CopyOnAccessStateStore::default(),
            timers: HashMap::new(),
        }
    }
}

impl<V> StepContext<V> {
    pub fn new() -> Self {
        Self::default()
    }
}

// ── GroupByWindowEvaluator ────────────────────────────────────────────────────

/// Evaluates one key-partitioned batch of windowed-grouping work.
///
/// Call protocol: construct with the step context and the step's current
/// input watermark, call [`process_work_item`](Self::process_work_item) once
/// per distinct key in the batch (a batch carries at most one work item per
/// key), then [`finish`](Self::finish) to commit every key's staged
/// mutations as one unit and collect the [`TransformResult`].
///
/// Any error while processing a key aborts the batch: dropping the
/// evaluator without finishing discards all staged state, so nothing of a
/// failed batch becomes visible. Retry is the caller's concern.
pub struct GroupByWindowEvaluator<K, V> {
    strategy: WindowingStrategy,
    step: StepContext<V>,
    input_watermark: EventTime,
    counters: StepCounters,
    bundles: Vec<OutputBundle<K, V>>,
    evaluated_keys: Vec<(K, Vec<u8>)>,
    unprocessed: Vec<KeyedWorkItem<K, V>>,
}

impl<K, V> GroupByWindowEvaluator<K, V>
where
    K: StreamData + fmt::Debug,
    V: StreamData,
{
    pub fn new(
        strategy: WindowingStrategy,
        step: StepContext<V>,
        input_watermark: EventTime,
    ) -> Self {
        Self {
            strategy,
            step,
            input_watermark,
            counters: StepCounters::new(),
            bundles: Vec::new(),
            evaluated_keys: Vec::new(),
            unprocessed: Vec::new(),
        }
    }

    /// This batch's counters (shared cells; observable mid-evaluation).
    pub fn counters(&self) -> &StepCounters {
        &self.counters
    }

    /// Evaluate all pending work for one key: admission filter, elements,
    /// fired timers, persist. Keys are independent; no ordering between keys
    /// is assumed.
    pub fn process_work_item(&mut self, item: KeyedWorkItem<K, V>) -> Result<()> {
        let KeyedWorkItem {
            key,
            elements,
            timers,
        } = item;
        let key_bytes = CopyOnAccessStateStore::<V>::key_bytes(&key)?;

        let admitted = drop_expired_windows(
            &key,
            elements,
            self.input_watermark,
            self.strategy.allowed_lateness_ms(),
            &self.counters.dropped_due_to_lateness,
        );

        let state = self.step.state.load(&key_bytes);
        let timer_store = self.step.timers.entry(key_bytes.clone()).or_default();
        let mut sink = BundleSink::new();

        let mut runner = WindowRunner::new(
            key.clone(),
            &self.strategy,
            self.input_watermark,
            state,
            timer_store,
            &mut sink,
            self.counters.dropped_due_to_closed_window.clone(),
            BufferingReduceFn,
        );
        runner.process_elements(admitted)?;
        for timer in timers {
            runner.on_timer(timer)?;
        }
        runner.persist(&mut self.step.state)?;

        self.bundles.push(sink.into_bundle());
        self.evaluated_keys.push((key, key_bytes));
        Ok(())
    }

    /// Commit all keys' staged mutations as one unit, compute the step's
    /// watermark hold, and assemble the result.
    pub fn finish(mut self) -> Result<TransformResult<K, V>> {
        self.step.state.commit();

        let mut timer_updates = Vec::new();
        for (key, key_bytes) in self.evaluated_keys {
            if let Some(store) = self.step.timers.get_mut(&key_bytes) {
                let update = store.commit();
                if !update.is_empty() {
                    timer_updates.push((key, update));
                }
            }
        }

        let watermark_hold = self.step.state.earliest_watermark_hold();
        tracing::debug!(
            "committed batch: {} bundle(s), {} key(s) with state, hold {:?}",
            self.bundles.len(),
            self.step.state.key_count(),
            watermark_hold
        );

        Ok(TransformResult {
            bundles: self.bundles,
            step: self.step,
            timer_updates,
            watermark_hold,
            counters: self.counters.snapshot(),
            unprocessed: self.unprocessed,
        })
    }
}

/// Evaluate one batch end to end: every work item, then commit.
pub fn evaluate<K, V>(
    strategy: WindowingStrategy,
    step: StepContext<V>,
    input_watermark: EventTime,
    work_items: Vec<KeyedWorkItem<K, V>>,
) -> Result<TransformResult<K, V>>
where
    K: StreamData + fmt::Debug,
    V: StreamData,
{
    let mut evaluator = GroupByWindowEvaluator::new(strategy, step, input_watermark);
    for item in work_items {
        evaluator.process_work_item(item)?;
    }
    evaluator.finish()
}
