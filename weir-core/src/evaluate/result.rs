use super::*;

/// Everything one batch evaluation produced. Assembled once at
/// [`GroupByWindowEvaluator::finish`] and immutable afterwards; consumed by
/// the surrounding engine for commit and watermark propagation.
#[derive(Debug)]
pub struct TransformResult<K, V> {
    /// One output bundle per evaluated work item.
    pub bundles: Vec<OutputBundle<K, V>>,
    /// The committed step context, handed back for the next evaluation.
    pub step: StepContext<V>,
    /// Per-key timer additions and cancellations staged by this batch.
    pub timer_updates: Vec<(K, TimerUpdate)>,
    /// Earliest hold across all buffered windows of all keys. `None` does not
    /// constrain watermark advancement.
    pub watermark_hold: Option<EventTime>,
    /// This batch's dropped-data counter values.
    pub counters: CounterDeltas,
    /// Elements deferred for a later evaluation. Reserved for retry
    /// semantics; the evaluator never defers anything.
    pub unprocessed: Vec<KeyedWorkItem<K, V>>,
}

impl<K, V> TransformResult<K, V> {
    /// Total grouped panes emitted across all bundles.
    pub fn output_count(&self) -> usize {
        self.bundles.iter().map(OutputBundle::len).sum()
    }
}
