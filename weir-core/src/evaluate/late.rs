use super::*;

/// Admission filter: explode each element into one copy per window
/// membership and drop the copies whose window is past its
/// garbage-collection horizon.
///
/// A copy is dropped iff `window.max_timestamp() + allowed_lateness` is
/// strictly before `input_watermark`; equality admits. Survivors keep their
/// relative order. Runs once per key per evaluation, before any state
/// mutation, so a late element never perturbs trigger or buffer state.
pub fn drop_expired_windows<K: fmt::Debug, V: Clone>(
    key: &K,
    elements: Vec<WindowedValue<V>>,
    input_watermark: EventTime,
    allowed_lateness_ms: i64,
    dropped_due_to_lateness: &Counter,
) -> Vec<WindowedValue<V>> {
    let mut admitted = Vec::new();
    for element in elements {
        for copy in element.explode_windows() {
            // Exploded copies carry exactly one window.
            let window = copy.windows[0];
            if window.gc_time(allowed_lateness_ms) < input_watermark {
                // The element is too late for this window.
                dropped_due_to_lateness.inc();
                tracing::debug!(
                    "dropping element at {} for key {:?} in {}: too far behind input watermark {}",
                    copy.timestamp,
                    key,
                    window,
                    input_watermark
                );
            } else {
                admitted.push(copy);
            }
        }
    }
    admitted
}
