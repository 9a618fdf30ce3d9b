use super::*;

// ── ReduceFn ──────────────────────────────────────────────────────────────────

/// How values accumulate inside a window and how a firing pane's grouped
/// output is produced from the accumulated buffer.
pub trait ReduceFn<V>: Send {
    /// Fold one admitted value into the window's buffer.
    fn add_input(&self, buffer: &mut Vec<TimestampedValue<V>>, value: V, timestamp: EventTime);

    /// Produce the grouped output for a firing pane.
    fn extract_output(&self, buffer: &[TimestampedValue<V>]) -> Vec<V>;
}

/// The grouping reduce fn: retain all values, unordered, no combine.
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferingReduceFn;

impl<V: Clone + Send> ReduceFn<V> for BufferingReduceFn {
    fn add_input(&self, buffer: &mut Vec<TimestampedValue<V>>, value: V, timestamp: EventTime) {
        buffer.push(TimestampedValue { timestamp, value });
    }

    fn extract_output(&self, buffer: &[TimestampedValue<V>]) -> Vec<V> {
        buffer.iter().map(|entry| entry.value.clone()).collect()
    }
}
