use super::*;

/// Assigns one or more [`TimeWindow`]s to a timestamp.
///
/// Window assignment happens in the key-partitioning stage upstream of the
/// evaluator; by the time elements reach a [`crate::types::KeyedWorkItem`]
/// they already carry their window memberships.
pub trait WindowAssigner: Send + Sync {
    /// Return the windows that contain the given timestamp.
    fn assign_windows(&self, timestamp: EventTime) -> Vec<TimeWindow>;
}

// ── Tumbling ──────────────────────────────────────────────────────────────────

/// Fixed-size, non-overlapping windows aligned to multiples of `size`.
#[derive(Clone)]
pub struct TumblingWindows {
    size_ms: i64,
    offset_ms: i64,
}

impl TumblingWindows {
    /// Create tumbling windows of the given `size`.
    pub fn of(size: Duration) -> Self {
        Self {
            size_ms: size.as_millis() as i64,
            offset_ms: 0,
        }
    }

    /// Create tumbling windows with a non-zero alignment `offset`.
    pub fn of_with_offset(size: Duration, offset: Duration) -> Self {
        Self {
            size_ms: size.as_millis() as i64,
            offset_ms: offset.as_millis() as i64,
        }
    }
}

impl WindowAssigner for TumblingWindows {
    fn assign_windows(&self, timestamp: EventTime) -> Vec<TimeWindow> {
        let start = timestamp - (timestamp - self.offset_ms).rem_euclid(self.size_ms);
        vec![TimeWindow::new(start, start + self.size_ms)]
    }
}

// ── Sliding ───────────────────────────────────────────────────────────────────

/// Fixed-size, possibly overlapping windows.
/// A timestamp belongs to `ceil(size / slide)` windows.
#[derive(Clone)]
pub struct SlidingWindows {
    size_ms: i64,
    slide_ms: i64,
    offset_ms: i64,
}

impl SlidingWindows {
    /// Create sliding windows of the given `size` advancing every `slide`.
    pub fn of(size: Duration, slide: Duration) -> Self {
        Self {
            size_ms: size.as_millis() as i64,
            slide_ms: slide.as_millis() as i64,
            offset_ms: 0,
        }
    }
}

impl WindowAssigner for SlidingWindows {
    fn assign_windows(&self, timestamp: EventTime) -> Vec<TimeWindow> {
        // Walk back from the last covering start by slide until no window covers ts.
        let last_start = timestamp - (timestamp - self.offset_ms).rem_euclid(self.slide_ms);
        let mut windows = Vec::new();
        let mut start = last_start;
        while start > timestamp - self.size_ms {
            windows.push(TimeWindow::new(start, start + self.size_ms));
            start -= self.slide_ms;
        }
        windows
    }
}

// ── Global ────────────────────────────────────────────────────────────────────

/// A single window spanning all time. Useful with count-based triggers.
#[derive(Clone, Copy)]
pub struct GlobalWindows;

impl GlobalWindows {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GlobalWindows {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowAssigner for GlobalWindows {
    fn assign_windows(&self, _timestamp: EventTime) -> Vec<TimeWindow> {
        vec![TimeWindow::new(EVENT_TIME_MIN, EVENT_TIME_MAX)]
    }
}
