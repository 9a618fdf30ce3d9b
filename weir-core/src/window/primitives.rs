use super::*;

/// A half-open event-time window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: EventTime,
    pub end: EventTime,
}

impl TimeWindow {
    pub fn new(start: EventTime, end: EventTime) -> Self {
        Self { start, end }
    }

    /// The latest event-time instant considered inside this window.
    /// A window is complete once the watermark reaches this instant.
    pub fn max_timestamp(&self) -> EventTime {
        self.end
    }

    /// The instant past which data for this window no longer matters and its
    /// state may be reclaimed. Saturates, so all-time windows are never
    /// collected.
    pub fn gc_time(&self, allowed_lateness_ms: i64) -> EventTime {
        self.max_timestamp().saturating_add(allowed_lateness_ms)
    }

    /// Return true if `timestamp` falls inside this window.
    pub fn contains(&self, timestamp: EventTime) -> bool {
        timestamp >= self.start && timestamp < self.end
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TimeWindow([{}, {}))", self.start, self.end)
    }
}
