use super::*;

// ── TimerData ─────────────────────────────────────────────────────────────────

/// Which clock a timer fires against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeDomain {
    /// Fires when the event-time watermark passes the timer's timestamp.
    EventTime,
    /// Fires when wall-clock processing time passes the timer's timestamp.
    ProcessingTime,
}

/// A scheduled wake-up for one window of a key.
///
/// Key scoping lives in the per-key [`TimerStore`]; a timer is identified by
/// its (window, timestamp, domain) within that store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerData {
    pub window: TimeWindow,
    pub timestamp: EventTime,
    pub domain: TimeDomain,
}

impl TimerData {
    pub fn event_time(window: TimeWindow, timestamp: EventTime) -> Self {
        Self {
            window,
            timestamp,
            domain: TimeDomain::EventTime,
        }
    }

    pub fn processing_time(window: TimeWindow, timestamp: EventTime) -> Self {
        Self {
            window,
            timestamp,
            domain: TimeDomain::ProcessingTime,
        }
    }
}

// ── TimerUpdate ───────────────────────────────────────────────────────────────

/// Timer additions and cancellations accumulated since the last commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimerUpdate {
    pub set: Vec<TimerData>,
    pub cancelled: Vec<TimerData>,
}

impl TimerUpdate {
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.cancelled.is_empty()
    }
}

// ── TimerStore ────────────────────────────────────────────────────────────────

/// Pending future wake-ups for a single key.
///
/// Timers are sorted by fire time in a `BTreeMap`, enabling O(log n) range
/// scans when draining due timers. Additions and cancellations are also
/// staged as a delta so the surrounding engine can observe what changed at
/// commit.
///
/// # Invariant
/// A (window, timestamp, domain) triple is registered at most once;
/// re-registering is idempotent and stages nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimerStore {
    /// Sorted map: fire time -> timers registered at that time.
    timers: BTreeMap<EventTime, BTreeSet<TimerData>>,
    staged_set: Vec<TimerData>,
    staged_cancel: Vec<TimerData>,
}

impl TimerStore {
    /// Create an empty `TimerStore`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a timer. Re-registering a pending timer is idempotent.
    pub fn add(&mut self, timer: TimerData) {
        if self.timers.entry(timer.timestamp).or_default().insert(timer) {
            self.staged_set.push(timer);
        }
    }

    /// Cancel a timer. No-op if it is not pending.
    pub fn cancel(&mut self, timer: &TimerData) {
        if let Some(at) = self.timers.get_mut(&timer.timestamp) {
            if at.remove(timer) {
                if at.is_empty() {
                    self.timers.remove(&timer.timestamp);
                }
                self.staged_cancel.push(*timer);
            }
        }
    }

    /// Drain and return all timers of `domain` with `timestamp <= up_to`, in
    /// ascending fire-time order. Drained timers are delivered, not
    /// cancelled: they leave the pending set without staging a cancellation.
    pub fn drain_due(&mut self, up_to: EventTime, domain: TimeDomain) -> Vec<TimerData> {
        let due_times: Vec<EventTime> = self.timers.range(..=up_to).map(|(ts, _)| *ts).collect();

        let mut fired = Vec::new();
        for fire_at in due_times {
            if let Some(at) = self.timers.remove(&fire_at) {
                let (due, kept): (Vec<TimerData>, Vec<TimerData>) =
                    at.into_iter().partition(|timer| timer.domain == domain);
                fired.extend(due);
                if !kept.is_empty() {
                    self.timers.insert(fire_at, kept.into_iter().collect());
                }
            }
        }
        fired
    }

    /// The additions and cancellations staged since the last commit.
    pub fn delta(&self) -> TimerUpdate {
        TimerUpdate {
            set: self.staged_set.clone(),
            cancelled: self.staged_cancel.clone(),
        }
    }

    /// Take the staged delta, leaving the store clean for the next evaluation.
    pub fn commit(&mut self) -> TimerUpdate {
        TimerUpdate {
            set: std::mem::take(&mut self.staged_set),
            cancelled: std::mem::take(&mut self.staged_cancel),
        }
    }

    /// Return the fire time of the earliest pending timer, or `None`.
    pub fn next_timer(&self) -> Option<EventTime> {
        self.timers.keys().next().copied()
    }

    /// Return the total count of pending timers.
    pub fn len(&self) -> usize {
        self.timers.values().map(|at| at.len()).sum()
    }

    /// Return `true` if no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
