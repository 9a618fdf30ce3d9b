use super::*;

// ── AccumulationMode ──────────────────────────────────────────────────────────

/// How a fired pane relates to earlier panes of the same window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccumulationMode {
    /// Each pane contains only the elements buffered since the previous firing.
    #[default]
    Discarding,
    /// Each pane contains every element buffered so far.
    Accumulating,
}

// ── WindowingStrategy ─────────────────────────────────────────────────────────

/// Immutable per-collection windowing configuration, supplied by the
/// surrounding pipeline and read-only to the evaluator and engine.
///
/// The window-assignment rule itself is not part of the strategy here:
/// elements reach the evaluator already carrying their window memberships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowingStrategy {
    pub trigger: Trigger,
    pub accumulation_mode: AccumulationMode,
    allowed_lateness_ms: i64,
}

impl WindowingStrategy {
    /// Default strategy: fire on time, no lateness grace, discard fired panes.
    pub fn new() -> Self {
        Self {
            trigger: Trigger::default(),
            accumulation_mode: AccumulationMode::default(),
            allowed_lateness_ms: 0,
        }
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    /// Grace duration past a window's close during which data is still
    /// admitted rather than dropped.
    pub fn with_allowed_lateness(mut self, lateness: Duration) -> Self {
        self.allowed_lateness_ms = lateness.as_millis() as i64;
        self
    }

    pub fn with_accumulation_mode(mut self, mode: AccumulationMode) -> Self {
        self.accumulation_mode = mode;
        self
    }

    pub fn allowed_lateness_ms(&self) -> i64 {
        self.allowed_lateness_ms
    }
}

impl Default for WindowingStrategy {
    fn default() -> Self {
        Self::new()
    }
}
