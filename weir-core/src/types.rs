use serde::{Deserialize, Serialize};

use crate::time::TimerData;
use crate::window::TimeWindow;

/// Event time in milliseconds since epoch.
pub type EventTime = i64;

/// Trait bound for values and keys that flow through a grouping step.
pub trait StreamData: Send + Clone + Serialize + for<'de> Deserialize<'de> + 'static {}

// Blanket implementation: any type satisfying the bounds is StreamData.
impl<T> StreamData for T where T: Send + Clone + Serialize + for<'de> Deserialize<'de> + 'static {}

/// When a pane fired relative to the watermark passing its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaneTiming {
    /// Fired before the watermark reached the window's max timestamp.
    Early,
    /// The single firing at or after the watermark reached the window's
    /// max timestamp.
    OnTime,
    /// Fired after the on-time pane.
    Late,
    /// Not a firing: the pane metadata carried by un-grouped input elements.
    Unknown,
}

/// Metadata describing one firing of a window's accumulated contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneInfo {
    /// 0-based firing index within the window.
    pub index: u64,
    pub is_first: bool,
    pub is_last: bool,
    pub timing: PaneTiming,
}

impl PaneInfo {
    pub fn new(index: u64, is_last: bool, timing: PaneTiming) -> Self {
        Self {
            index,
            is_first: index == 0,
            is_last,
            timing,
        }
    }
}

impl Default for PaneInfo {
    /// The pane carried by input elements that have not been grouped yet.
    fn default() -> Self {
        Self::new(0, false, PaneTiming::Unknown)
    }
}

/// A value paired with its event timestamp and current window memberships.
///
/// A `WindowedValue` in more than one window is a compact encoding of one
/// independent per-window copy; [`explode_windows`](Self::explode_windows)
/// expands it. `windows` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowedValue<V> {
    pub value: V,
    pub timestamp: EventTime,
    pub windows: Vec<TimeWindow>,
    pub pane: PaneInfo,
}

impl<V> WindowedValue<V> {
    /// A value in a single window with default (un-fired) pane metadata.
    pub fn new(value: V, timestamp: EventTime, window: TimeWindow) -> Self {
        Self {
            value,
            timestamp,
            windows: vec![window],
            pane: PaneInfo::default(),
        }
    }

    /// A value in one or more windows. `windows` must be non-empty.
    pub fn in_windows(value: V, timestamp: EventTime, windows: Vec<TimeWindow>) -> Self {
        debug_assert!(!windows.is_empty(), "WindowedValue requires at least one window");
        Self {
            value,
            timestamp,
            windows,
            pane: PaneInfo::default(),
        }
    }
}

impl<V: Clone> WindowedValue<V> {
    /// Expand into one copy per window membership, each carrying exactly one
    /// window and the original value, timestamp, and pane.
    pub fn explode_windows(&self) -> Vec<WindowedValue<V>> {
        self.windows
            .iter()
            .map(|window| WindowedValue {
                value: self.value.clone(),
                timestamp: self.timestamp,
                windows: vec![*window],
                pane: self.pane,
            })
            .collect()
    }
}

/// One timestamped value buffered inside a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampedValue<V> {
    pub timestamp: EventTime,
    pub value: V,
}

/// The unit of input to the evaluator: everything one key has pending in this
/// batch — newly arrived elements plus timers that have fired for it.
///
/// Consumed exactly once per evaluation. Elements are replayed in order;
/// timers are replayed after all elements, in the order given here. No finer
/// ordering between a key's timers is guaranteed by the upstream partitioner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedWorkItem<K, V> {
    pub key: K,
    pub elements: Vec<WindowedValue<V>>,
    pub timers: Vec<TimerData>,
}

impl<K, V> KeyedWorkItem<K, V> {
    pub fn new(key: K) -> Self {
        Self {
            key,
            elements: Vec::new(),
            timers: Vec::new(),
        }
    }

    pub fn with_elements(key: K, elements: Vec<WindowedValue<V>>) -> Self {
        Self {
            key,
            elements,
            timers: Vec::new(),
        }
    }

    pub fn with_timers(key: K, timers: Vec<TimerData>) -> Self {
        Self {
            key,
            elements: Vec::new(),
            timers,
        }
    }
}
