use super::*;

// ── WindowState ───────────────────────────────────────────────────────────────

/// Buffered contents and trigger progress of one (key, window).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowState<V> {
    /// Buffered element multiset, in arrival order.
    pub buffer: Vec<TimestampedValue<V>>,
    pub trigger_state: TriggerState,
    /// Earliest buffered-but-unemitted timestamp. `None` means this window
    /// does not constrain watermark advancement.
    pub hold: Option<EventTime>,
    /// Index of the next pane to fire.
    pub pane_index: u64,
    /// Whether the on-time pane has fired.
    pub on_time_fired: bool,
}

impl<V> WindowState<V> {
    /// Fresh state for a window governed by the given trigger.
    pub fn new(trigger: &Trigger) -> Self {
        Self {
            buffer: Vec::new(),
            trigger_state: TriggerState::new(trigger),
            hold: None,
            pane_index: 0,
            on_time_fired: false,
        }
    }

    /// A closed window's trigger is finished: new elements are dropped until
    /// the window is garbage-collected.
    pub fn is_closed(&self) -> bool {
        self.trigger_state.is_finished()
    }
}

// ── PerKeyWindowState ─────────────────────────────────────────────────────────

/// All window state for one key. Exclusively owned by the evaluation
/// currently processing that key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerKeyWindowState<V> {
    pub windows: HashMap<TimeWindow, WindowState<V>>,
}

impl<V> Default for PerKeyWindowState<V> {
    fn default() -> Self {
        Self {
            windows: HashMap::new(),
        }
    }
}

impl<V> PerKeyWindowState<V> {
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Earliest hold across this key's windows, or `None` if nothing is held.
    pub fn earliest_hold(&self) -> Option<EventTime> {
        self.windows.values().filter_map(|state| state.hold).min()
    }
}

// ── StateDelta ────────────────────────────────────────────────────────────────

/// One staged mutation of a (key, window) slot, applied atomically at commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateDelta<V> {
    Put(TimeWindow, WindowState<V>),
    Remove(TimeWindow),
}

// ── CopyOnAccessStateStore ────────────────────────────────────────────────────

/// Per-key windowing state for one step, with copy-on-access isolation.
///
/// [`load`](Self::load) hands out a clone of the committed state; an
/// evaluation mutates its copy and stages the changes as [`StateDelta`]s,
/// which stay invisible to readers until [`commit`](Self::commit) applies
/// them all as one unit. Keys are bincode-encoded so the arena does not
/// depend on the key type.
#[derive(Debug)]
pub struct CopyOnAccessStateStore<V> {
    committed: HashMap<Vec<u8>, PerKeyWindowState<V>>,
    staged: Vec<(Vec<u8>, Vec<StateDelta<V>>)>,
}

impl<V> Default for CopyOnAccessStateStore<V> {
    fn default() -> Self {
        Self {
            committed: HashMap::new(),
            staged: Vec::new(),
        }
    }
}

impl<V: StreamData> CopyOnAccessStateStore<V> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode a key for the state arena.
    pub fn key_bytes<K: Serialize>(key: &K) -> Result<Vec<u8>> {
        Ok(bincode::serialize(key)?)
    }

    /// A clone of the committed state for `key` (empty if never committed).
    /// In-flight staged mutations are never visible here.
    pub fn load(&self, key_bytes: &[u8]) -> PerKeyWindowState<V> {
        self.committed.get(key_bytes).cloned().unwrap_or_default()
    }

    /// Stage mutations for `key`; invisible until [`commit`](Self::commit).
    pub fn stage_mutation(&mut self, key_bytes: Vec<u8>, deltas: Vec<StateDelta<V>>) {
        if !deltas.is_empty() {
            self.staged.push((key_bytes, deltas));
        }
    }

    /// Apply all staged mutations atomically, in staging order.
    pub fn commit(&mut self) {
        for (key_bytes, deltas) in self.staged.drain(..) {
            let state = self.committed.entry(key_bytes).or_default();
            for delta in deltas {
                match delta {
                    StateDelta::Put(window, window_state) => {
                        state.windows.insert(window, window_state);
                    }
                    StateDelta::Remove(window) => {
                        state.windows.remove(&window);
                    }
                }
            }
        }
        self.committed.retain(|_, state| !state.is_empty());
    }

    /// Discard staged mutations without applying them.
    pub fn discard_staged(&mut self) {
        self.staged.clear();
    }

    /// Earliest hold across all committed windows of all keys, or `None` if
    /// nothing buffered constrains watermark advancement.
    pub fn earliest_watermark_hold(&self) -> Option<EventTime> {
        self.committed
            .values()
            .filter_map(PerKeyWindowState::earliest_hold)
            .min()
    }

    /// Number of keys with committed window state.
    pub fn key_count(&self) -> usize {
        self.committed.len()
    }
}
