use super::*;

// ── OutputBundle ──────────────────────────────────────────────────────────────

/// One key's uncommitted output: grouped panes appended during evaluation and
/// handed downstream at commit.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputBundle<K, V> {
    pub outputs: Vec<WindowedValue<(K, Vec<V>)>>,
}

impl<K, V> Default for OutputBundle<K, V> {
    fn default() -> Self {
        Self {
            outputs: Vec::new(),
        }
    }
}

impl<K, V> OutputBundle<K, V> {
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

// ── WindowingContext ──────────────────────────────────────────────────────────

/// The channel a grouping engine emits panes through, plus the ambient
/// accessors it must not use.
///
/// Context flows evaluator → engine, never the reverse: the engine works
/// exclusively with the state, timers, windows, and panes handed to it at
/// construction and through `process_elements`/`on_timer`. The ambient
/// accessors exist so a misbehaving engine fails loudly instead of silently
/// coupling to state it does not own.
pub trait WindowingContext<K, V> {
    /// Append one grouped pane to the key's output bundle.
    fn emit(
        &mut self,
        output: (K, Vec<V>),
        timestamp: EventTime,
        windows: Vec<TimeWindow>,
        pane: PaneInfo,
    );

    /// Ambient per-key window state. Usage fault on [`BundleSink`].
    fn state(&self) -> Result<&PerKeyWindowState<V>>;

    /// Ambient timer store. Usage fault on [`BundleSink`].
    fn timers(&self) -> Result<&TimerStore>;

    /// Ambient active-window set. Usage fault on [`BundleSink`].
    fn active_windows(&self) -> Result<Vec<TimeWindow>>;

    /// Ambient current pane. Usage fault on [`BundleSink`].
    fn current_pane(&self) -> Result<PaneInfo>;
}

// ── BundleSink ────────────────────────────────────────────────────────────────

/// Write-only adapter: appends panes to a bundle and rejects every ambient
/// read as a programming error in the caller.
#[derive(Debug)]
pub struct BundleSink<K, V> {
    bundle: OutputBundle<K, V>,
}

impl<K, V> BundleSink<K, V> {
    pub fn new() -> Self {
        Self {
            bundle: OutputBundle::default(),
        }
    }

    pub fn into_bundle(self) -> OutputBundle<K, V> {
        self.bundle
    }
}

impl<K, V> Default for BundleSink<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> WindowingContext<K, V> for BundleSink<K, V> {
    fn emit(
        &mut self,
        output: (K, Vec<V>),
        timestamp: EventTime,
        windows: Vec<TimeWindow>,
        pane: PaneInfo,
    ) {
        self.bundle.outputs.push(WindowedValue {
            value: output,
            timestamp,
            windows,
            pane,
        });
    }

    fn state(&self) -> Result<&PerKeyWindowState<V>> {
        Err(anyhow!(
            "the grouping engine must use the window state it was constructed with, \
             not read it back through its output sink"
        ))
    }

    fn timers(&self) -> Result<&TimerStore> {
        Err(anyhow!(
            "the grouping engine must use the timer store it was constructed with, \
             not read it back through its output sink"
        ))
    }

    fn active_windows(&self) -> Result<Vec<TimeWindow>> {
        Err(anyhow!(
            "inspect the windows of the input elements; the output sink does not \
             expose the active-window set"
        ))
    }

    fn current_pane(&self) -> Result<PaneInfo> {
        Err(anyhow!(
            "inspect the pane of the input elements; the output sink does not \
             expose a current pane"
        ))
    }
}
