use super::*;

// ── WindowRunner ──────────────────────────────────────────────────────────────

/// Per-key windowed grouping and trigger engine, buffering variant.
///
/// Constructed per (key, evaluation) over a copy-on-access snapshot of the
/// key's window state. Buffers admitted elements into their windows, drives
/// each window's trigger state machine, emits grouped panes through the
/// write-only sink, and schedules the end-of-window and garbage-collection
/// timers that keep windows moving without new input.
///
/// Call protocol, enforced by ownership: all of the key's admitted elements
/// through [`process_elements`](Self::process_elements), then each fired
/// timer through [`on_timer`](Self::on_timer), then
/// [`persist`](Self::persist) exactly once, which consumes the runner and
/// stages every touched window into the state store.
pub struct WindowRunner<'a, K, V, R> {
    key: K,
    strategy: &'a WindowingStrategy,
    input_watermark: EventTime,
    state: PerKeyWindowState<V>,
    timers: &'a mut TimerStore,
    sink: &'a mut dyn WindowingContext<K, V>,
    dropped_due_to_closed_window: Counter,
    reduce_fn: R,
    /// Windows mutated this evaluation, staged as puts at persist.
    touched: BTreeSet<TimeWindow>,
    /// Windows garbage-collected this evaluation, staged as removes.
    removed: BTreeSet<TimeWindow>,
}

impl<'a, K, V, R> WindowRunner<'a, K, V, R>
where
    K: StreamData + fmt::Debug,
    V: StreamData,
    R: ReduceFn<V>,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        key: K,
        strategy: &'a WindowingStrategy,
        input_watermark: EventTime,
        state: PerKeyWindowState<V>,
        timers: &'a mut TimerStore,
        sink: &'a mut dyn WindowingContext<K, V>,
        dropped_due_to_closed_window: Counter,
        reduce_fn: R,
    ) -> Self {
        Self {
            key,
            strategy,
            input_watermark,
            state,
            timers,
            sink,
            dropped_due_to_closed_window,
            reduce_fn,
            touched: BTreeSet::new(),
            removed: BTreeSet::new(),
        }
    }

    /// Buffer each admitted element into its window(s), advancing the
    /// per-window trigger machine as it goes.
    pub fn process_elements(&mut self, admitted: Vec<WindowedValue<V>>) -> Result<()> {
        for element in admitted {
            for window in element.windows.clone() {
                self.process_value(window, element.value.clone(), element.timestamp)?;
            }
        }
        Ok(())
    }

    fn process_value(&mut self, window: TimeWindow, value: V, timestamp: EventTime) -> Result<()> {
        let state = self
            .state
            .windows
            .entry(window)
            .or_insert_with(|| WindowState::new(&self.strategy.trigger));

        if state.is_closed() {
            // The trigger already finished for this window; the element is
            // too late to join any pane.
            self.dropped_due_to_closed_window.inc();
            tracing::debug!(
                "dropping element at {} for key {:?}: {} is closed",
                timestamp,
                self.key,
                window
            );
            return Ok(());
        }

        self.reduce_fn.add_input(&mut state.buffer, value, timestamp);
        state.hold = Some(state.hold.map_or(timestamp, |hold| hold.min(timestamp)));
        let result = self.strategy.trigger.advance(
            &mut state.trigger_state,
            TriggerEvent::Element(timestamp),
            &window,
        );

        self.touched.insert(window);
        self.timers
            .add(TimerData::event_time(window, window.max_timestamp()));
        let gc_time = window.gc_time(self.strategy.allowed_lateness_ms());
        if gc_time > window.max_timestamp() {
            self.timers.add(TimerData::event_time(window, gc_time));
        }

        self.apply_trigger_result(window, result)
    }

    /// Replay one fired timer through the window's trigger machine.
    ///
    /// A timer for a window whose state is already garbage-collected is
    /// counted and ignored; replaying it again is equally a no-op.
    pub fn on_timer(&mut self, timer: TimerData) -> Result<()> {
        let window = timer.window;
        if !self.state.windows.contains_key(&window) {
            self.dropped_due_to_closed_window.inc();
            tracing::debug!(
                "ignoring timer at {} for key {:?}: {} already garbage-collected",
                timer.timestamp,
                self.key,
                window
            );
            return Ok(());
        }

        if timer.domain == TimeDomain::EventTime
            && timer.timestamp >= window.gc_time(self.strategy.allowed_lateness_ms())
        {
            return self.garbage_collect(window);
        }

        let event = match timer.domain {
            TimeDomain::EventTime => TriggerEvent::WatermarkAdvanced(timer.timestamp),
            TimeDomain::ProcessingTime => TriggerEvent::ProcessingTime(timer.timestamp),
        };
        let result = match self.state.windows.get_mut(&window) {
            Some(state) => self
                .strategy
                .trigger
                .advance(&mut state.trigger_state, event, &window),
            None => TriggerResult::Continue,
        };
        self.apply_trigger_result(window, result)
    }

    /// Flush every mutation of this evaluation into the state store as staged
    /// deltas, visible to readers only after the store commits.
    pub fn persist(self, store: &mut CopyOnAccessStateStore<V>) -> Result<()> {
        let key_bytes = CopyOnAccessStateStore::<V>::key_bytes(&self.key)?;
        let mut deltas: Vec<StateDelta<V>> = Vec::new();
        for window in &self.removed {
            deltas.push(StateDelta::Remove(*window));
        }
        for window in &self.touched {
            if let Some(state) = self.state.windows.get(window) {
                deltas.push(StateDelta::Put(*window, state.clone()));
            }
        }
        store.stage_mutation(key_bytes, deltas);
        Ok(())
    }

    fn apply_trigger_result(&mut self, window: TimeWindow, result: TriggerResult) -> Result<()> {
        if result.is_fire() {
            self.fire_pane(window, result.is_finish())?;
        }
        if result.is_finish() {
            // The trigger machine marked itself finished; the window stays
            // closed until its garbage-collection timer reclaims it.
            self.touched.insert(window);
        }
        Ok(())
    }

    /// Emit one pane of the window's buffered contents. Empty panes are
    /// suppressed.
    fn fire_pane(&mut self, window: TimeWindow, is_last: bool) -> Result<()> {
        let key = self.key.clone();
        let discarding = self.strategy.accumulation_mode == AccumulationMode::Discarding;
        let (values, timestamp, pane) = {
            let state = self
                .state
                .windows
                .get_mut(&window)
                .ok_or_else(|| anyhow!("fired window {window} has no state"))?;
            if state.buffer.is_empty() {
                return Ok(());
            }
            let values = self.reduce_fn.extract_output(&state.buffer);
            let timing = if self.input_watermark < window.max_timestamp() {
                PaneTiming::Early
            } else if !state.on_time_fired {
                PaneTiming::OnTime
            } else {
                PaneTiming::Late
            };
            let pane = PaneInfo::new(state.pane_index, is_last, timing);
            let timestamp = state.hold.unwrap_or_else(|| window.max_timestamp());
            state.pane_index += 1;
            if timing == PaneTiming::OnTime {
                state.on_time_fired = true;
            }
            state.hold = None;
            if discarding {
                state.buffer.clear();
            }
            (values, timestamp, pane)
        };
        self.touched.insert(window);
        self.sink.emit((key, values), timestamp, vec![window], pane);
        Ok(())
    }

    /// Retire a window: emit a final pane if unfired data remains, otherwise
    /// count the empty close; then drop its state and reclaim its timers.
    fn garbage_collect(&mut self, window: TimeWindow) -> Result<()> {
        let has_unfired = self
            .state
            .windows
            .get(&window)
            .is_some_and(|state| state.hold.is_some());
        if has_unfired {
            self.fire_pane(window, true)?;
        } else {
            self.dropped_due_to_closed_window.inc();
        }

        self.state.windows.remove(&window);
        self.touched.remove(&window);
        self.removed.insert(window);

        // No-ops if these were already delivered.
        self.timers
            .cancel(&TimerData::event_time(window, window.max_timestamp()));
        let gc_time = window.gc_time(self.strategy.allowed_lateness_ms());
        self.timers.cancel(&TimerData::event_time(window, gc_time));
        Ok(())
    }
}
