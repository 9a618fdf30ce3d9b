use super::*;

// ── TriggerResult ─────────────────────────────────────────────────────────────

/// The decision a trigger returns after observing one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerResult {
    /// Keep buffering; do not emit a pane.
    Continue,
    /// Emit the window's current contents as a pane; the trigger stays armed.
    Fire,
    /// Emit a pane and finish: the window is closed to further input until it
    /// is garbage-collected.
    FireAndFinish,
}

impl TriggerResult {
    /// Return true if a pane should be emitted.
    pub fn is_fire(self) -> bool {
        matches!(self, TriggerResult::Fire | TriggerResult::FireAndFinish)
    }

    /// Return true if the trigger is done firing for this window.
    pub fn is_finish(self) -> bool {
        matches!(self, TriggerResult::FireAndFinish)
    }
}

// ── Trigger ───────────────────────────────────────────────────────────────────

/// One observation fed to a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    /// An element with the given timestamp was buffered into the window.
    Element(EventTime),
    /// The event-time watermark advanced to the given instant.
    WatermarkAdvanced(EventTime),
    /// Processing time advanced to the given instant.
    ProcessingTime(EventTime),
}

/// The policy deciding when a window's buffered contents become a pane.
///
/// A closed variant set evaluated by exhaustive match; composition happens
/// through the variants themselves rather than trait objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    /// Fire once when the watermark reaches the window's max timestamp.
    AfterWatermark,
    /// Fire once the window has buffered at least this many elements since
    /// the last firing.
    AfterCount(u64),
    /// Re-arm the inner trigger every time it fires. Never finishes.
    Repeatedly(Box<Trigger>),
    /// Fire when any child fires; finish when the firing child finishes.
    AnyOf(Vec<Trigger>),
    /// Fire once every child has fired at least once, then finish.
    AllOf(Vec<Trigger>),
}

impl Default for Trigger {
    fn default() -> Self {
        Trigger::AfterWatermark
    }
}

/// Per-window progress of a [`Trigger`]. The tree of children mirrors the
/// trigger definition it was created from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerState {
    elements_seen: u64,
    finished: bool,
    children: Vec<TriggerState>,
}

impl TriggerState {
    /// Fresh state for one window of the given trigger.
    pub fn new(trigger: &Trigger) -> Self {
        let children = match trigger {
            Trigger::Repeatedly(inner) => vec![TriggerState::new(inner)],
            Trigger::AnyOf(branches) | Trigger::AllOf(branches) => {
                branches.iter().map(TriggerState::new).collect()
            }
            Trigger::AfterWatermark | Trigger::AfterCount(_) => Vec::new(),
        };
        Self {
            elements_seen: 0,
            finished: false,
            children,
        }
    }

    /// A finished trigger has closed its window: no further panes will fire.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Trigger {
    /// Advance the per-window state machine by one observation.
    ///
    /// A finished state never fires again and ignores further events.
    pub fn advance(
        &self,
        state: &mut TriggerState,
        event: TriggerEvent,
        window: &TimeWindow,
    ) -> TriggerResult {
        if state.finished {
            return TriggerResult::Continue;
        }
        let result = match self {
            Trigger::AfterWatermark => match event {
                TriggerEvent::WatermarkAdvanced(watermark)
                    if watermark >= window.max_timestamp() =>
                {
                    TriggerResult::FireAndFinish
                }
                _ => TriggerResult::Continue,
            },

            Trigger::AfterCount(threshold) => match event {
                TriggerEvent::Element(_) => {
                    state.elements_seen += 1;
                    if state.elements_seen >= *threshold {
                        TriggerResult::FireAndFinish
                    } else {
                        TriggerResult::Continue
                    }
                }
                _ => TriggerResult::Continue,
            },

            Trigger::Repeatedly(inner) => {
                let child = &mut state.children[0];
                if inner.advance(child, event, window).is_fire() {
                    // Re-arm for the next firing.
                    *child = TriggerState::new(inner);
                    TriggerResult::Fire
                } else {
                    TriggerResult::Continue
                }
            }

            Trigger::AnyOf(branches) => {
                let mut fired = false;
                let mut finished = false;
                for (branch, child) in branches.iter().zip(state.children.iter_mut()) {
                    let result = branch.advance(child, event, window);
                    fired |= result.is_fire();
                    finished |= result.is_finish();
                }
                if finished {
                    TriggerResult::FireAndFinish
                } else if fired {
                    TriggerResult::Fire
                } else {
                    TriggerResult::Continue
                }
            }

            Trigger::AllOf(branches) => {
                for (branch, child) in branches.iter().zip(state.children.iter_mut()) {
                    if child.finished {
                        continue;
                    }
                    if branch.advance(child, event, window).is_fire() {
                        child.finished = true;
                    }
                }
                if state.children.iter().all(|child| child.finished) {
                    TriggerResult::FireAndFinish
                } else {
                    TriggerResult::Continue
                }
            }
        };
        if result.is_finish() {
            state.finished = true;
        }
        result
    }
}
