//! The windowed-grouping evaluator: late-data admission, the per-key
//! grouping/trigger engine, write-only output bundles, and batch commit with
//! watermark-hold computation.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use anyhow::{anyhow, Result};

use crate::metrics::{Counter, CounterDeltas, StepCounters};
use crate::state::{CopyOnAccessStateStore, PerKeyWindowState, StateDelta, WindowState};
use crate::time::{TimeDomain, TimerData, TimerStore, TimerUpdate};
use crate::types::{EventTime, KeyedWorkItem, PaneInfo, PaneTiming, StreamData, WindowedValue};
use crate::window::{
    AccumulationMode, BufferingReduceFn, ReduceFn, TimeWindow, TriggerEvent, TriggerResult,
    WindowingStrategy,
};

mod evaluator;
mod late;
mod result;
mod runner;
mod sink;

pub use evaluator::*;
pub use late::*;
pub use result::*;
pub use runner::*;
pub use sink::*;

#[cfg(test)]
#[path = "tests/evaluate_tests.rs"]
mod tests;
