//! # Weir Core
//!
//! The windowed-grouping evaluator of a key-partitioned stream/batch engine:
//! groups per-key values by time window, drives per-window trigger state
//! machines to decide when buffered groups become output panes, drops data
//! that arrives too late to matter, and reports the watermark hold that keeps
//! downstream progress from outrunning buffered data.
//!
//! - [`types`] — core data types: [`WindowedValue`](types::WindowedValue),
//!   [`PaneInfo`](types::PaneInfo), [`KeyedWorkItem`](types::KeyedWorkItem).
//! - [`window`] — windows, assigners, the closed trigger variant set, and
//!   [`WindowingStrategy`](window::WindowingStrategy).
//! - [`time`] — timers: [`TimerData`](time::TimerData),
//!   [`TimerStore`](time::TimerStore), event-time sentinels.
//! - [`state`] — the copy-on-access per-key window state store.
//! - [`evaluate`] — the evaluator, late-data filter, grouping/trigger engine,
//!   and write-only output sink.
//! - [`partition`] — key routing and work-item grouping glue.
//! - [`metrics`] — monotonic dropped-data counters.

pub mod evaluate;
pub mod metrics;
pub mod partition;
pub mod state;
pub mod time;
pub mod types;
pub mod window;
