//! End-to-end grouping lifecycle: partition a batch into work items,
//! evaluate, advance the watermark, drain due timers, and evaluate again.

use std::time::Duration;

use weir_core::evaluate::{evaluate, StepContext};
use weir_core::partition::{group_into_work_items, HashPartitioner};
use weir_core::time::{TimeDomain, TimerData};
use weir_core::types::{KeyedWorkItem, PaneTiming, WindowedValue};
use weir_core::window::{
    SlidingWindows, TimeWindow, TumblingWindows, WindowAssigner, WindowingStrategy,
};

fn keyed_element(
    assigner: &dyn WindowAssigner,
    key: &str,
    timestamp: i64,
    value: i32,
) -> WindowedValue<(String, i32)> {
    WindowedValue::in_windows(
        (key.to_string(), value),
        timestamp,
        assigner.assign_windows(timestamp),
    )
}

fn key_bytes(key: &str) -> Vec<u8> {
    bincode::serialize(&key.to_string()).unwrap()
}

#[test]
fn tumbling_group_fires_on_time_when_watermark_passes() {
    let strategy = WindowingStrategy::new();
    let assigner = TumblingWindows::of(Duration::from_millis(10));

    let elements = vec![
        keyed_element(&assigner, "a", 3, 1),
        keyed_element(&assigner, "a", 5, 2),
        keyed_element(&assigner, "b", 7, 10),
    ];
    let items = group_into_work_items(elements, Vec::new());
    assert_eq!(items.len(), 2);

    // Watermark still at 0: everything buffers, nothing fires.
    let result = evaluate(strategy.clone(), StepContext::new(), 0, items).unwrap();
    assert_eq!(result.output_count(), 0);
    assert_eq!(result.watermark_hold, Some(3));

    // Watermark reaches 10: drain key a's due timer and replay it.
    let mut step = result.step;
    let fired = step
        .timers
        .get_mut(&key_bytes("a"))
        .unwrap()
        .drain_due(10, TimeDomain::EventTime);
    assert_eq!(fired, vec![TimerData::event_time(TimeWindow::new(0, 10), 10)]);

    let item = KeyedWorkItem::with_timers("a".to_string(), fired);
    let result = evaluate(strategy, step, 10, vec![item]).unwrap();

    assert_eq!(result.output_count(), 1);
    let pane = &result.bundles[0].outputs[0];
    assert_eq!(pane.value, ("a".to_string(), vec![1, 2]));
    assert_eq!(pane.timestamp, 3);
    assert_eq!(pane.windows, vec![TimeWindow::new(0, 10)]);
    assert_eq!(pane.pane.timing, PaneTiming::OnTime);
    assert!(pane.pane.is_last);

    // Key b is still buffered and still holds the watermark.
    assert_eq!(result.watermark_hold, Some(7));
    assert_eq!(result.counters.dropped_due_to_lateness, 0);
}

#[test]
fn sliding_membership_fires_one_pane_per_window() {
    let strategy = WindowingStrategy::new();
    let assigner = SlidingWindows::of(Duration::from_millis(10), Duration::from_millis(5));

    let elements = vec![keyed_element(&assigner, "a", 7, 42)];
    let items = group_into_work_items(elements, Vec::new());
    let result = evaluate(strategy.clone(), StepContext::new(), 0, items).unwrap();
    assert_eq!(result.output_count(), 0);
    assert_eq!(result.watermark_hold, Some(7));

    // Watermark jumps past both windows; both timers come due at once.
    let mut step = result.step;
    let fired = step
        .timers
        .get_mut(&key_bytes("a"))
        .unwrap()
        .drain_due(15, TimeDomain::EventTime);
    assert_eq!(fired.len(), 2);

    let item = KeyedWorkItem::with_timers("a".to_string(), fired);
    let result = evaluate(strategy, step, 15, vec![item]).unwrap();

    // One independent pane per window membership, each carrying the value.
    assert_eq!(result.output_count(), 2);
    for pane in &result.bundles[0].outputs {
        assert_eq!(pane.value, ("a".to_string(), vec![42]));
        assert_eq!(pane.pane.timing, PaneTiming::OnTime);
    }
    assert_eq!(result.watermark_hold, None);
}

#[test]
fn late_arrival_after_grace_is_dropped() {
    let strategy = WindowingStrategy::new().with_allowed_lateness(Duration::from_millis(5));
    let assigner = TumblingWindows::of(Duration::from_millis(10));

    // Window [0, 10) with 5ms grace survives until watermark 15.
    let on_grace = group_into_work_items(vec![keyed_element(&assigner, "a", 3, 1)], Vec::new());
    let result = evaluate(strategy.clone(), StepContext::new(), 15, on_grace).unwrap();
    assert_eq!(result.counters.dropped_due_to_lateness, 0);
    assert_eq!(result.watermark_hold, Some(3));

    let too_late = group_into_work_items(vec![keyed_element(&assigner, "b", 4, 2)], Vec::new());
    let result = evaluate(strategy, result.step, 16, too_late).unwrap();
    assert_eq!(result.counters.dropped_due_to_lateness, 1);
    assert_eq!(result.output_count(), 0);
    // Key a's buffered window still holds.
    assert_eq!(result.watermark_hold, Some(3));
}

#[test]
fn partitioner_routes_work_items_consistently() {
    let partitioner = HashPartitioner::new(3);
    let assigner = TumblingWindows::of(Duration::from_millis(10));
    let items = group_into_work_items(
        vec![
            keyed_element(&assigner, "a", 1, 1),
            keyed_element(&assigner, "b", 2, 2),
            keyed_element(&assigner, "a", 3, 3),
        ],
        Vec::new(),
    );

    // Every work item for the same key lands on the same instance.
    let routes: Vec<usize> = items
        .iter()
        .map(|item| partitioner.partition(&item.key))
        .collect();
    assert_eq!(routes[0], partitioner.partition(&"a".to_string()));
    assert_eq!(routes[1], partitioner.partition(&"b".to_string()));
    assert!(routes.iter().all(|route| *route < 3));
}
