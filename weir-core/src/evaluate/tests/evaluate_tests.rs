use super::*;

use crate::window::Trigger;

fn window_0_10() -> TimeWindow {
    TimeWindow::new(0, 10)
}

fn work_item(key: &str, elements: Vec<WindowedValue<i32>>) -> KeyedWorkItem<String, i32> {
    KeyedWorkItem::with_elements(key.to_string(), elements)
}

// ── Late-data filter ──────────────────────────────────────────────────────

#[test]
fn test_filter_drops_only_expired_window_copies() {
    let counter = Counter::new();
    let element = WindowedValue::in_windows(
        7i32,
        7,
        vec![window_0_10(), TimeWindow::new(5, 15)],
    );
    // gc times are 10 and 15; watermark 12 expires only the first window.
    let admitted = drop_expired_windows(&"k", vec![element], 12, 0, &counter);
    assert_eq!(admitted.len(), 1);
    assert_eq!(admitted[0].windows, vec![TimeWindow::new(5, 15)]);
    assert_eq!(counter.get(), 1);
}

#[test]
fn test_filter_counts_each_expired_copy() {
    let counter = Counter::new();
    let element = WindowedValue::in_windows(
        1i32,
        3,
        vec![window_0_10(), TimeWindow::new(2, 12)],
    );
    let admitted = drop_expired_windows(&"k", vec![element], 20, 0, &counter);
    assert!(admitted.is_empty());
    assert_eq!(counter.get(), 2);
}

#[test]
fn test_filter_admits_on_equality() {
    // A window whose max_timestamp + lateness equals the watermark is kept:
    // only strictly-before drops.
    let counter = Counter::new();
    let element = WindowedValue::new(1i32, 5, window_0_10());
    let admitted = drop_expired_windows(&"k", vec![element], 10, 0, &counter);
    assert_eq!(admitted.len(), 1);
    assert_eq!(counter.get(), 0);
}

#[test]
fn test_filter_lateness_extends_admission() {
    let counter = Counter::new();
    let element = WindowedValue::new(1i32, 5, window_0_10());
    // gc time 10 + 5 = 15 >= watermark 14.
    let admitted = drop_expired_windows(&"k", vec![element], 14, 5, &counter);
    assert_eq!(admitted.len(), 1);
    assert_eq!(counter.get(), 0);
}

#[test]
fn test_filter_preserves_survivor_order() {
    let counter = Counter::new();
    let elements = vec![
        WindowedValue::new(1i32, 12, TimeWindow::new(10, 20)),
        WindowedValue::new(2i32, 3, window_0_10()),
        WindowedValue::new(3i32, 15, TimeWindow::new(10, 20)),
    ];
    let admitted = drop_expired_windows(&"k", elements, 11, 0, &counter);
    let values: Vec<i32> = admitted.iter().map(|wv| wv.value).collect();
    assert_eq!(values, vec![1, 3]);
    assert_eq!(counter.get(), 1);
}

// ── Output sink adapter ───────────────────────────────────────────────────

#[test]
fn test_sink_appends_emitted_panes() {
    let mut sink = BundleSink::<String, i32>::new();
    sink.emit(
        ("k".to_string(), vec![1, 2]),
        5,
        vec![window_0_10()],
        PaneInfo::new(0, true, PaneTiming::OnTime),
    );
    let bundle = sink.into_bundle();
    assert_eq!(bundle.len(), 1);
    assert_eq!(bundle.outputs[0].value, ("k".to_string(), vec![1, 2]));
    assert_eq!(bundle.outputs[0].timestamp, 5);
}

#[test]
fn test_sink_rejects_ambient_reads() {
    let sink = BundleSink::<String, i32>::new();
    assert!(sink.state().is_err());
    assert!(sink.timers().is_err());
    assert!(sink.active_windows().is_err());
    assert!(sink.current_pane().is_err());
}

// ── Evaluator scenarios ───────────────────────────────────────────────────

#[test]
fn test_on_time_element_buffers_and_holds() {
    // One element at t=10 in [0, 10), watermark 5, no lateness: admitted,
    // buffered, no output yet, hold = 10.
    let item = work_item("k1", vec![WindowedValue::new(7i32, 10, window_0_10())]);
    let result = evaluate(WindowingStrategy::new(), StepContext::new(), 5, vec![item]).unwrap();

    assert_eq!(result.output_count(), 0);
    assert_eq!(result.watermark_hold, Some(10));
    assert_eq!(result.counters, CounterDeltas::default());
    assert!(result.unprocessed.is_empty());

    // The end-of-window timer was staged for the key.
    assert_eq!(result.timer_updates.len(), 1);
    let (key, update) = &result.timer_updates[0];
    assert_eq!(key, "k1");
    assert_eq!(update.set, vec![TimerData::event_time(window_0_10(), 10)]);
}

#[test]
fn test_late_element_dropped_without_state() {
    // Same window once the watermark passed 10: dropped, counted, nothing
    // buffered.
    let item = work_item("k1", vec![WindowedValue::new(7i32, 10, window_0_10())]);
    let result = evaluate(WindowingStrategy::new(), StepContext::new(), 11, vec![item]).unwrap();

    assert_eq!(result.output_count(), 0);
    assert_eq!(result.counters.dropped_due_to_lateness, 1);
    assert_eq!(result.watermark_hold, None);
    assert_eq!(result.step.state.key_count(), 0);
    assert!(result.timer_updates.is_empty());
}

#[test]
fn test_gc_timer_on_empty_window_counts_and_removes_state() {
    // First evaluation: AfterCount(1) fires immediately, leaving a closed
    // window with an empty buffer behind.
    let strategy = WindowingStrategy::new().with_trigger(Trigger::AfterCount(1));
    let item = work_item("k1", vec![WindowedValue::new(7i32, 3, window_0_10())]);
    let result = evaluate(strategy.clone(), StepContext::new(), 0, vec![item]).unwrap();

    assert_eq!(result.output_count(), 1);
    let pane = &result.bundles[0].outputs[0];
    assert_eq!(pane.value, ("k1".to_string(), vec![7]));
    assert_eq!(pane.pane.timing, PaneTiming::Early);
    assert_eq!(result.watermark_hold, None);
    assert_eq!(result.step.state.key_count(), 1);

    // Second evaluation: the garbage-collection timer fires for the empty
    // window. Counted, no output, state removed.
    let item = KeyedWorkItem::with_timers(
        "k1".to_string(),
        vec![TimerData::event_time(window_0_10(), 10)],
    );
    let result = evaluate(strategy, result.step, 10, vec![item]).unwrap();

    assert_eq!(result.output_count(), 0);
    assert_eq!(result.counters.dropped_due_to_closed_window, 1);
    assert_eq!(result.step.state.key_count(), 0);
}

#[test]
fn test_stale_timer_replay_is_counted_not_faulted() {
    // Delivering the same garbage-collection timer twice: the second replay
    // finds no state and is ignored, counted both times.
    let strategy = WindowingStrategy::new().with_trigger(Trigger::AfterCount(1));
    let item = work_item("k1", vec![WindowedValue::new(7i32, 3, window_0_10())]);
    let result = evaluate(strategy.clone(), StepContext::new(), 0, vec![item]).unwrap();

    let timer = TimerData::event_time(window_0_10(), 10);
    let item = KeyedWorkItem::with_timers("k1".to_string(), vec![timer, timer]);
    let result = evaluate(strategy, result.step, 10, vec![item]).unwrap();

    assert_eq!(result.counters.dropped_due_to_closed_window, 2);
    assert_eq!(result.output_count(), 0);
}

#[test]
fn test_disjoint_windows_fire_independently() {
    // Two elements in disjoint windows: both buffered, each fires its own
    // pane when its own end-of-window timer arrives.
    let second_window = TimeWindow::new(10, 20);
    let item = work_item(
        "k1",
        vec![
            WindowedValue::new(1i32, 2, window_0_10()),
            WindowedValue::new(2i32, 12, second_window),
        ],
    );
    let result = evaluate(WindowingStrategy::new(), StepContext::new(), 0, vec![item]).unwrap();
    assert_eq!(result.output_count(), 0);
    assert_eq!(result.watermark_hold, Some(2));

    // Watermark reaches the first window's end; only it fires.
    let item = KeyedWorkItem::with_timers(
        "k1".to_string(),
        vec![TimerData::event_time(window_0_10(), 10)],
    );
    let result = evaluate(WindowingStrategy::new(), result.step, 10, vec![item]).unwrap();

    assert_eq!(result.output_count(), 1);
    let pane = &result.bundles[0].outputs[0];
    assert_eq!(pane.value, ("k1".to_string(), vec![1]));
    assert_eq!(pane.timestamp, 2);
    assert_eq!(pane.windows, vec![window_0_10()]);
    assert_eq!(pane.pane.timing, PaneTiming::OnTime);
    assert!(pane.pane.is_last);

    // The second window still holds the watermark at its buffered timestamp.
    assert_eq!(result.watermark_hold, Some(12));
}

#[test]
fn test_discarding_mode_emits_only_new_elements() {
    let strategy =
        WindowingStrategy::new().with_trigger(Trigger::Repeatedly(Box::new(Trigger::AfterCount(2))));
    let item = work_item(
        "k1",
        vec![
            WindowedValue::new(1i32, 1, window_0_10()),
            WindowedValue::new(2i32, 2, window_0_10()),
            WindowedValue::new(3i32, 3, window_0_10()),
            WindowedValue::new(4i32, 4, window_0_10()),
        ],
    );
    let result = evaluate(strategy, StepContext::new(), 0, vec![item]).unwrap();

    assert_eq!(result.output_count(), 2);
    let outputs = &result.bundles[0].outputs;
    assert_eq!(outputs[0].value.1, vec![1, 2]);
    assert_eq!(outputs[1].value.1, vec![3, 4]);
    assert_eq!(outputs[0].pane.index, 0);
    assert!(outputs[0].pane.is_first);
    assert_eq!(outputs[1].pane.index, 1);
    assert!(!outputs[1].pane.is_first);
}

#[test]
fn test_accumulating_mode_reemits_prior_contents() {
    let strategy = WindowingStrategy::new()
        .with_trigger(Trigger::Repeatedly(Box::new(Trigger::AfterCount(2))))
        .with_accumulation_mode(AccumulationMode::Accumulating);
    let item = work_item(
        "k1",
        vec![
            WindowedValue::new(1i32, 1, window_0_10()),
            WindowedValue::new(2i32, 2, window_0_10()),
            WindowedValue::new(3i32, 3, window_0_10()),
            WindowedValue::new(4i32, 4, window_0_10()),
        ],
    );
    let result = evaluate(strategy, StepContext::new(), 0, vec![item]).unwrap();

    assert_eq!(result.output_count(), 2);
    let outputs = &result.bundles[0].outputs;
    assert_eq!(outputs[0].value.1, vec![1, 2]);
    assert_eq!(outputs[1].value.1, vec![1, 2, 3, 4]);
}

#[test]
fn test_closed_window_drops_new_elements() {
    // AfterCount(1) closes the window on the first element; the second
    // element of the same work item lands in a closed window.
    let strategy = WindowingStrategy::new().with_trigger(Trigger::AfterCount(1));
    let item = work_item(
        "k1",
        vec![
            WindowedValue::new(1i32, 1, window_0_10()),
            WindowedValue::new(2i32, 2, window_0_10()),
        ],
    );
    let result = evaluate(strategy, StepContext::new(), 0, vec![item]).unwrap();

    assert_eq!(result.output_count(), 1);
    assert_eq!(result.bundles[0].outputs[0].value.1, vec![1]);
    assert_eq!(result.counters.dropped_due_to_closed_window, 1);
    // The dropped element never established a hold.
    assert_eq!(result.watermark_hold, None);
}

#[test]
fn test_output_stays_in_per_key_bundles() {
    let strategy = WindowingStrategy::new().with_trigger(Trigger::AfterCount(1));
    let items = vec![
        work_item("a", vec![WindowedValue::new(1i32, 1, window_0_10())]),
        work_item("b", vec![WindowedValue::new(2i32, 2, window_0_10())]),
    ];
    let result = evaluate(strategy, StepContext::new(), 0, items).unwrap();

    assert_eq!(result.bundles.len(), 2);
    assert_eq!(result.bundles[0].outputs.len(), 1);
    assert_eq!(result.bundles[0].outputs[0].value.0, "a");
    assert_eq!(result.bundles[1].outputs.len(), 1);
    assert_eq!(result.bundles[1].outputs[0].value.0, "b");
}

#[test]
fn test_hold_is_earliest_across_keys() {
    let items = vec![
        work_item("a", vec![WindowedValue::new(1i32, 100, TimeWindow::new(100, 200))]),
        work_item("b", vec![WindowedValue::new(2i32, 50, window_0_10())]),
    ];
    let result = evaluate(WindowingStrategy::new(), StepContext::new(), 0, items).unwrap();
    assert_eq!(result.watermark_hold, Some(50));
}

#[test]
fn test_hold_bounded_by_gc_horizon_of_buffered_windows() {
    // The reported hold never exceeds the minimum max_timestamp + lateness
    // among buffered windows.
    let item = work_item("k1", vec![WindowedValue::new(7i32, 10, window_0_10())]);
    let result = evaluate(WindowingStrategy::new(), StepContext::new(), 5, vec![item]).unwrap();
    let hold = result.watermark_hold.unwrap();
    assert!(hold <= window_0_10().gc_time(0));
}

#[test]
fn test_multi_window_element_buffers_into_each_window() {
    // A sliding-style membership: one element, two windows, one state each.
    let element = WindowedValue::in_windows(7i32, 7, vec![window_0_10(), TimeWindow::new(5, 15)]);
    let result = evaluate(
        WindowingStrategy::new(),
        StepContext::new(),
        0,
        vec![work_item("k1", vec![element])],
    )
    .unwrap();

    let state = result.step.state.load(&CopyOnAccessStateStore::<i32>::key_bytes(&"k1".to_string()).unwrap());
    assert_eq!(state.windows.len(), 2);
    assert_eq!(result.watermark_hold, Some(7));
}
