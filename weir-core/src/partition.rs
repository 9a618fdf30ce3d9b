//! Key partitioning glue for the stage upstream of the evaluator: routing
//! keys across parallel evaluator instances and bucketing a batch of keyed
//! elements plus fired timers into per-key work items.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use ahash::AHasher;

use crate::time::TimerData;
use crate::types::{KeyedWorkItem, WindowedValue};

/// Hash-based routing of keys across parallel evaluator instances.
///
/// Uses ahash for SIMD-accelerated hashing.
pub struct HashPartitioner {
    num_partitions: usize,
}

impl HashPartitioner {
    /// Create a partitioner over `num_partitions` evaluator instances.
    pub fn new(num_partitions: usize) -> Self {
        debug_assert!(num_partitions > 0, "need at least one partition");
        Self { num_partitions }
    }

    /// Determine which instance (0..num_partitions) owns this key.
    pub fn partition<K: Hash>(&self, key: &K) -> usize {
        let mut hasher = AHasher::default();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.num_partitions
    }
}

/// Bucket a batch of keyed elements and fired timers into one
/// [`KeyedWorkItem`] per distinct key.
///
/// Element order within a key is preserved; work items appear in order of
/// each key's first occurrence.
pub fn group_into_work_items<K, V>(
    elements: Vec<WindowedValue<(K, V)>>,
    timers: Vec<(K, TimerData)>,
) -> Vec<KeyedWorkItem<K, V>>
where
    K: Eq + Hash + Clone,
{
    let mut order: Vec<K> = Vec::new();
    let mut items: HashMap<K, KeyedWorkItem<K, V>> = HashMap::new();

    for element in elements {
        let WindowedValue {
            value: (key, value),
            timestamp,
            windows,
            pane,
        } = element;
        let item = items.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            KeyedWorkItem::new(key.clone())
        });
        item.elements.push(WindowedValue {
            value,
            timestamp,
            windows,
            pane,
        });
    }

    for (key, timer) in timers {
        let item = items.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            KeyedWorkItem::new(key.clone())
        });
        item.timers.push(timer);
    }

    order.into_iter().filter_map(|key| items.remove(&key)).collect()
}
