/*
    g_counter.rs - Grow-only counter CRDT

    One monotonically increasing sub-counter per replica, keyed by
    replica id. The total is the sum of all sub-counters; merging two
    states takes the pointwise maximum per replica.

    The max-merge is commutative, associative and idempotent, which is
    what makes repeated, out-of-order or duplicated exchanges between
    replicas safe without any coordination.
*/

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Replica identifier for counter entries
pub type ReplicaId = String;

/// Grow-only counter: per-replica increment counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GCounter {
    /// Map from replica id to that replica's local increment count
    counts: HashMap<ReplicaId, u64>,
}

impl GCounter {
    /// Create a new empty counter
    pub fn new() -> Self {
        GCounter { counts: HashMap::new() }
    }

    /// Create a counter from an existing per-replica map
    pub fn from_counts(counts: HashMap<ReplicaId, u64>) -> Self {
        GCounter { counts }
    }

    /// Increment the entry owned by the given replica by 1
    pub fn increment(&mut self, replica_id: &str) -> u64 {
        self.increment_by(replica_id, 1)
    }

    /// Increment the entry owned by the given replica by `amount`
    ///
    /// Returns the new value of that replica's entry. Counts are
    /// unsigned, so the counter can only grow.
    pub fn increment_by(&mut self, replica_id: &str, amount: u64) -> u64 {
        let entry = self.counts.entry(replica_id.to_string()).or_insert(0);
        *entry += amount;
        *entry
    }

    /// Total value: the sum over all replica entries
    pub fn value(&self) -> u64 {
        self.counts.values().sum()
    }

    /// The entry attributed to one replica (0 if absent)
    pub fn count_for(&self, replica_id: &str) -> u64 {
        self.counts.get(replica_id).copied().unwrap_or(0)
    }

    /// Merge another counter state into this one (pointwise maximum)
    ///
    /// Replica ids unknown to the local side are inserted, never
    /// rejected: membership is discovered opportunistically through
    /// merge traffic.
    pub fn merge(&mut self, other: &GCounter) {
        for (replica_id, &count) in &other.counts {
            let entry = self.counts.entry(replica_id.clone()).or_insert(0);
            *entry = (*entry).max(count);
        }
    }

    /// Copy of the per-replica map, for serialization and transfer
    pub fn counts(&self) -> HashMap<ReplicaId, u64> {
        self.counts.clone()
    }

    /// Replica ids with an entry in this counter
    pub fn replica_ids(&self) -> Vec<ReplicaId> {
        self.counts.keys().cloned().collect()
    }

    /// Number of replicas that have contributed
    pub fn replica_count(&self) -> usize {
        self.counts.len()
    }

    /// Check if no replica has contributed yet
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl Default for GCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_creation() {
        let counter = GCounter::new();
        assert!(counter.is_empty());
        assert_eq!(counter.value(), 0);
    }

    #[test]
    fn test_increment() {
        let mut counter = GCounter::new();

        counter.increment("replica-1");
        assert_eq!(counter.value(), 1);

        counter.increment("replica-1");
        assert_eq!(counter.value(), 2);

        counter.increment("replica-2");
        assert_eq!(counter.value(), 3);
    }

    #[test]
    fn test_increment_by_amount() {
        let mut counter = GCounter::new();

        counter.increment_by("replica-1", 10);
        assert_eq!(counter.value(), 10);

        counter.increment_by("replica-1", 5);
        assert_eq!(counter.value(), 15);
        assert_eq!(counter.count_for("replica-1"), 15);
    }

    #[test]
    fn test_value_sums_all_replicas() {
        let mut counter = GCounter::new();
        counter.increment_by("replica-1", 30);
        counter.increment_by("replica-2", 20);
        counter.increment_by("replica-3", 50);

        assert_eq!(counter.value(), 100);
    }

    #[test]
    fn test_count_for_unknown_replica() {
        let counter = GCounter::new();
        assert_eq!(counter.count_for("replica-999"), 0);
    }

    #[test]
    fn test_merge_disjoint() {
        let mut counter1 = GCounter::new();
        counter1.increment_by("replica-1", 30);

        let mut counter2 = GCounter::new();
        counter2.increment_by("replica-2", 20);

        counter1.merge(&counter2);

        assert_eq!(counter1.value(), 50);
        assert_eq!(counter1.count_for("replica-1"), 30);
        assert_eq!(counter1.count_for("replica-2"), 20);
    }

    #[test]
    fn test_merge_takes_max_per_replica() {
        let mut counter1 = GCounter::new();
        counter1.increment_by("replica-1", 30);
        counter1.increment_by("replica-2", 10);

        let mut counter2 = GCounter::new();
        counter2.increment_by("replica-1", 20);
        counter2.increment_by("replica-2", 25);

        counter1.merge(&counter2);

        assert_eq!(counter1.count_for("replica-1"), 30); // max(30, 20)
        assert_eq!(counter1.count_for("replica-2"), 25); // max(10, 25)
        assert_eq!(counter1.value(), 55);
    }

    #[test]
    fn test_merge_never_lowers_entries() {
        let mut counter = GCounter::new();
        counter.increment_by("replica-1", 50);

        let mut stale = GCounter::new();
        stale.increment_by("replica-1", 5);

        counter.merge(&stale);
        assert_eq!(counter.count_for("replica-1"), 50);
    }

    #[test]
    fn test_merge_inserts_unknown_replica() {
        // A peer added after this replica's last restart must be
        // accepted, not rejected
        let mut counter = GCounter::new();
        counter.increment_by("replica-1", 3);

        let mut other = GCounter::new();
        other.increment_by("replica-9", 7);

        counter.merge(&other);
        assert_eq!(counter.count_for("replica-9"), 7);
        assert_eq!(counter.value(), 10);
    }

    #[test]
    fn test_from_counts_roundtrip() {
        let mut map = HashMap::new();
        map.insert("replica-1".to_string(), 4u64);
        map.insert("replica-2".to_string(), 9u64);

        let counter = GCounter::from_counts(map.clone());
        assert_eq!(counter.value(), 13);
        assert_eq!(counter.counts(), map);
        assert_eq!(counter.replica_count(), 2);
    }
}
