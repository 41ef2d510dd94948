//! Bounded memory of already-reported fault signatures
//!
//! The first sighting of a signature is reportable; repeats within the same
//! session are not. When the memory is full the oldest signature (by first
//! sighting) is forgotten to make room, after which it becomes reportable
//! again.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Seen {
    order: VecDeque<String>,
    keys: HashSet<String>,
}

/// Insertion-ordered, capacity-bounded signature set
#[derive(Debug)]
pub struct SignatureDeduplicator {
    capacity: usize,
    seen: Mutex<Seen>,
}

impl SignatureDeduplicator {
    /// Create a deduplicator remembering at most `capacity` signatures.
    ///
    /// A capacity of zero remembers nothing, so every call is reportable.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            seen: Mutex::new(Seen::default()),
        }
    }

    /// Returns `true` the first time `key` is seen and records it
    pub fn should_report(&self, key: &str) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        if seen.keys.contains(key) {
            return false;
        }
        if self.capacity == 0 {
            return true;
        }

        while seen.order.len() >= self.capacity {
            if let Some(oldest) = seen.order.pop_front() {
                seen.keys.remove(&oldest);
            }
        }
        seen.order.push_back(key.to_string());
        seen.keys.insert(key.to_string());
        true
    }

    /// Whether `key` is currently remembered
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        let seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        seen.keys.contains(key)
    }

    /// Number of remembered signatures
    #[must_use]
    pub fn len(&self) -> usize {
        let seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        seen.order.len()
    }

    /// Whether nothing is remembered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forget every signature
    pub fn clear(&self) {
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        seen.order.clear();
        seen.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_report_then_suppressed() {
        let dedup = SignatureDeduplicator::new(50);
        assert!(dedup.should_report("search:match:11003"));
        assert!(!dedup.should_report("search:match:11003"));
        assert!(dedup.should_report("search:init:11001"));
        assert_eq!(dedup.len(), 2);
    }

    #[test]
    fn test_oldest_evicted_on_overflow() {
        let dedup = SignatureDeduplicator::new(50);
        for i in 0..50 {
            assert!(dedup.should_report(&format!("sig-{i}")));
        }
        assert!(!dedup.should_report("sig-0"));

        assert!(dedup.should_report("sig-50"));
        assert_eq!(dedup.len(), 50);
        assert!(!dedup.contains("sig-0"));
        assert!(dedup.contains("sig-1"));

        // Forgotten, so reportable again
        assert!(dedup.should_report("sig-0"));
        assert!(!dedup.contains("sig-1"));
    }

    #[test]
    fn test_repeat_does_not_refresh_position() {
        let dedup = SignatureDeduplicator::new(2);
        assert!(dedup.should_report("a"));
        assert!(dedup.should_report("b"));
        assert!(!dedup.should_report("a"));
        assert!(dedup.should_report("c"));
        assert!(!dedup.contains("a"));
        assert!(dedup.contains("b"));
    }

    #[test]
    fn test_zero_capacity_always_reports() {
        let dedup = SignatureDeduplicator::new(0);
        assert!(dedup.should_report("a"));
        assert!(dedup.should_report("a"));
        assert!(dedup.is_empty());
    }

    #[test]
    fn test_clear() {
        let dedup = SignatureDeduplicator::new(4);
        assert!(dedup.should_report("a"));
        dedup.clear();
        assert!(dedup.is_empty());
        assert!(dedup.should_report("a"));
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_capacity(
            capacity in 1usize..16,
            keys in proptest::collection::vec("[a-d]{1,3}", 0..200),
        ) {
            let dedup = SignatureDeduplicator::new(capacity);
            for key in &keys {
                dedup.should_report(key);
                prop_assert!(dedup.len() <= capacity);
                prop_assert!(dedup.contains(key));
            }
        }
    }
}
