//! Bounded log buffer
//!
//! Storage order is arrival order and eviction is FIFO on that order, regardless of
//! `created`. Display order (newest `created` first) is computed on demand and never
//! fed back into storage.

use std::collections::VecDeque;

use crate::model::LogEntry;

/// Default number of retained entries
pub const DEFAULT_LOG_CAPACITY: usize = 200;

#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl LogBuffer {
    /// Create an empty buffer holding at most `capacity` entries (minimum 1)
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Replace the whole contents with a bulk-loaded history
    ///
    /// Keeps the last `capacity` entries if the history is longer.
    pub fn replace_all(&mut self, entries: Vec<LogEntry>) {
        let skip = entries.len().saturating_sub(self.capacity);
        self.entries.clear();
        self.entries.extend(entries.into_iter().skip(skip));
    }

    /// Append one live entry, evicting the oldest arrivals past capacity
    pub fn append(&mut self, entry: LogEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Entries sorted by `created` descending
    ///
    /// The sort is stable: entries sharing a timestamp keep their arrival order.
    #[must_use]
    pub fn to_display_order(&self) -> Vec<&LogEntry> {
        let mut ordered: Vec<&LogEntry> = self.entries.iter().collect();
        ordered.sort_by(|a, b| b.created.total_cmp(&a.created));
        ordered
    }

    /// Entries in arrival order
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn entry(created: f64, message: &str) -> LogEntry {
        LogEntry::new(created, "INFO", message)
    }

    fn messages<'a>(entries: impl IntoIterator<Item = &'a LogEntry>) -> Vec<&'a str> {
        entries.into_iter().map(|e| e.message.as_str()).collect()
    }

    #[rstest]
    #[case(0)]
    #[case(199)]
    #[case(200)]
    #[case(201)]
    #[case(1000)]
    fn append_never_exceeds_capacity(#[case] count: usize) {
        let mut buffer = LogBuffer::default();
        for i in 0..count {
            buffer.append(entry(i as f64, &i.to_string()));
            assert!(buffer.len() <= DEFAULT_LOG_CAPACITY);
        }
        assert_eq!(buffer.len(), count.min(DEFAULT_LOG_CAPACITY));
    }

    #[test]
    fn overflow_keeps_most_recent_arrivals_in_order() {
        let mut buffer = LogBuffer::new(200);
        for i in 0..250 {
            buffer.append(entry(f64::from(i), &i.to_string()));
        }
        let expected: Vec<String> = (50..250).map(|i| i.to_string()).collect();
        assert_eq!(messages(buffer.iter()), expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn eviction_ignores_created_timestamps() {
        let mut buffer = LogBuffer::new(3);
        // Newest timestamp arrives first; it is still the first to go
        buffer.append(entry(100.0, "newest-first"));
        buffer.append(entry(1.0, "old"));
        buffer.append(entry(2.0, "older"));
        buffer.append(entry(3.0, "fourth"));
        assert_eq!(messages(buffer.iter()), vec!["old", "older", "fourth"]);
    }

    #[test]
    fn replace_then_append_keeps_arrival_order() {
        let mut buffer = LogBuffer::default();
        buffer.append(entry(0.0, "live before load"));
        buffer.replace_all(vec![entry(3.0, "e1"), entry(1.0, "e2"), entry(2.0, "e3")]);
        buffer.append(entry(4.0, "e4"));
        assert_eq!(messages(buffer.iter()), vec!["e1", "e2", "e3", "e4"]);
    }

    #[test]
    fn replace_all_truncates_to_newest_arrivals() {
        let mut buffer = LogBuffer::new(2);
        buffer.replace_all(vec![entry(1.0, "a"), entry(2.0, "b"), entry(3.0, "c")]);
        assert_eq!(messages(buffer.iter()), vec!["b", "c"]);
    }

    #[test]
    fn display_order_is_created_descending() {
        let mut buffer = LogBuffer::default();
        buffer.replace_all(vec![entry(2.0, "mid"), entry(3.0, "new"), entry(1.0, "old")]);
        assert_eq!(messages(buffer.to_display_order()), vec!["new", "mid", "old"]);
    }

    #[test]
    fn display_order_is_stable_for_equal_timestamps() {
        let mut buffer = LogBuffer::default();
        buffer.append(entry(5.0, "a"));
        buffer.append(entry(7.0, "b"));
        buffer.append(entry(5.0, "c"));
        buffer.append(entry(5.0, "d"));
        assert_eq!(messages(buffer.to_display_order()), vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn display_order_is_a_permutation_of_storage() {
        let mut buffer = LogBuffer::new(50);
        for i in 0..80u32 {
            buffer.append(entry(f64::from((i * 37) % 11), &i.to_string()));
        }
        let display = buffer.to_display_order();
        assert_eq!(display.len(), buffer.len());
        assert!(display.windows(2).all(|w| w[0].created >= w[1].created));
        let mut stored = messages(buffer.iter());
        let mut shown = messages(display);
        stored.sort_unstable();
        shown.sort_unstable();
        assert_eq!(stored, shown);
    }
}
