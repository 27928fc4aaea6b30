//! `BatchedObjectIterator` — aggregates many `SingleObjectIterator`s for one
//! migration batch, expands tagged-key closures so hash-tag siblings always
//! travel together, and tracks what the commit step needs afterward
//! (removed keys, chunked values bound for `LazyReleaseWorker`).

use super::hash_slot::slot_crc_tag;
use super::object_iterator::{IteratorStatus, Preamble, SingleObjectIterator};
use super::value::Value;
use super::wire::SourceFrame;
use std::collections::{HashSet, VecDeque};

/// Anything the batch needs to read values from and consult the tag index.
/// Kept as a trait so the engine doesn't hard-code one storage layout.
pub trait ValueSource {
    fn fetch(&self, key: &str) -> Option<(Value, Option<u64>)>;
    /// Keys sharing `crc(tag)`, in the slot index's natural order.
    fn tag_siblings(&self, tag_crc: u32) -> Vec<String>;
}

pub struct BatchedObjectIterator {
    keys: HashSet<String>,
    pending: VecDeque<SingleObjectIterator>,
    tag_set: HashSet<u32>,
    removed_keys: Vec<String>,
    chunked_vals: Vec<Value>,
    estimate_msgs: usize,
    timeout_ms: u64,
    max_bulks: usize,
    max_bytes: usize,
}

impl BatchedObjectIterator {
    pub fn new(timeout_ms: u64, max_bulks: usize, max_bytes: usize) -> Self {
        Self {
            keys: HashSet::new(),
            pending: VecDeque::new(),
            tag_set: HashSet::new(),
            removed_keys: Vec::new(),
            chunked_vals: Vec::new(),
            estimate_msgs: 0,
            timeout_ms,
            max_bulks,
            max_bytes,
        }
    }

    /// Add a key, expanding its hash-tag siblings (if any and not already
    /// expanded) via `source.tag_siblings`, preserving tag atomicity.
    pub fn add_key(&mut self, key: &str, source: &impl ValueSource) {
        self.add_key_inner(key, source, None);
    }

    fn add_key_inner(&mut self, key: &str, source: &impl ValueSource, known_crc: Option<u32>) {
        if self.keys.contains(key) {
            return;
        }
        let (_, crc, has_tag) = slot_crc_tag(key);

        self.keys.insert(key.to_string());
        let estimate = source
            .fetch(key)
            .map(|(v, _)| v.element_count().div_ceil(self.max_bulks.max(1)).max(1))
            .unwrap_or(1);
        self.estimate_msgs += estimate;
        self.pending
            .push_back(SingleObjectIterator::new(key.to_string(), self.timeout_ms));

        if has_tag && known_crc.is_none() && self.tag_set.insert(crc) {
            for sibling in source.tag_siblings(crc) {
                if sibling != key {
                    self.add_key_inner(&sibling, source, Some(crc));
                }
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn has_next(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn removed_keys(&self) -> &[String] {
        &self.removed_keys
    }

    pub fn chunked_vals(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.chunked_vals)
    }

    pub fn estimate_msgs(&self) -> usize {
        self.estimate_msgs
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Key and stage of the iterator currently at the head of the queue —
    /// the "in progress right now" entry `MGRT-STATUS`'s `iterator_summary`
    /// reports.
    pub fn current_key_status(&self) -> Option<(&str, IteratorStatus)> {
        self.pending.front().map(|it| (it.key(), it.status()))
    }

    /// Draw the next batch of frames from the head iterator, respecting
    /// `outbound_buffer_size` as the back-pressure signal: the byte budget
    /// handed to the iterator is `max_bytes - outbound_buffer_size`.
    ///
    /// `preamble` must be `Some` exactly once across the *client's* whole
    /// lifetime (not once per batch) — the caller (`MigrationClient`) is
    /// responsible for tracking that, since the connection, not the batch,
    /// is what "first use" refers to in spec terms.
    pub fn next_message(
        &mut self,
        source: &impl ValueSource,
        preamble: Option<Preamble>,
        outbound_buffer_size: usize,
    ) -> Vec<SourceFrame> {
        let Some(mut head) = self.pending.pop_front() else {
            return Vec::new();
        };

        let bytes_budget = self.max_bytes.saturating_sub(outbound_buffer_size);
        let frames = head.next(
            |k| source.fetch(k),
            preamble,
            self.max_bulks,
            bytes_budget.max(1),
        );

        if head.has_next() {
            self.pending.push_front(head);
        } else {
            self.removed_keys.push(head.key().to_string());
            if let Some(val) = head.take_captured_value() {
                self.chunked_vals.push(val);
            }
        }

        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct TestSource {
        values: RefCell<HashMap<String, (Value, Option<u64>)>>,
        tags: HashMap<u32, Vec<String>>,
    }

    impl ValueSource for TestSource {
        fn fetch(&self, key: &str) -> Option<(Value, Option<u64>)> {
            self.values.borrow().get(key).cloned()
        }
        fn tag_siblings(&self, tag_crc: u32) -> Vec<String> {
            self.tags.get(&tag_crc).cloned().unwrap_or_default()
        }
    }

    fn source_with(pairs: &[(&str, Value)]) -> TestSource {
        let mut values = HashMap::new();
        for (k, v) in pairs {
            values.insert(k.to_string(), (v.clone(), None));
        }
        TestSource {
            values: RefCell::new(values),
            tags: HashMap::new(),
        }
    }

    #[test]
    fn add_key_deduplicates() {
        let source = source_with(&[("a", Value::String(b"1".to_vec()))]);
        let mut batch = BatchedObjectIterator::new(1000, 16, 4096);
        batch.add_key("a", &source);
        batch.add_key("a", &source);
        assert_eq!(batch.key_count(), 1);
    }

    #[test]
    fn add_key_expands_tag_siblings() {
        let (_, crc, _) = slot_crc_tag("{g}a");
        let mut tags = HashMap::new();
        tags.insert(crc, vec!["{g}a".to_string(), "{g}b".to_string()]);
        let source = TestSource {
            values: RefCell::new(HashMap::from([
                ("{g}a".to_string(), (Value::String(b"1".to_vec()), None)),
                ("{g}b".to_string(), (Value::String(b"2".to_vec()), None)),
            ])),
            tags,
        };

        let mut batch = BatchedObjectIterator::new(1000, 16, 4096);
        batch.add_key("{g}a", &source);
        assert!(batch.contains("{g}a"));
        assert!(batch.contains("{g}b"));
        assert_eq!(batch.key_count(), 2);
    }

    #[test]
    fn next_message_drains_until_exhausted_and_tracks_removed_keys() {
        let source = source_with(&[
            ("a", Value::String(b"1".to_vec())),
            ("b", Value::String(b"2".to_vec())),
        ]);
        let mut batch = BatchedObjectIterator::new(1000, 16, 4096);
        batch.add_key("a", &source);
        batch.add_key("b", &source);

        let mut total_frames = 0;
        while batch.has_next() {
            let frames = batch.next_message(&source, None, 0);
            total_frames += frames.len();
        }

        assert_eq!(total_frames, 4); // (delete + install) per key
        assert_eq!(batch.removed_keys().len(), 2);
    }

    #[test]
    fn chunked_value_is_queued_for_lazy_release() {
        let items: Vec<Vec<u8>> = (0..50).map(|i| format!("x{i}").into_bytes()).collect();
        let source = source_with(&[("l", Value::List(items))]);
        let mut batch = BatchedObjectIterator::new(1000, 16, usize::MAX);
        batch.add_key("l", &source);

        while batch.has_next() {
            batch.next_message(&source, None, 0);
        }

        assert_eq!(batch.chunked_vals().len(), 1);
    }
}
