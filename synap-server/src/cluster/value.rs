//! Value model for the slot migration engine.
//!
//! Values captured by an iterator are snapshotted once (at PREPARE) into one
//! of these owned, already-ordered representations, so chunked emission is a
//! plain cursor walk rather than a live scan of a mutable container. This is
//! the "dynamic dispatch over value types" design: a tagged enum with a small
//! interface (`element_count`, `next_chunk`, `encode_whole`) instead of a
//! trait-object hierarchy.

use bincode::{Decode, Encode};

/// A snapshotted value, ready for either whole-payload or chunked transfer.
#[derive(Debug, Clone, Encode, Decode)]
pub enum Value {
    String(Vec<u8>),
    /// Head-to-tail order.
    List(Vec<Vec<u8>>),
    /// `(field, value)` pairs in capture order.
    Hash(Vec<(String, Vec<u8>)>),
    /// Members in capture order.
    Set(Vec<Vec<u8>>),
    /// Highest score first (matches `ReceiverCommands`' append-then-rank semantics).
    SortedSet(Vec<ZMember>),
}

/// A sorted-set member snapshotted with its score.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct ZMember {
    pub member: Vec<u8>,
    pub score: f64,
}

/// One chunk of a composite value's chunked transfer.
#[derive(Debug, Clone)]
pub enum ValueChunk {
    List(Vec<Vec<u8>>),
    Hash(Vec<(String, Vec<u8>)>),
    Set(Vec<Vec<u8>>),
    /// `(member, raw_score_bits)` — bits are `f64::to_bits()`, the exact
    /// pattern the wire frame carries so scores round-trip bit-for-bit.
    SortedSet(Vec<(Vec<u8>, u64)>),
}

impl Value {
    /// Number of elements a composite value holds; `1` for a string (it
    /// never takes the chunked path regardless of this number).
    pub fn element_count(&self) -> usize {
        match self {
            Value::String(_) => 1,
            Value::List(v) => v.len(),
            Value::Hash(v) => v.len(),
            Value::Set(v) => v.len(),
            Value::SortedSet(v) => v.len(),
        }
    }

    pub fn is_composite(&self) -> bool {
        !matches!(self, Value::String(_))
    }

    /// Whole-payload encoding used by the PAYLOAD path for non-string types;
    /// wrapped with a version byte and checksum by `cluster::dump`.
    pub fn encode_whole(&self) -> Vec<u8> {
        bincode::encode_to_vec(self, bincode::config::standard())
            .expect("in-memory Value encoding is infallible")
    }

    /// Slice out the next chunk starting at `cursor`, bounded by `max_bulks`
    /// elements and `max_bytes_budget` bytes (whichever is hit first, but
    /// always making progress by at least one element so a too-small budget
    /// can't stall the transfer). Returns `(chunk, new_cursor, exhausted)`.
    pub fn next_chunk(
        &self,
        cursor: usize,
        max_bulks: usize,
        max_bytes_budget: usize,
    ) -> (ValueChunk, usize, bool) {
        match self {
            Value::String(_) => (ValueChunk::List(Vec::new()), cursor, true),
            Value::List(items) => {
                let (end, chunk) =
                    Self::slice_budget(items, cursor, max_bulks, max_bytes_budget, |e| {
                        e.len() + 8
                    });
                (ValueChunk::List(chunk), end, end >= items.len())
            }
            Value::Hash(items) => {
                let (end, chunk) =
                    Self::slice_budget(items, cursor, max_bulks, max_bytes_budget, |(k, v)| {
                        k.len() + v.len() + 8
                    });
                (ValueChunk::Hash(chunk), end, end >= items.len())
            }
            Value::Set(items) => {
                let (end, chunk) =
                    Self::slice_budget(items, cursor, max_bulks, max_bytes_budget, |e| {
                        e.len() + 8
                    });
                (ValueChunk::Set(chunk), end, end >= items.len())
            }
            Value::SortedSet(items) => {
                let (end, chunk) =
                    Self::slice_budget(items, cursor, max_bulks, max_bytes_budget, |m| {
                        m.member.len() + 16
                    });
                let chunk = chunk
                    .into_iter()
                    .map(|m| (m.member, m.score.to_bits()))
                    .collect();
                (ValueChunk::SortedSet(chunk), end, end >= items.len())
            }
        }
    }

    fn slice_budget<T: Clone>(
        items: &[T],
        cursor: usize,
        max_bulks: usize,
        max_bytes_budget: usize,
        cost: impl Fn(&T) -> usize,
    ) -> (usize, Vec<T>) {
        let mut end = cursor;
        let mut bytes_used = 0usize;
        let cap = max_bulks.max(1);
        while end < items.len() && (end - cursor) < cap {
            let c = cost(&items[end]);
            if bytes_used > 0 && bytes_used + c > max_bytes_budget {
                break;
            }
            bytes_used += c;
            end += 1;
        }
        if end == cursor && items.len() > cursor {
            end = cursor + 1;
        }
        (end, items[cursor..end].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_is_never_composite() {
        let v = Value::String(b"hello".to_vec());
        assert!(!v.is_composite());
        assert_eq!(v.element_count(), 1);
    }

    #[test]
    fn list_chunks_respect_max_bulks() {
        let items: Vec<Vec<u8>> = (0..100).map(|i| format!("x{i}").into_bytes()).collect();
        let value = Value::List(items.clone());
        let (chunk, cursor, exhausted) = value.next_chunk(0, 16, usize::MAX);
        match chunk {
            ValueChunk::List(c) => assert_eq!(c.len(), 16),
            _ => panic!("expected list chunk"),
        }
        assert_eq!(cursor, 16);
        assert!(!exhausted);
    }

    #[test]
    fn list_chunks_make_progress_under_tiny_byte_budget() {
        let items: Vec<Vec<u8>> = vec![vec![0u8; 100], vec![0u8; 100]];
        let value = Value::List(items);
        let (chunk, cursor, _) = value.next_chunk(0, 16, 1);
        match chunk {
            ValueChunk::List(c) => assert_eq!(c.len(), 1),
            _ => panic!("expected list chunk"),
        }
        assert_eq!(cursor, 1);
    }

    #[test]
    fn exhausts_after_full_traversal() {
        let value = Value::Set(vec![b"a".to_vec(), b"b".to_vec()]);
        let (_, cursor, exhausted) = value.next_chunk(0, 16, usize::MAX);
        assert_eq!(cursor, 2);
        assert!(exhausted);
    }

    #[test]
    fn sorted_set_chunk_carries_raw_score_bits() {
        let score = 3.141592653589793_f64;
        let value = Value::SortedSet(vec![ZMember {
            member: b"e".to_vec(),
            score,
        }]);
        let (chunk, _, _) = value.next_chunk(0, 16, usize::MAX);
        match chunk {
            ValueChunk::SortedSet(members) => {
                assert_eq!(members[0].1, score.to_bits());
                assert_eq!(f64::from_bits(members[0].1), score);
            }
            _ => panic!("expected sorted set chunk"),
        }
    }

    #[test]
    fn encode_whole_round_trips() {
        let value = Value::Hash(vec![("f".to_string(), b"v".to_vec())]);
        let bytes = value.encode_whole();
        let (decoded, _): (Value, usize) =
            bincode::decode_from_slice(&bytes, bincode::config::standard()).unwrap();
        match decoded {
            Value::Hash(v) => assert_eq!(v, vec![("f".to_string(), b"v".to_vec())]),
            _ => panic!("expected hash"),
        }
    }
}
