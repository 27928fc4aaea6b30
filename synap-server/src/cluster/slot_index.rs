//! Per-database slot index: `slot -> {keys}` plus a tag-ordered index for
//! hash-tag range scans, used to pick migration candidates and to enforce
//! tag atomicity ("migrating one tagged key migrates all its siblings").

use super::hash_slot::slot_crc_tag;
use super::types::TOTAL_SLOTS;
use parking_lot::RwLock;
use rand::seq::IteratorRandom;
use std::collections::{BTreeSet, HashSet};
use std::ops::Bound;

struct Inner {
    by_slot: Vec<HashSet<String>>,
    /// Ordered by `(crc(tag), key)` so `tag_range` is a contiguous scan.
    by_tag: BTreeSet<(u32, String)>,
}

/// Maintains, for one database, the slot→keys mapping and tag index that
/// back `RandomFromSlot`/`TagRange`/`CheckInvariants`.
pub struct SlotIndex {
    inner: RwLock<Inner>,
}

impl Default for SlotIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotIndex {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                by_slot: (0..=TOTAL_SLOTS - 1).map(|_| HashSet::new()).collect(),
                by_tag: BTreeSet::new(),
            }),
        }
    }

    /// Idempotent: inserting an already-present key is a no-op.
    pub fn insert(&self, key: &str) {
        let (slot, crc, has_tag) = slot_crc_tag(key);
        let mut inner = self.inner.write();
        inner.by_slot[slot as usize].insert(key.to_string());
        if has_tag {
            inner.by_tag.insert((crc, key.to_string()));
        }
    }

    /// Idempotent: removing an absent key is a no-op.
    pub fn remove(&self, key: &str) {
        let (slot, crc, has_tag) = slot_crc_tag(key);
        let mut inner = self.inner.write();
        inner.by_slot[slot as usize].remove(key);
        if has_tag {
            inner.by_tag.remove(&(crc, key.to_string()));
        }
    }

    pub fn enumerate_slot(&self, slot: u16) -> Vec<String> {
        self.inner.read().by_slot[slot as usize]
            .iter()
            .cloned()
            .collect()
    }

    pub fn slot_len(&self, slot: u16) -> usize {
        self.inner.read().by_slot[slot as usize].len()
    }

    pub fn random_from_slot(&self, slot: u16) -> Option<String> {
        let inner = self.inner.read();
        let mut rng = rand::thread_rng();
        inner.by_slot[slot as usize].iter().choose(&mut rng).cloned()
    }

    /// All keys sharing `crc(tag(k))`, in tag-index order.
    pub fn tag_range(&self, crc: u32) -> Vec<String> {
        let inner = self.inner.read();
        inner
            .by_tag
            .range((Bound::Included((crc, String::new())), Bound::Unbounded))
            .take_while(|(c, _)| *c == crc)
            .map(|(_, key)| key.clone())
            .collect()
    }

    /// Read-only consistency check. Returns the first key that violates an
    /// invariant, or `None` if the index is consistent. `key_exists` checks
    /// membership in the main keyspace.
    pub fn check_invariants(&self, key_exists: impl Fn(&str) -> bool) -> Option<String> {
        let inner = self.inner.read();

        for (slot, keys) in inner.by_slot.iter().enumerate() {
            for key in keys {
                let (actual_slot, crc, has_tag) = slot_crc_tag(key);
                if actual_slot as usize != slot {
                    return Some(key.clone());
                }
                if !key_exists(key) {
                    return Some(key.clone());
                }
                if has_tag && !inner.by_tag.contains(&(crc, key.clone())) {
                    return Some(key.clone());
                }
            }
        }

        for (crc, key) in inner.by_tag.iter() {
            let (_, actual_crc, has_tag) = slot_crc_tag(key);
            if !has_tag || actual_crc != *crc {
                return Some(key.clone());
            }
        }

        None
    }
}
