//! Hash Slot Algorithm - CRC32 & SLOT_MASK
//!
//! Key-to-slot routing for the migration engine. A key's hash tag (the
//! substring between the first `{` and the next `}`, if non-empty) is hashed
//! instead of the whole key, so tagged keys land in the same slot and can be
//! migrated atomically as a group.

use crate::cluster::types::SLOT_MASK;

/// Extract the hash tag from a key.
///
/// Format: `{tag}rest` — only the tag is hashed. If there's no `{`, no
/// matching `}`, or the braces enclose nothing, the whole key is the tag.
pub fn tag(key: &str) -> &str {
    if let Some(start) = key.find('{') {
        if let Some(end) = key[start + 1..].find('}') {
            if end > 0 {
                return &key[start + 1..start + 1 + end];
            }
        }
    }
    key
}

/// Calculate the hash slot for a key: `crc32(tag(key)) & SLOT_MASK`.
///
/// # Example
/// ```
/// use synap_server::cluster::hash_slot::hash_slot;
///
/// let slot = hash_slot("user:1001");
/// assert!(slot <= synap_server::cluster::types::SLOT_MASK);
///
/// // Hash tags ensure same slot
/// let slot1 = hash_slot("user:{1001}:profile");
/// let slot2 = hash_slot("user:{1001}:settings");
/// assert_eq!(slot1, slot2);
/// ```
pub fn hash_slot(key: &str) -> u16 {
    let crc = crc32fast::hash(tag(key).as_bytes());
    (crc as u16) & SLOT_MASK
}

/// Return `(slot, crc, has_tag)` for a key in one pass — the single
/// authoritative routine producers (`SlotIndex::insert`) and consumers
/// (`BatchedObjectIterator::add_key`) share, rather than recomputing the
/// tag split and CRC separately.
pub fn slot_crc_tag(key: &str) -> (u16, u32, bool) {
    let t = tag(key);
    let crc = crc32fast::hash(t.as_bytes());
    let slot = (crc as u16) & SLOT_MASK;
    (slot, crc, t.len() != key.len())
}

/// Hash slot type wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashSlot(u16);

impl HashSlot {
    /// Create a new hash slot (validates range)
    pub fn new(slot: u16) -> Self {
        assert!(slot <= SLOT_MASK, "slot must be <= SLOT_MASK");
        Self(slot)
    }

    /// Get the slot number
    pub fn value(&self) -> u16 {
        self.0
    }

    /// Calculate hash slot from key
    pub fn from_key(key: &str) -> Self {
        Self(hash_slot(key))
    }
}

impl From<u16> for HashSlot {
    fn from(slot: u16) -> Self {
        Self::new(slot)
    }
}

impl From<HashSlot> for u16 {
    fn from(slot: HashSlot) -> Self {
        slot.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_slot_basic() {
        let slot1 = hash_slot("user:1001");
        let slot2 = hash_slot("user:1002");

        assert!(slot1 <= SLOT_MASK);
        assert!(slot2 <= SLOT_MASK);
    }

    #[test]
    fn test_hash_tag() {
        let slot1 = hash_slot("user:{1001}:profile");
        let slot2 = hash_slot("user:{1001}:settings");
        let slot3 = hash_slot("{1001}");

        assert_eq!(slot1, slot2);
        assert_eq!(slot1, slot3);

        let slot4 = hash_slot("user:{1002}:profile");
        assert_ne!(slot1, slot4);
    }

    #[test]
    fn test_empty_braces_fall_back_to_whole_key() {
        assert_eq!(tag("foo{}bar"), "foo{}bar");
    }

    #[test]
    fn test_hash_slot_consistency() {
        let key = "test:key:12345";
        assert_eq!(hash_slot(key), hash_slot(key));
    }

    #[test]
    fn test_hash_slot_distribution() {
        let mut slots = std::collections::HashSet::new();
        for i in 0..2000 {
            let key = format!("key:{}", i);
            slots.insert(hash_slot(&key));
        }

        assert!(slots.len() > 200);
    }

    #[test]
    fn test_hash_slot_wrapper() {
        let slot = HashSlot::from_key("user:1001");
        assert!(slot.value() <= SLOT_MASK);

        let slot2 = HashSlot::new(500);
        assert_eq!(slot2.value(), 500);
    }

    #[test]
    fn test_slot_crc_tag_matches_hash_slot() {
        let (slot, _crc, has_tag) = slot_crc_tag("{g}a");
        assert_eq!(slot, hash_slot("{g}a"));
        assert!(has_tag);

        let (slot2, _crc2, has_tag2) = slot_crc_tag("plainkey");
        assert_eq!(slot2, hash_slot("plainkey"));
        assert!(!has_tag2);
    }

    #[test]
    fn test_tagged_keys_share_crc() {
        let (_s1, crc1, _) = slot_crc_tag("{g}a");
        let (_s2, crc2, _) = slot_crc_tag("{g}b");
        assert_eq!(crc1, crc2);
    }
}
