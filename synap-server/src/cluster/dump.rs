//! RDB-style object dump codec: `EncodeObject`/`DecodeObject`.
//!
//! Frames are `version byte | crc32(body) as u32 BE | body`, the same
//! metadata+checksum framing `replication::sync::create_snapshot` uses for
//! its snapshots, applied here to a single `Value` instead of a whole
//! keyspace. `body` is the value's native `bincode` encoding (see
//! `Value::encode_whole`), not the teacher's 1.x `bincode::serialize` — this
//! crate pins `bincode = "2.0"`, whose free functions no longer exist.

use super::types::MigrationError;
use super::value::Value;

const DUMP_VERSION: u8 = 1;
const HEADER_LEN: usize = 1 + 4;

/// Encode a value into a versioned, checksummed payload.
pub fn encode(value: &Value) -> Vec<u8> {
    let body = value.encode_whole();
    let checksum = crc32fast::hash(&body);

    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.push(DUMP_VERSION);
    out.extend_from_slice(&checksum.to_be_bytes());
    out.extend_from_slice(&body);
    out
}

/// Decode a payload produced by [`encode`], verifying version and checksum.
pub fn decode(bytes: &[u8]) -> Result<Value, MigrationError> {
    if bytes.len() < HEADER_LEN {
        return Err(MigrationError::Semantic(format!(
            "payload too short: {} bytes",
            bytes.len()
        )));
    }

    let version = bytes[0];
    if version != DUMP_VERSION {
        return Err(MigrationError::Semantic(format!(
            "unsupported dump version {version}"
        )));
    }

    let expected_checksum = u32::from_be_bytes(bytes[1..HEADER_LEN].try_into().unwrap());
    let body = &bytes[HEADER_LEN..];
    let actual_checksum = crc32fast::hash(body);
    if actual_checksum != expected_checksum {
        return Err(MigrationError::Semantic(format!(
            "checksum mismatch: expected {expected_checksum}, got {actual_checksum}"
        )));
    }

    let (value, _) = bincode::decode_from_slice(body, bincode::config::standard())
        .map_err(|e| MigrationError::Semantic(format!("decode error: {e}")))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_hash() {
        let value = Value::Hash(vec![("f".to_string(), b"v".to_vec())]);
        let encoded = encode(&value);
        let decoded = decode(&encoded).unwrap();
        match decoded {
            Value::Hash(v) => assert_eq!(v, vec![("f".to_string(), b"v".to_vec())]),
            _ => panic!("expected hash"),
        }
    }

    #[test]
    fn rejects_truncated_payload() {
        let err = decode(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, MigrationError::Semantic(_)));
    }

    #[test]
    fn rejects_corrupted_checksum() {
        let value = Value::String(b"hi".to_vec());
        let mut encoded = encode(&value);
        let last = encoded.len() - 1;
        encoded[last] ^= 0xff;
        let err = decode(&encoded).unwrap_err();
        assert!(matches!(err, MigrationError::Semantic(_)));
    }

    #[test]
    fn rejects_unknown_version() {
        let value = Value::String(b"hi".to_vec());
        let mut encoded = encode(&value);
        encoded[0] = 0xff;
        let err = decode(&encoded).unwrap_err();
        assert!(matches!(err, MigrationError::Semantic(_)));
    }
}
