//! Wire frames for the migration protocol.
//!
//! `replication::master::handle_replica` writes back-to-back `bincode`-
//! serialized frames onto a raw `TcpStream` with no length delimiter, which
//! cannot reliably disambiguate message boundaries on a stream socket. This
//! module fixes that: every frame is preceded by a 4-byte big-endian length
//! prefix, matching the "RESTORE-ASYNC *" multi-bulk framing in spirit while
//! staying a plain binary protocol internally.

use super::types::MigrationError;
use bincode::{Decode, Encode};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Source → destination frames.
#[derive(Debug, Clone, Encode, Decode)]
pub enum SourceFrame {
    Auth {
        password: String,
    },
    Select {
        db: u32,
    },
    Delete {
        key: String,
    },
    StringInstall {
        key: String,
        ttl_ms: u64,
        payload: Vec<u8>,
    },
    ObjectInstall {
        key: String,
        ttl_ms: u64,
        payload: Vec<u8>,
    },
    ListAppend {
        key: String,
        ttl_ms: u64,
        hint: u64,
        elements: Vec<Vec<u8>>,
    },
    HashAppend {
        key: String,
        ttl_ms: u64,
        hint: u64,
        fields: Vec<(String, Vec<u8>)>,
    },
    DictAppend {
        key: String,
        ttl_ms: u64,
        hint: u64,
        members: Vec<Vec<u8>>,
    },
    /// `members` carries `(member, raw_score_bits)`; `raw_score_bits` is
    /// `f64::to_bits()`, so scores round-trip bit-exactly instead of
    /// through a decimal-text representation.
    ZsetAppend {
        key: String,
        ttl_ms: u64,
        hint: u64,
        members: Vec<(Vec<u8>, u64)>,
    },
    Expire {
        key: String,
        ttl_ms: u64,
    },
}

/// Destination → source per-message acknowledgement. `errcode == 0` is
/// success; any other value aborts the batch.
#[derive(Debug, Clone, Encode, Decode)]
pub struct AckFrame {
    pub errcode: i32,
    pub message: String,
}

impl AckFrame {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            errcode: 0,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            errcode: -1,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errcode == 0
    }
}

const MAX_FRAME_BYTES: u32 = 64 * 1024 * 1024;

/// Write one length-prefixed frame.
pub async fn write_frame<W, T>(writer: &mut W, frame: &T) -> Result<(), MigrationError>
where
    W: AsyncWrite + Unpin,
    T: Encode,
{
    let body = bincode::encode_to_vec(frame, bincode::config::standard())
        .map_err(|e| MigrationError::Protocol(format!("encode error: {e}")))?;
    let len = body.len() as u32;
    writer
        .write_all(&len.to_be_bytes())
        .await
        .map_err(|e| MigrationError::Transport(e.to_string()))?;
    writer
        .write_all(&body)
        .await
        .map_err(|e| MigrationError::Transport(e.to_string()))?;
    Ok(())
}

/// Read one length-prefixed frame.
pub async fn read_frame<R, T>(reader: &mut R) -> Result<T, MigrationError>
where
    R: AsyncRead + Unpin,
    T: Decode<()>,
{
    let mut len_buf = [0u8; 4];
    reader
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| MigrationError::Transport(e.to_string()))?;
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_FRAME_BYTES {
        return Err(MigrationError::Protocol(format!(
            "frame of {len} bytes exceeds the {MAX_FRAME_BYTES} byte limit"
        )));
    }

    let mut body = vec![0u8; len as usize];
    reader
        .read_exact(&mut body)
        .await
        .map_err(|e| MigrationError::Transport(e.to_string()))?;

    let (frame, _) = bincode::decode_from_slice(&body, bincode::config::standard())
        .map_err(|e| MigrationError::Protocol(format!("decode error: {e}")))?;
    Ok(frame)
}
