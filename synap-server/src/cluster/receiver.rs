//! `ReceiverCommands` — the destination side of a migration connection.
//! Applies each `SourceFrame` to the local keyspace through a small
//! `ReceiverBackend` trait (so this module never depends on the concrete
//! store types directly, the same seam `ValueSource`/`MigrationBackend` use
//! on the sending side) and answers with one `AckFrame` per frame.
//!
//! Grounded on `replication::master::handle_replica`'s accept-loop shape:
//! one task per connection, reading frames until the stream closes or a
//! handler error forces a shutdown.

use super::dump;
use super::types::MigrationError;
use super::wire::{self, AckFrame, SourceFrame};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

/// What `ReceiverCommands` needs from the keyspace to apply one frame.
/// Every method reports failure through `MigrationError::Semantic` for
/// keyspace-level conflicts (wrong type, key already present, etc.).
pub trait ReceiverBackend: Send + Sync {
    fn authenticate(&self, password: &str) -> Result<(), MigrationError>;
    fn select(&self, db: u32) -> Result<(), MigrationError>;
    /// Idempotent: deleting an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), MigrationError>;
    /// Fails if `key` already exists — every install follows an explicit
    /// `Delete` in the same key's stream, so an existing key means a stale
    /// leftover from an earlier, failed attempt that must be investigated
    /// rather than silently overwritten.
    fn install_string(&self, key: &str, ttl_ms: u64, payload: &[u8]) -> Result<(), MigrationError>;
    fn install_object(&self, key: &str, ttl_ms: u64, payload: &[u8]) -> Result<(), MigrationError>;
    /// Append frames create the key on first call and extend it on
    /// subsequent calls; they fail only if `key` already holds a value of a
    /// different composite kind.
    fn append_list(
        &self,
        key: &str,
        ttl_ms: u64,
        elements: Vec<Vec<u8>>,
    ) -> Result<(), MigrationError>;
    fn append_hash(
        &self,
        key: &str,
        ttl_ms: u64,
        fields: Vec<(String, Vec<u8>)>,
    ) -> Result<(), MigrationError>;
    fn append_set(
        &self,
        key: &str,
        ttl_ms: u64,
        members: Vec<Vec<u8>>,
    ) -> Result<(), MigrationError>;
    fn append_zset(
        &self,
        key: &str,
        ttl_ms: u64,
        members: Vec<(Vec<u8>, u64)>,
    ) -> Result<(), MigrationError>;
    /// Fails if `key` is absent — `Expire` only ever follows a CHUNKED
    /// transfer's last append, so the key must already exist.
    fn expire(&self, key: &str, ttl_ms: u64) -> Result<(), MigrationError>;
}

/// Stateless dispatcher: one instance is shared across every connection,
/// per-connection auth/select state lives in the caller's loop.
pub struct ReceiverCommands<B> {
    backend: Arc<B>,
}

impl<B: ReceiverBackend> ReceiverCommands<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Apply one frame, producing the ack to send back.
    pub fn handle_frame(&self, frame: SourceFrame) -> AckFrame {
        let result = match frame {
            SourceFrame::Auth { password } => self.backend.authenticate(&password),
            SourceFrame::Select { db } => self.backend.select(db),
            SourceFrame::Delete { key } => self.backend.delete(&key),
            SourceFrame::StringInstall { key, ttl_ms, payload } => {
                self.backend.install_string(&key, ttl_ms, &payload)
            }
            SourceFrame::ObjectInstall { key, ttl_ms, payload } => {
                match dump::decode(&payload) {
                    Ok(_) => self.backend.install_object(&key, ttl_ms, &payload),
                    Err(e) => Err(e),
                }
            }
            SourceFrame::ListAppend { key, ttl_ms, elements, .. } => {
                self.backend.append_list(&key, ttl_ms, elements)
            }
            SourceFrame::HashAppend { key, ttl_ms, fields, .. } => {
                self.backend.append_hash(&key, ttl_ms, fields)
            }
            SourceFrame::DictAppend { key, ttl_ms, members, .. } => {
                self.backend.append_set(&key, ttl_ms, members)
            }
            SourceFrame::ZsetAppend { key, ttl_ms, members, .. } => {
                self.backend.append_zset(&key, ttl_ms, members)
            }
            SourceFrame::Expire { key, ttl_ms } => self.backend.expire(&key, ttl_ms),
        };

        match result {
            Ok(()) => AckFrame::ok("OK"),
            Err(e) => AckFrame::error(e.to_string()),
        }
    }

    /// Drive one connection end to end: read frames, apply them, write
    /// acks, and stop at the first handler error or I/O failure — the
    /// source is expected to treat a dropped connection the same way it
    /// treats an explicit error ack.
    pub async fn run_connection<S>(&self, mut stream: S) -> Result<(), MigrationError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        loop {
            let frame: SourceFrame = match wire::read_frame(&mut stream).await {
                Ok(frame) => frame,
                Err(MigrationError::Transport(_)) => {
                    debug!("migration receiver connection closed");
                    return Ok(());
                }
                Err(e) => return Err(e),
            };

            let ack = self.handle_frame(frame);
            let failed = !ack.is_ok();
            wire::write_frame(&mut stream, &ack).await?;

            if failed {
                warn!(message = %ack.message, "migration receiver rejected frame, closing connection");
                return Err(MigrationError::Semantic(ack.message));
            }
        }
    }
}
