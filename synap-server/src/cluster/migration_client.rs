//! `MigrationClient` — the outbound side of one migration: owns the TCP
//! connection to a destination `(db, host, port)`, the send buffer/in-flight
//! count, the fence queue of suspended callers, and the commit logic that
//! runs once every message has been acknowledged.
//!
//! Grounded on `replication::master`'s accept/connect-then-spawn shape, but
//! using a `tokio::sync::Mutex` around all mutable state rather than raw
//! `parking_lot`, since every mutation here is paired with an `.await` on
//! the socket — the whole point of spec.md's "single-threaded cooperative"
//! scheduling model is that these operations never interleave.

use super::batched_iterator::{BatchedObjectIterator, ValueSource};
use super::lazy_release::LazyReleaseWorker;
use super::object_iterator::Preamble;
use super::types::{MigrationError, MigrationResult};
use super::value::Value;
use super::wire::{self, AckFrame, SourceFrame};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{Mutex, oneshot};
use tracing::{debug, info, warn};

/// `MGRT-STATUS`'s reported shape (spec.md §6): everything a caller needs to
/// judge whether a pooled connection is healthy, idle, or mid-batch, without
/// reaching into `MigrationClient`'s internals.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationStatus {
    pub host: String,
    pub port: u16,
    pub used: bool,
    pub timeout_ms: u64,
    pub last_activity_ms: u64,
    pub since_last_activity_ms: u64,
    pub sending_msgs: usize,
    pub blocked_clients: usize,
    pub iterator_summary: Option<String>,
}

/// Anything a `MigrationClient` needs from the keyspace beyond reading
/// values: deleting keys once a batch commits.
pub trait MigrationBackend: ValueSource {
    fn delete_keys(&self, keys: &[String]) -> usize;
}

/// Result of a committed batch: a flat key-list migration reports just the
/// removed count; a slot migration also reports what's left in the slot.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub removed_count: usize,
    pub remaining_in_slot: Option<usize>,
}

pub type FenceResult = MigrationResult<BatchOutcome>;

struct Shared {
    db: u32,
    password: Option<String>,
    writer: OwnedWriteHalf,
    /// Byte size of each message sent but not yet acked, in send order —
    /// `sending_msgs` is this queue's length.
    in_flight: VecDeque<usize>,
    outbound_buffer_size: usize,
    batch: Option<BatchedObjectIterator>,
    backend: Option<Arc<dyn MigrationBackend>>,
    remaining_in_slot: Option<usize>,
    fence_queue: Vec<oneshot::Sender<FenceResult>>,
    last_activity: Instant,
    migration_timeout: Duration,
    preamble_sent: bool,
    closed: bool,
}

/// Outbound side of one `(db, host, port)` migration connection.
pub struct MigrationClient {
    host: String,
    port: u16,
    max_bytes: usize,
    lazy_release: Arc<LazyReleaseWorker>,
    /// Monotonic baseline `last_activity_ms` is reported relative to — this
    /// crate has no wall-clock timestamp on `Shared`, only `Instant`s.
    created_at: Instant,
    state: Mutex<Shared>,
}

impl MigrationClient {
    /// Open the connection and spawn the ack-reading background task.
    /// `handshake_timeout` bounds the TCP connect only.
    pub async fn connect(
        host: String,
        port: u16,
        db: u32,
        password: Option<String>,
        max_bytes: usize,
        handshake_timeout: Duration,
        idle_migration_timeout: Duration,
        lazy_release: Arc<LazyReleaseWorker>,
    ) -> MigrationResult<Arc<Self>> {
        let addr = format!("{host}:{port}");
        let stream = tokio::time::timeout(handshake_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| MigrationError::Transport(format!("handshake timeout connecting {addr}")))?
            .map_err(|e| MigrationError::Transport(format!("connect {addr}: {e}")))?;

        let (read_half, write_half) = stream.into_split();

        let client = Arc::new(Self {
            host,
            port,
            max_bytes,
            lazy_release,
            created_at: Instant::now(),
            state: Mutex::new(Shared {
                db,
                password,
                writer: write_half,
                in_flight: VecDeque::new(),
                outbound_buffer_size: 0,
                batch: None,
                backend: None,
                remaining_in_slot: None,
                fence_queue: Vec::new(),
                last_activity: Instant::now(),
                migration_timeout: idle_migration_timeout,
                preamble_sent: false,
                closed: false,
            }),
        });

        let reader_client = Arc::clone(&client);
        tokio::spawn(async move { reader_client.ack_loop(read_half).await });

        Ok(client)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Attach a batch, prime the pipeline, and suspend the caller on the
    /// fence queue until the batch commits or fails. Returns a "being
    /// migrated" error if this client already has a batch in flight — the
    /// at-most-one-migration-per-client invariant.
    pub async fn start_migration(
        self: &Arc<Self>,
        batch: BatchedObjectIterator,
        backend: Arc<dyn MigrationBackend>,
        migration_timeout: Duration,
    ) -> MigrationResult<oneshot::Receiver<FenceResult>> {
        let mut state = self.state.lock().await;
        if state.batch.is_some() {
            return Err(MigrationError::AlreadyMigrating {
                db: state.db,
                host: self.host.clone(),
                port: self.port,
            });
        }

        state.batch = Some(batch);
        state.backend = Some(backend);
        state.migration_timeout = migration_timeout;
        state.last_activity = Instant::now();

        self.pump(&mut state).await?;

        let (tx, rx) = oneshot::channel();
        state.fence_queue.push(tx);
        Ok(rx)
    }

    /// Register an additional caller on the current batch's fence queue
    /// without starting a new one — used by `MGRT-FENCE`.
    pub async fn fence(&self) -> MigrationResult<oneshot::Receiver<FenceResult>> {
        let mut state = self.state.lock().await;
        if state.batch.is_none() {
            return Err(MigrationError::Validation(
                "no migration in progress to fence on".to_string(),
            ));
        }
        let (tx, rx) = oneshot::channel();
        state.fence_queue.push(tx);
        Ok(rx)
    }

    /// Close the connection; every fenced caller observes "canceled".
    pub async fn cancel(&self) {
        let mut state = self.state.lock().await;
        state.closed = true;
        Self::fail_all(&mut state, MigrationError::Canceled);
        let _ = state.writer.shutdown().await;
    }

    pub async fn is_idle(&self) -> bool {
        self.state.lock().await.batch.is_none()
    }

    /// Whether `key` is owned by this client's currently-attached batch —
    /// `EXEC-WRAPPER` consults this for flat key-list migrations, which
    /// never touch `SlotMigrationManager`'s routing map.
    pub async fn batch_contains(&self, key: &str) -> bool {
        self.state
            .lock()
            .await
            .batch
            .as_ref()
            .map(|b| b.contains(key))
            .unwrap_or(false)
    }

    /// Snapshot this client's state for `MGRT-STATUS`. `idle_timeout` is the
    /// dispatcher's configured idle reap interval, reported as `timeout_ms`
    /// when no batch is attached (the migration timeout applies instead once
    /// one is).
    pub async fn status(&self, idle_timeout: Duration) -> MigrationStatus {
        let state = self.state.lock().await;
        let used = state.batch.is_some();
        let timeout_ms = if used {
            state.migration_timeout.as_millis() as u64
        } else {
            idle_timeout.as_millis() as u64
        };
        let iterator_summary = state
            .batch
            .as_ref()
            .and_then(|b| b.current_key_status())
            .map(|(key, status)| format!("{key}: {status:?}"));

        MigrationStatus {
            host: self.host.clone(),
            port: self.port,
            used,
            timeout_ms,
            last_activity_ms: state
                .last_activity
                .duration_since(self.created_at)
                .as_millis() as u64,
            since_last_activity_ms: state.last_activity.elapsed().as_millis() as u64,
            sending_msgs: state.in_flight.len(),
            blocked_clients: state.fence_queue.len(),
            iterator_summary,
        }
    }

    /// Periodic reaper hook: close this client if it has breached its idle
    /// or migration timeout.
    pub async fn sweep(&self, idle_timeout: Duration) -> bool {
        let mut state = self.state.lock().await;
        if state.closed {
            return true;
        }
        let elapsed = state.last_activity.elapsed();
        let breached = if state.batch.is_some() {
            elapsed > state.migration_timeout
        } else {
            elapsed > idle_timeout
        };
        if breached {
            warn!(
                host = %self.host, port = self.port,
                "reaping migration client: idle/migration timeout exceeded"
            );
            state.closed = true;
            let reason = if state.batch.is_some() {
                MigrationError::Transport("migration timeout".to_string())
            } else {
                MigrationError::Transport("idle timeout".to_string())
            };
            Self::fail_all(&mut state, reason);
            let _ = state.writer.shutdown().await;
        }
        state.closed
    }

    async fn ack_loop(self: Arc<Self>, mut read_half: tokio::net::tcp::OwnedReadHalf) {
        loop {
            let ack: AckFrame = match wire::read_frame(&mut read_half).await {
                Ok(ack) => ack,
                Err(e) => {
                    let mut state = self.state.lock().await;
                    if !state.closed {
                        warn!(host = %self.host, port = self.port, error = %e, "connection lost");
                        Self::fail_all(&mut state, MigrationError::Transport(e.to_string()));
                        state.closed = true;
                    }
                    return;
                }
            };

            if let Err(e) = self.on_ack(ack).await {
                debug!(host = %self.host, port = self.port, error = %e, "batch aborted");
                return;
            }
        }
    }

    async fn on_ack(&self, ack: AckFrame) -> MigrationResult<()> {
        let mut state = self.state.lock().await;
        state.last_activity = Instant::now();

        let msg_size = state.in_flight.pop_front().unwrap_or(0);
        state.outbound_buffer_size = state.outbound_buffer_size.saturating_sub(msg_size);

        if !ack.is_ok() {
            let err = MigrationError::AckError(ack.message);
            state.batch = None;
            state.backend = None;
            Self::fail_all(&mut state, err.clone());
            let _ = state.writer.shutdown().await;
            state.closed = true;
            return Err(err);
        }

        self.pump(&mut state).await?;

        let done = state
            .batch
            .as_ref()
            .map(|b| !b.has_next())
            .unwrap_or(false)
            && state.in_flight.is_empty();

        if done {
            self.commit(&mut state);
        }

        Ok(())
    }

    /// Draw and send frames until either the outbound byte budget is spent
    /// or the batch's iterator is exhausted.
    async fn pump(&self, state: &mut Shared) -> MigrationResult<()> {
        loop {
            if state.outbound_buffer_size >= self.max_bytes {
                return Ok(());
            }
            let Some(backend) = state.backend.clone() else {
                return Ok(());
            };
            let Some(batch) = state.batch.as_mut() else {
                return Ok(());
            };
            if !batch.has_next() {
                return Ok(());
            }

            // The preamble is only really "spent" once an iterator actually
            // emits it (a first key whose value has already vanished emits
            // nothing, per object_iterator's PREPARE step, and must not
            // burn the client's one-time preamble) — checked against the
            // returned frames below rather than assumed up front.
            let preamble = if !state.preamble_sent {
                Some(Preamble {
                    password: state.password.clone(),
                    db: state.db,
                })
            } else {
                None
            };
            let offering_preamble = preamble.is_some();

            let frames = batch.next_message(backend.as_ref(), preamble, state.outbound_buffer_size);
            if offering_preamble && frames.iter().any(|f| matches!(f, SourceFrame::Select { .. })) {
                state.preamble_sent = true;
            }
            if frames.is_empty() {
                // Forward progress was still made (a missing key was
                // consumed from the batch); keep draining instead of
                // treating an empty frame set as budget exhaustion.
                continue;
            }

            for frame in frames {
                self.send_frame(state, &frame).await?;
            }
        }
    }

    async fn send_frame(&self, state: &mut Shared, frame: &SourceFrame) -> MigrationResult<()> {
        let body = bincode::encode_to_vec(frame, bincode::config::standard())
            .map_err(|e| MigrationError::Protocol(e.to_string()))?;
        let len = body.len() as u32;

        state
            .writer
            .write_all(&len.to_be_bytes())
            .await
            .map_err(|e| MigrationError::Transport(e.to_string()))?;
        state
            .writer
            .write_all(&body)
            .await
            .map_err(|e| MigrationError::Transport(e.to_string()))?;

        state.in_flight.push_back(body.len());
        state.outbound_buffer_size += body.len();
        state.last_activity = Instant::now();
        Ok(())
    }

    /// (a) delete removed keys, (b) hand chunked values to the lazy release
    /// worker so the drop happens off this task, (c) free the iterator, (d)
    /// wake every fenced caller.
    fn commit(&self, state: &mut Shared) {
        let Some(mut batch) = state.batch.take() else {
            return;
        };
        let backend = state.backend.take();

        let removed_count = if let Some(backend) = &backend {
            backend.delete_keys(batch.removed_keys())
        } else {
            0
        };

        self.lazy_release.release_many(batch.chunked_vals());

        info!(
            host = %self.host, port = self.port,
            removed_count, "migration batch committed"
        );

        let outcome = BatchOutcome {
            removed_count,
            remaining_in_slot: state.remaining_in_slot.take(),
        };
        for tx in state.fence_queue.drain(..) {
            let _ = tx.send(Ok(outcome.clone()));
        }
    }

    fn fail_all(state: &mut Shared, err: MigrationError) {
        state.batch = None;
        state.backend = None;
        state.in_flight.clear();
        state.outbound_buffer_size = 0;
        for tx in state.fence_queue.drain(..) {
            let _ = tx.send(Err(err.clone()));
        }
    }

    /// Record the slot-level "keys still left in the slot" count reported
    /// alongside slot-variant commits.
    pub async fn set_remaining_in_slot(&self, remaining: usize) {
        self.state.lock().await.remaining_in_slot = Some(remaining);
    }
}

#[allow(dead_code)]
fn _assert_value_is_clonable(v: &Value) -> Value {
    v.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::hash_slot::slot_crc_tag;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt as _};

    struct TestBackend {
        values: std::sync::Mutex<HashMap<String, (Value, Option<u64>)>>,
    }

    impl ValueSource for TestBackend {
        fn fetch(&self, key: &str) -> Option<(Value, Option<u64>)> {
            self.values.lock().unwrap().get(key).cloned()
        }
        fn tag_siblings(&self, _tag_crc: u32) -> Vec<String> {
            Vec::new()
        }
    }

    impl MigrationBackend for TestBackend {
        fn delete_keys(&self, keys: &[String]) -> usize {
            let mut values = self.values.lock().unwrap();
            keys.iter().filter(|k| values.remove(*k).is_some()).count()
        }
    }

    async fn fake_destination(listener: tokio::net::TcpListener) {
        let (mut socket, _) = listener.accept().await.unwrap();
        loop {
            let mut len_buf = [0u8; 4];
            if socket.read_exact(&mut len_buf).await.is_err() {
                return;
            }
            let len = u32::from_be_bytes(len_buf) as usize;
            let mut body = vec![0u8; len];
            if socket.read_exact(&mut body).await.is_err() {
                return;
            }
            let ack = AckFrame::ok("1");
            let ack_body = bincode::encode_to_vec(&ack, bincode::config::standard()).unwrap();
            let ack_len = (ack_body.len() as u32).to_be_bytes();
            if socket.write_all(&ack_len).await.is_err() || socket.write_all(&ack_body).await.is_err() {
                return;
            }
        }
    }

    #[tokio::test]
    async fn single_small_key_migrates_and_commits() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(fake_destination(listener));

        let backend = Arc::new(TestBackend {
            values: std::sync::Mutex::new(HashMap::from([(
                "k".to_string(),
                (Value::String(b"v".to_vec()), None),
            )])),
        });

        let client = MigrationClient::connect(
            addr.ip().to_string(),
            addr.port(),
            0,
            None,
            4096,
            Duration::from_secs(1),
            Duration::from_secs(60),
            Arc::new(LazyReleaseWorker::spawn()),
        )
        .await
        .unwrap();

        let mut batch = BatchedObjectIterator::new(1000, 16, 4096);
        batch.add_key("k", backend.as_ref());

        let rx = client
            .start_migration(batch, backend.clone() as Arc<dyn MigrationBackend>, Duration::from_secs(5))
            .await
            .unwrap();

        let outcome = tokio::time::timeout(Duration::from_secs(2), rx)
            .await
            .expect("fence should resolve")
            .expect("channel should not be dropped")
            .expect("batch should succeed");

        assert_eq!(outcome.removed_count, 1);
        assert!(backend.values.lock().unwrap().get("k").is_none());
    }

    #[tokio::test]
    async fn second_migration_while_one_in_flight_is_rejected() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            // Never ack; first batch stays pending.
            std::future::pending::<()>().await;
        });

        let backend = Arc::new(TestBackend {
            values: std::sync::Mutex::new(HashMap::from([(
                "k".to_string(),
                (Value::String(b"v".to_vec()), None),
            )])),
        });

        let client = MigrationClient::connect(
            addr.ip().to_string(),
            addr.port(),
            0,
            None,
            4096,
            Duration::from_secs(1),
            Duration::from_secs(60),
            Arc::new(LazyReleaseWorker::spawn()),
        )
        .await
        .unwrap();

        let mut batch = BatchedObjectIterator::new(1000, 16, 4096);
        batch.add_key("k", backend.as_ref());
        let _rx = client
            .start_migration(batch, backend.clone() as Arc<dyn MigrationBackend>, Duration::from_secs(5))
            .await
            .unwrap();

        let mut second = BatchedObjectIterator::new(1000, 16, 4096);
        second.add_key("k", backend.as_ref());
        let result = client
            .start_migration(second, backend as Arc<dyn MigrationBackend>, Duration::from_secs(5))
            .await;

        assert!(matches!(result, Err(MigrationError::AlreadyMigrating { .. })));
    }

    #[test]
    fn tag_helper_is_reexported_for_callers() {
        let (_, crc, has_tag) = slot_crc_tag("{g}a");
        assert!(has_tag);
        assert!(crc > 0 || crc == 0); // just exercising the import
    }
}
