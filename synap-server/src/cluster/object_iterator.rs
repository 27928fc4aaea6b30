//! `SingleObjectIterator` — turns one `(key, value)` into a sequence of wire
//! messages. Modeled as an explicit state machine (fields on the struct, not
//! a coroutine/generator) so pause/resume across event-loop ticks is just
//! "call `next` again with whatever budget is available this tick".
//!
//! ```text
//! PREPARE ──has_value?──► CHUNKED  (large composite) ──exhausted──► FILLTTL ─► DONE
//!         └─────────────► PAYLOAD   (small or string)                      ──► DONE
//!         └─no value────► DONE
//! ```

use super::dump;
use super::value::{Value, ValueChunk};
use super::wire::SourceFrame;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IteratorStatus {
    Prepare,
    Payload,
    Chunked,
    FillTtl,
    Done,
}

/// Connection-level preamble, emitted once per `MigrationClient` by whichever
/// key's iterator runs first.
#[derive(Debug, Clone)]
pub struct Preamble {
    pub password: Option<String>,
    pub db: u32,
}

/// A defensive upper bound used for the TTL carried by CHUNKED append
/// messages; the real TTL is only applied at FILLTTL. A failed transfer
/// leaves the destination holding a partially built value under this bound,
/// which is acceptable because every retry begins with a fresh `delete key`.
pub fn chunk_ttl_ms(timeout_ms: u64) -> u64 {
    timeout_ms.saturating_mul(3).max(1)
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before epoch")
        .as_millis() as u64
}

/// Per-key iterator. Created when a key is added to a `BatchedObjectIterator`,
/// dropped once it reaches `Done`.
pub struct SingleObjectIterator {
    key: String,
    status: IteratorStatus,
    val: Option<Value>,
    expire_at_ms: Option<u64>,
    cursor: usize,
    timeout_ms: u64,
}

impl SingleObjectIterator {
    pub fn new(key: String, timeout_ms: u64) -> Self {
        Self {
            key,
            status: IteratorStatus::Prepare,
            val: None,
            expire_at_ms: None,
            cursor: 0,
            timeout_ms,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn status(&self) -> IteratorStatus {
        self.status
    }

    pub fn has_next(&self) -> bool {
        self.status != IteratorStatus::Done
    }

    /// Take the captured value, if still held. The PAYLOAD path consumes it
    /// immediately when emitting its install frame; the CHUNKED path leaves
    /// it in place until DONE, so a `Some` here once `status() == Done`
    /// means the value must be handed to `LazyReleaseWorker`.
    pub fn take_captured_value(&mut self) -> Option<Value> {
        self.val.take()
    }

    /// Advance the state machine by one step, emitting the frames produced.
    ///
    /// `fetch` is called exactly once, from PREPARE, to snapshot the value.
    /// `preamble` is `Some` only on the very first call for the owning
    /// client; the iterator prepends auth/select frames in that case.
    pub fn next(
        &mut self,
        fetch: impl FnOnce(&str) -> Option<(Value, Option<u64>)>,
        preamble: Option<Preamble>,
        max_bulks: usize,
        max_bytes_budget: usize,
    ) -> Vec<SourceFrame> {
        let mut frames = Vec::new();

        if self.status == IteratorStatus::Prepare {
            match fetch(&self.key) {
                None => {
                    self.status = IteratorStatus::Done;
                    return frames;
                }
                Some((val, ttl_ms)) => {
                    if let Some(p) = preamble {
                        if let Some(password) = p.password {
                            frames.push(SourceFrame::Auth { password });
                        }
                        frames.push(SourceFrame::Select { db: p.db });
                    }
                    frames.push(SourceFrame::Delete {
                        key: self.key.clone(),
                    });
                    self.expire_at_ms = ttl_ms.map(|ttl| now_ms() + ttl);
                    let chunked = val.is_composite() && val.element_count() > max_bulks;
                    self.val = Some(val);
                    self.status = if chunked {
                        IteratorStatus::Chunked
                    } else {
                        IteratorStatus::Payload
                    };
                }
            }
        }

        match self.status {
            IteratorStatus::Payload => {
                let val = self
                    .val
                    .take()
                    .expect("payload stage always has a captured value");
                let ttl_ms = self.remaining_ttl_ms();
                let frame = match &val {
                    Value::String(bytes) => SourceFrame::StringInstall {
                        key: self.key.clone(),
                        ttl_ms,
                        payload: bytes.clone(),
                    },
                    other => SourceFrame::ObjectInstall {
                        key: self.key.clone(),
                        ttl_ms,
                        payload: dump::encode(other),
                    },
                };
                frames.push(frame);
                self.status = IteratorStatus::Done;
            }
            IteratorStatus::Chunked => {
                let val = self
                    .val
                    .as_ref()
                    .expect("chunked stage always has a captured value");
                let hint = val.element_count() as u64;
                let ttl_ms = chunk_ttl_ms(self.timeout_ms);
                let (chunk, new_cursor, exhausted) =
                    val.next_chunk(self.cursor, max_bulks, max_bytes_budget);
                self.cursor = new_cursor;

                let frame = match chunk {
                    ValueChunk::List(elements) => SourceFrame::ListAppend {
                        key: self.key.clone(),
                        ttl_ms,
                        hint,
                        elements,
                    },
                    ValueChunk::Hash(fields) => SourceFrame::HashAppend {
                        key: self.key.clone(),
                        ttl_ms,
                        hint,
                        fields,
                    },
                    ValueChunk::Set(members) => SourceFrame::DictAppend {
                        key: self.key.clone(),
                        ttl_ms,
                        hint,
                        members,
                    },
                    ValueChunk::SortedSet(members) => SourceFrame::ZsetAppend {
                        key: self.key.clone(),
                        ttl_ms,
                        hint,
                        members,
                    },
                };
                frames.push(frame);

                if exhausted {
                    self.status = IteratorStatus::FillTtl;
                }
            }
            IteratorStatus::FillTtl => {
                frames.push(SourceFrame::Expire {
                    key: self.key.clone(),
                    ttl_ms: self.remaining_ttl_ms(),
                });
                self.status = IteratorStatus::Done;
            }
            IteratorStatus::Prepare | IteratorStatus::Done => {}
        }

        frames
    }

    fn remaining_ttl_ms(&self) -> u64 {
        match self.expire_at_ms {
            None => 0,
            Some(deadline) => {
                let now = now_ms();
                if now >= deadline { 1 } else { deadline - now }
            }
        }
    }
}
