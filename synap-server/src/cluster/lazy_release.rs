//! `LazyReleaseWorker` — drains committed chunked values off the hot path.
//!
//! A value that went through `SingleObjectIterator`'s CHUNKED path can be
//! large (that's why it chunked at all); dropping it synchronously inside
//! the migration client's ack-loop task would stall every other batch on
//! that connection while the allocator does its thing. Instead the client
//! hands it off to an unbounded channel and a dedicated background task
//! does the drop — the same shape `core::kv_store::start_ttl_cleanup` uses
//! for its own background sweep, just reacting to a channel instead of a
//! timer.

use super::value::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

pub struct LazyReleaseWorker {
    sender: mpsc::UnboundedSender<Value>,
    handle: JoinHandle<()>,
}

impl LazyReleaseWorker {
    pub fn spawn() -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Value>();
        let handle = tokio::spawn(async move {
            let mut released = 0u64;
            while let Some(value) = receiver.recv().await {
                drop(value);
                released += 1;
                if released % 1000 == 0 {
                    debug!(released, "lazy release worker drained values");
                }
            }
        });
        Self { sender, handle }
    }

    /// Hand a value off for deferred drop. If the worker has already shut
    /// down, the channel send itself drops the value inline, which is
    /// harmless since there is no hot path left to protect at that point.
    pub fn release(&self, value: Value) {
        let _ = self.sender.send(value);
    }

    pub fn release_many(&self, values: Vec<Value>) {
        for value in values {
            self.release(value);
        }
    }

    pub async fn shutdown(self) {
        drop(self.sender);
        let _ = self.handle.await;
    }
}
