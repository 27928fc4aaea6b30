//! Cluster Mode - Distributed sharding with hash slots
//!
//! Implements Redis-style cluster mode with:
//! - Hash slot algorithm (CRC32 & SLOT_MASK)
//! - Cluster topology management
//! - Asynchronous, non-blocking slot migration (`dispatcher`/`migration_client`/`receiver`)
//! - Raft consensus for coordination
//! - Automatic failover

pub mod batched_iterator;
pub mod config;
pub mod discovery;
pub mod dispatcher;
pub mod dump;
pub mod failover;
pub mod hash_slot;
pub mod lazy_release;
pub mod migration;
pub mod migration_client;
pub mod object_iterator;
pub mod raft;
pub mod receiver;
pub mod slot_index;
pub mod topology;
pub mod types;
pub mod value;
pub mod wire;

pub use batched_iterator::BatchedObjectIterator;
pub use config::ClusterConfig;
pub use discovery::{ClusterDiscovery, start_discovery_server};
pub use dispatcher::{MigrationDispatcher, MigrationReport, StoreBackend};
pub use failover::ClusterFailover;
pub use hash_slot::{HashSlot, hash_slot};
pub use lazy_release::LazyReleaseWorker;
pub use migration_client::{MigrationClient, MigrationStatus};
pub use object_iterator::{IteratorStatus, SingleObjectIterator};
pub use raft::RaftNode;
pub use receiver::ReceiverCommands;
pub use slot_index::SlotIndex;
pub use topology::{ClusterTopology, NodeInfo};
pub use types::{
    ClusterCommand, ClusterError, ClusterNode, ClusterResult, ClusterState, MigrationError,
    MigrationResult, SlotAssignment, SlotRange, TOTAL_SLOTS, SLOT_MASK,
};
pub use value::Value;

#[cfg(test)]
mod tests;
