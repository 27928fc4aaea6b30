pub mod cache;
pub mod consumer_group;
pub mod error;
pub mod hash;
pub mod kv_store;
pub mod list;
pub mod partition;
pub mod pubsub;
pub mod queue;
pub mod set;
pub mod sorted_set;
pub mod stream;
pub mod types;

pub use cache::{CacheLayer, CacheStats};
pub use consumer_group::{
    AssignmentStrategy, ConsumerGroup, ConsumerGroupConfig, ConsumerGroupManager,
    ConsumerGroupStats, ConsumerMember, GroupState,
};
pub use error::SynapError;
pub use hash::{HashStats, HashStore, HashValue};
pub use kv_store::KVStore;
pub use list::{ListStats, ListStore, ListValue};
pub use partition::{
    CompactionResult, PartitionConfig, PartitionEvent, PartitionManager, PartitionStats,
    PartitionedTopic, RetentionPolicy,
};
pub use pubsub::{
    Message, MessageSender, PubSubRouter, PubSubStats, PublishResult, SubscribeResult, TopicInfo,
};
pub use queue::{QueueConfig, QueueManager, QueueMessage, QueueStats};
pub use set::{SetStats, SetStore, SetValue};
pub use sorted_set::{
    OrderedFloat, ScoredMember, SortedSetStats, SortedSetStore, SortedSetValue, ZAddOptions,
};
pub use stream::{RoomStats, StreamConfig, StreamEvent, StreamManager};
pub use types::{EvictionPolicy, KVConfig, KVStats, StoredValue};
