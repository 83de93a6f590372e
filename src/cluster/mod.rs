//! Distributed fitness evaluation.
//!
//! The population is split into equal contiguous shards: the coordinator
//! keeps shard 0 and every worker thread evaluates one of the others.

pub mod coordinator;
pub mod partition;
pub mod worker;

pub use coordinator::Coordinator;
pub use partition::{partition, ShardRange};
pub use worker::{FitnessWorker, ShardRequest, ShardWorker, WorkerMessage, WorkerReply};
