//! Binary space partitioning of a POI set into OV2 blocks.

pub mod node;
pub mod partitioner;

pub use node::{NodeIter, PartitionNode};
pub use partitioner::{partition, Partitioner, SplitAxis, DEFAULT_MAX_PER_BLOCK};
