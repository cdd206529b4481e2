pub mod cli;
pub mod config;
pub mod encoder;
pub mod error;
pub mod format;
pub mod index;
pub mod loader;
pub mod optimizer;
pub mod partition;
pub mod poi;

// Re-export the main public surface
pub use config::Ov2Config;
pub use encoder::{build_and_encode, encode, NoProgress, Progress, TreeEncoder};
pub use error::{Ov2Error, Result};
pub use index::PoiIndex;
pub use loader::{LoadOutcome, Loader};
pub use optimizer::{FileOutcome, InputKind, Optimizer, TreeStats};
pub use partition::{partition, PartitionNode, Partitioner, SplitAxis};
pub use poi::{BoundingRect, PoiRecord};
