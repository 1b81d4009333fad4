//! Pipeline entry points.
//!
//! - `run_cache`: Load or rebuild the catalog cache
//! - `run_partition`: Classify ships into tier files and mirror images
//! - `run_details`: Archive per-ship detail records
//! - `run_pipeline`: All of the above in order

pub mod details;
pub mod partition;
pub mod pipeline;

pub use details::run_details;
pub use partition::{Partition, partition, run_partition, summarize};
pub use pipeline::{PipelineOptions, PipelineReport, run_cache, run_pipeline};
