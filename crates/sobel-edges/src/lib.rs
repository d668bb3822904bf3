#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the pipeline.
pub mod error;

/// Decode, detect edges and encode in one call.
///
/// See [`pipeline::run`] and [`pipeline::PipelineConfig`].
pub mod pipeline;

pub use crate::error::PipelineError;
pub use crate::pipeline::{detect_edges, output_file_name, run, PipelineConfig};
