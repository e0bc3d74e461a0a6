//! Pipeline orchestration for the encounter ETL.
//!
//! A run sequences five stages:
//! 1. **extract**: read the source once into memory
//! 2. **normalize**: clean fields and standardize headers
//! 3. **dimensions**: build the four dimension tables (in parallel when enabled)
//! 4. **facts**: resolve every row against the dimensions
//! 5. **load**: hand complete tables to the sink
//!
//! Each stage fails fast with its name attached. The sink is only touched
//! once every in-memory structure is complete, so a failed or cancelled run
//! never leaves a partial load behind.

mod cancel;
mod error;
mod pipeline;
mod report;

pub use cancel::CancelFlag;
pub use error::{PipelineError, PipelineErrorKind, Stage};
pub use pipeline::{PipelineOptions, StarOutput, run_pipeline, transform};
pub use report::{DimensionCount, RunReport, StageTiming};
