// src/pipeline/mod.rs

//! Per-cycle publication pipeline.

mod publish;

pub use publish::{CycleOutcome, PublishPipeline};
