//! ciconf - load, expand, validate and plan GitLab-style CI pipelines

pub mod cli;
pub mod core;
pub mod planning;

// Re-export commonly used types
pub use core::{ConfigError, Job, Pipeline, PipelineConfig, PipelineSource, RefContext, Stages};
pub use planning::{PipelinePlan, PlanError, SchedulingStrategy};
