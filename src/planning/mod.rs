//! Pipeline planning - which jobs a ref gets, and in what order they may run

pub mod plan;
pub mod scheduler;

pub use plan::{PipelinePlan, PlannedJob, SkippedJob, StagePlan};
pub use scheduler::{PlanScheduler, SchedulingStrategy};

use thiserror::Error;

/// Errors raised while planning a pipeline for a ref
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("Job '{job}' needs '{need}', which is not in the pipeline for this ref")]
    MissingNeed { job: String, need: String },

    #[error("Job '{job}' depends on '{dependency}', which is not in the pipeline for this ref")]
    MissingDependency { job: String, dependency: String },
}
