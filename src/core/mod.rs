//! Core domain models
//!
//! This module defines the pipeline configuration as read from YAML and the
//! compiled pipeline, stage and job models built from it.

pub mod condition;
pub mod config;
pub mod context;
pub mod error;
pub mod job;
pub mod pipeline;
pub mod stage;
pub mod template;

pub use condition::{JobCondition, RefKeyword, RefPattern, RefPolicy, SkipReason};
pub use config::{JobConfig, PipelineConfig};
pub use context::*;
pub use error::ConfigError;
pub use job::Job;
pub use pipeline::Pipeline;
pub use stage::Stages;
