//! Test utility functions for ciconf

#![allow(dead_code)]

use ciconf::core::{PipelineConfig, RefContext};
use ciconf::planning::PipelinePlan;
use std::path::PathBuf;

/// The pipeline file this repository ships
pub fn repository_pipeline_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(".gitlab-ci.yml")
}

/// Load and validate the pipeline file this repository ships
pub fn repository_pipeline() -> PipelineConfig {
    PipelineConfig::from_file(repository_pipeline_path()).expect("repository pipeline should load")
}

/// Parse and validate an inline pipeline
pub fn load(yaml: &str) -> PipelineConfig {
    PipelineConfig::from_yaml(yaml).expect("pipeline should be valid")
}

/// Plan an inline pipeline for a context
pub fn plan(yaml: &str, context: &RefContext) -> PipelinePlan {
    load(yaml)
        .to_pipeline()
        .expect("pipeline should compile")
        .plan(context)
        .expect("pipeline should plan")
}

/// Names of the planned jobs in stage order
pub fn planned_names(plan: &PipelinePlan) -> Vec<String> {
    plan.jobs().map(|job| job.name.clone()).collect()
}

/// Names of the skipped jobs in document order
pub fn skipped_names(plan: &PipelinePlan) -> Vec<String> {
    plan.skipped.iter().map(|job| job.name.clone()).collect()
}
