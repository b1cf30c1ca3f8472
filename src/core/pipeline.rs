//! Pipeline domain model

use crate::core::{
    config::{PipelineConfig, Variable},
    context::RefContext,
    error::ConfigError,
    job::Job,
    stage::Stages,
};
use crate::planning::{self, PipelinePlan, PlanError};
use std::collections::BTreeMap;
use tracing::debug;

/// A pipeline definition with compiled jobs
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Stage order
    pub stages: Stages,

    /// Global variables available to all jobs
    pub variables: BTreeMap<String, Variable>,

    /// Jobs in document order
    jobs: Vec<Job>,
}

impl Pipeline {
    /// Create a pipeline from configuration
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let jobs = config
            .jobs()
            .iter()
            .map(Job::from_config)
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Compiled {} jobs", jobs.len());

        Ok(Pipeline {
            stages: config.stages.clone(),
            variables: config.variables.clone(),
            jobs,
        })
    }

    /// Stage order, `.pre` first and `.post` last
    pub fn stages(&self) -> &Stages {
        &self.stages
    }

    /// Jobs in document order
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Get a job by name
    pub fn job(&self, name: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.name == name)
    }

    /// Jobs of one stage, in document order
    pub fn jobs_in_stage<'a>(&'a self, stage: &'a str) -> impl Iterator<Item = &'a Job> + 'a {
        self.jobs.iter().filter(move |job| job.stage == stage)
    }

    /// Plan the pipeline that would be created for `context`
    pub fn plan(&self, context: &RefContext) -> Result<PipelinePlan, PlanError> {
        planning::plan::build(self, context)
    }
}
