//! Job domain model

use crate::core::{
    condition::{JobCondition, RefPolicy, SkipReason},
    config::{InheritFilter, JobConfig, Need, Script, When},
    context::RefContext,
    error::ConfigError,
};
use std::collections::BTreeMap;

/// A single job in a pipeline, with its ref predicates compiled
#[derive(Debug, Clone)]
pub struct Job {
    /// Job name
    pub name: String,

    /// Stage the job belongs to
    pub stage: String,

    /// Container image, unexpanded
    pub image: Option<String>,

    pub before_script: Vec<String>,

    pub script: Vec<String>,

    pub after_script: Vec<String>,

    /// Compiled `only` / `except`
    pub condition: JobCondition,

    pub when: When,

    pub allow_failure: bool,

    /// `None` means the job follows stage order
    pub needs: Option<Vec<Need>>,

    /// `None` means artifacts come from every earlier stage
    pub dependencies: Option<Vec<String>>,

    /// Artifact paths the job keeps
    pub artifacts: Vec<String>,

    /// Job-level variables
    pub variables: BTreeMap<String, String>,

    /// Global variables the job picks up
    pub inherit_variables: InheritFilter,

    /// Runner tags
    pub tags: Vec<String>,

    /// Whether this job triggers a downstream pipeline instead of running a script
    pub is_trigger: bool,
}

impl Job {
    /// Create a job from its expanded configuration
    pub fn from_config(config: &JobConfig) -> Result<Self, ConfigError> {
        // An `only` without refs (e.g. `only: {variables: [...]}`) keeps the default refs
        let only = match config.only.as_ref().map(|filter| filter.refs()) {
            Some(refs) if !refs.is_empty() => RefPolicy::parse(&config.name, &refs)?,
            _ => RefPolicy::default_only(),
        };
        let except = match config.except.as_ref().map(|filter| filter.refs()) {
            Some(refs) if !refs.is_empty() => Some(RefPolicy::parse(&config.name, &refs)?),
            _ => None,
        };

        let lines = |script: &Option<Script>| {
            script
                .as_ref()
                .map(|s| s.lines().to_vec())
                .unwrap_or_default()
        };

        Ok(Job {
            name: config.name.clone(),
            stage: config.stage.clone(),
            image: config.image.as_ref().map(|image| image.name().to_string()),
            before_script: lines(&config.before_script),
            script: config.script.lines().to_vec(),
            after_script: lines(&config.after_script),
            condition: JobCondition { only, except },
            when: config.when,
            allow_failure: config.allows_failure(),
            needs: config.needs.clone(),
            dependencies: config.dependencies.clone(),
            artifacts: config.artifact_paths().to_vec(),
            variables: config
                .variables
                .iter()
                .map(|(key, var)| (key.clone(), var.value.clone()))
                .collect(),
            inherit_variables: config
                .inherit
                .as_ref()
                .map(|inherit| inherit.variables.clone())
                .unwrap_or_default(),
            tags: config.tags.clone(),
            is_trigger: config.trigger.is_some(),
        })
    }

    /// Full command sequence: `before_script`, `script`, then `after_script`
    pub fn commands(&self) -> Vec<String> {
        self.before_script
            .iter()
            .chain(self.script.iter())
            .chain(self.after_script.iter())
            .cloned()
            .collect()
    }

    pub fn has_artifacts(&self) -> bool {
        !self.artifacts.is_empty()
    }

    pub fn is_manual(&self) -> bool {
        self.when == When::Manual
    }

    /// Why this job is left out of a pipeline for `context`, if it is
    pub fn skip_reason(&self, context: &RefContext) -> Option<SkipReason> {
        if self.when == When::Never {
            return Some(SkipReason::WhenNever);
        }
        self.condition.evaluate(context)
    }
}
