//! Errors raised while loading, expanding and validating a pipeline document

use thiserror::Error;

/// Error types for pipeline configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Pipeline document must be a mapping at the top level")]
    NotAMapping,

    #[error("Top-level key '{0}' must be a string")]
    InvalidKey(String),

    #[error("'{key}' must be a list of stage names")]
    InvalidStages { key: String },

    #[error("Stage '{0}' is declared more than once")]
    DuplicateStage(String),

    #[error("Job '{0}' must be a mapping")]
    JobNotMapping(String),

    #[error("Merge key in '{0}' must reference a mapping or a list of mappings")]
    InvalidMerge(String),

    #[error("Job '{job}' extends unknown template '{template}'")]
    UnknownTemplate { job: String, template: String },

    #[error("Job '{0}' has an invalid 'extends' value; expected a template name or a list of names")]
    InvalidExtends(String),

    #[error("Template inheritance cycle detected involving '{0}'")]
    ExtendsCycle(String),

    #[error("Job '{job}' nests 'extends' deeper than {limit} levels")]
    ExtendsTooDeep { job: String, limit: usize },

    #[error("Job '{job}' has an invalid definition: {source}")]
    InvalidJob {
        job: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid '{key}' section: {source}")]
    InvalidSection {
        key: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Job '{job}' uses undeclared stage '{stage}'")]
    UndeclaredStage { job: String, stage: String },

    #[error("Job '{0}' has no script")]
    MissingScript(String),

    #[error("Job '{job}' has an invalid ref pattern '{pattern}': {reason}")]
    InvalidRefPattern {
        job: String,
        pattern: String,
        reason: String,
    },

    #[error("Job '{job}' needs non-existent job '{need}'")]
    UnknownNeed { job: String, need: String },

    #[error("Job '{job}' needs '{need}', which runs in the later stage '{stage}'")]
    NeedsLaterStage {
        job: String,
        need: String,
        stage: String,
    },

    #[error("Cycle detected in needs graph involving job '{0}'")]
    NeedsCycle(String),

    #[error("Job '{job}' depends on non-existent job '{dependency}'")]
    UnknownDependency { job: String, dependency: String },

    #[error("Job '{job}' depends on '{dependency}', which does not run in an earlier stage")]
    DependencyNotEarlier { job: String, dependency: String },

    #[error("Job '{0}' declares an empty artifact path")]
    EmptyArtifactPath(String),

    #[error("Pipeline defines no jobs")]
    NoJobs,
}
