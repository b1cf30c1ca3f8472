//! Ref context - what a pipeline is being created for

use crate::core::{config::Variable, job::Job};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Maximum length of `CI_COMMIT_REF_SLUG`
const REF_SLUG_MAX_LEN: usize = 63;

/// Kind of git ref
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    Branch,
    Tag,
}

/// What triggered the pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineSource {
    #[default]
    Push,
    Web,
    Schedule,
    Api,
    Trigger,
    Pipeline,
    MergeRequestEvent,
    External,
    Chat,
}

impl PipelineSource {
    /// Value of `CI_PIPELINE_SOURCE`
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineSource::Push => "push",
            PipelineSource::Web => "web",
            PipelineSource::Schedule => "schedule",
            PipelineSource::Api => "api",
            PipelineSource::Trigger => "trigger",
            PipelineSource::Pipeline => "pipeline",
            PipelineSource::MergeRequestEvent => "merge_request_event",
            PipelineSource::External => "external",
            PipelineSource::Chat => "chat",
        }
    }
}

/// The ref and trigger a pipeline is planned for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefContext {
    /// Branch or tag name
    pub ref_name: String,

    pub kind: RefKind,

    pub source: PipelineSource,

    /// Variables passed when the pipeline was created; they override everything
    pub variables: BTreeMap<String, String>,
}

impl RefContext {
    pub fn branch(name: impl Into<String>) -> Self {
        Self::new(name, RefKind::Branch)
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Self::new(name, RefKind::Tag)
    }

    fn new(name: impl Into<String>, kind: RefKind) -> Self {
        Self {
            ref_name: name.into(),
            kind,
            source: PipelineSource::default(),
            variables: BTreeMap::new(),
        }
    }

    pub fn with_source(mut self, source: PipelineSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// `CI_COMMIT_REF_NAME` lowercased, non-alphanumerics replaced by `-`,
    /// cut to 63 bytes, no leading or trailing `-`
    pub fn ref_slug(&self) -> String {
        let slug: String = self
            .ref_name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .take(REF_SLUG_MAX_LEN)
            .collect();
        slug.trim_matches('-').to_string()
    }

    /// Predefined `CI_*` variables for this ref
    pub fn predefined_variables(&self) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();
        vars.insert("CI".to_string(), "true".to_string());
        vars.insert("CI_COMMIT_REF_NAME".to_string(), self.ref_name.clone());
        vars.insert("CI_COMMIT_REF_SLUG".to_string(), self.ref_slug());
        vars.insert("CI_PIPELINE_SOURCE".to_string(), self.source.as_str().to_string());
        match self.kind {
            RefKind::Branch => vars.insert("CI_COMMIT_BRANCH".to_string(), self.ref_name.clone()),
            RefKind::Tag => vars.insert("CI_COMMIT_TAG".to_string(), self.ref_name.clone()),
        };
        vars
    }

    /// Every variable visible to a job.
    ///
    /// Later sources win: predefined, global, job, then pipeline-creation
    /// variables. Globals the job does not inherit are left out.
    pub fn job_variables(
        &self,
        job: &Job,
        globals: &BTreeMap<String, Variable>,
    ) -> BTreeMap<String, String> {
        let mut vars = self.predefined_variables();
        vars.insert("CI_JOB_NAME".to_string(), job.name.clone());
        vars.insert("CI_JOB_STAGE".to_string(), job.stage.clone());

        for (key, var) in globals.iter().filter(|(key, _)| job.inherit_variables.includes(key)) {
            vars.insert(key.clone(), var.value.clone());
        }
        vars.extend(job.variables.clone());
        vars.extend(self.variables.clone());

        vars
    }
}

fn variable_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\$|\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
            .expect("variable pattern is a valid regex")
    })
}

/// Substitute `$VAR` and `${VAR}`; `$$` is a literal dollar and unknown
/// variables expand to nothing
pub fn expand_variables(text: &str, variables: &BTreeMap<String, String>) -> String {
    variable_pattern()
        .replace_all(text, |caps: &Captures| {
            match caps.get(1).or_else(|| caps.get(2)) {
                Some(name) => variables.get(name.as_str()).cloned().unwrap_or_default(),
                None => "$".to_string(),
            }
        })
        .into_owned()
}
