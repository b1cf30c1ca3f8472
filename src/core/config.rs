//! Pipeline configuration from YAML

use crate::core::{
    condition::RefPattern,
    error::ConfigError,
    stage::{Stages, DEFAULT_JOB_STAGE},
    template::{self, TemplateResolver},
};
use anyhow::{Context, Result};
use serde::de::{DeserializeOwned, Error as _};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// Job keys interpreted by this crate
const MODELED_JOB_KEYS: &[&str] = &[
    "image",
    "stage",
    "before_script",
    "script",
    "after_script",
    "only",
    "except",
    "artifacts",
    "variables",
    "when",
    "allow_failure",
    "needs",
    "dependencies",
    "tags",
    "trigger",
    "inherit",
];

/// Job keys that are valid but carry runner-side behaviour only
const RUNNER_JOB_KEYS: &[&str] = &[
    "services",
    "cache",
    "retry",
    "timeout",
    "interruptible",
    "coverage",
    "environment",
    "resource_group",
    "release",
    "start_in",
    "secrets",
    "id_tokens",
    "hooks",
    "pages",
    "identity",
];

/// Job keys that change which jobs run but are not evaluated
const UNEVALUATED_JOB_KEYS: &[&str] = &["rules", "parallel"];

/// Legacy top-level keys that act like entries of `default`
const GLOBAL_DEFAULT_KEYS: &[&str] = &["image", "services", "cache", "before_script", "after_script"];

/// A list of shell commands
///
/// Accepts a single string, a list of strings, or a list whose entries are
/// themselves lists of strings (flattened one level).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Script(Vec<String>);

impl Script {
    pub fn new(lines: Vec<String>) -> Self {
        Self(lines)
    }

    pub fn lines(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<'de> Deserialize<'de> for Script {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Line {
            One(String),
            Nested(Vec<String>),
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Single(String),
            Lines(Vec<Line>),
        }

        let raw = Raw::deserialize(deserializer)
            .map_err(|_| D::Error::custom("script must be a string or a list of strings"))?;

        let lines = match raw {
            Raw::Single(line) => vec![line],
            Raw::Lines(lines) => lines
                .into_iter()
                .flat_map(|line| match line {
                    Line::One(line) => vec![line],
                    Line::Nested(lines) => lines,
                })
                .collect(),
        };

        Ok(Script(lines))
    }
}

/// Container image reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Image {
    Name(String),
    Detailed {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entrypoint: Option<Vec<String>>,
    },
}

impl Image {
    pub fn name(&self) -> &str {
        match self {
            Image::Name(name) => name,
            Image::Detailed { name, .. } => name,
        }
    }
}

/// `only` / `except` value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefFilter {
    Single(String),
    List(Vec<String>),
    Detailed {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        refs: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variables: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        changes: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kubernetes: Option<Value>,
    },
}

impl RefFilter {
    /// The ref patterns, empty when only non-ref conditions were given
    pub fn refs(&self) -> Vec<String> {
        match self {
            RefFilter::Single(pattern) => vec![pattern.clone()],
            RefFilter::List(patterns) => patterns.clone(),
            RefFilter::Detailed { refs, .. } => refs.clone(),
        }
    }

    /// Sub-keys that are accepted but not evaluated
    pub fn unevaluated_keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if let RefFilter::Detailed {
            variables,
            changes,
            kubernetes,
            ..
        } = self
        {
            if variables.is_some() {
                keys.push("variables");
            }
            if changes.is_some() {
                keys.push("changes");
            }
            if kubernetes.is_some() {
                keys.push("kubernetes");
            }
        }
        keys
    }
}

/// When a job runs relative to the outcome of earlier stages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum When {
    #[default]
    OnSuccess,
    OnFailure,
    Always,
    Manual,
    Delayed,
    Never,
}

impl When {
    fn is_default(&self) -> bool {
        *self == When::OnSuccess
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            When::OnSuccess => "on_success",
            When::OnFailure => "on_failure",
            When::Always => "always",
            When::Manual => "manual",
            When::Delayed => "delayed",
            When::Never => "never",
        }
    }
}

/// When artifacts are uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactWhen {
    OnSuccess,
    OnFailure,
    Always,
}

/// Files a job preserves after it finishes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifacts {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_in: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<ArtifactWhen>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub untracked: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn default_true() -> bool {
    true
}

/// Entry of a job's `needs` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Need {
    Job(String),
    Detailed {
        job: String,
        #[serde(default, skip_serializing_if = "is_false")]
        optional: bool,
        #[serde(default = "default_true")]
        artifacts: bool,
    },
}

impl Need {
    pub fn job(&self) -> &str {
        match self {
            Need::Job(job) => job,
            Need::Detailed { job, .. } => job,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Need::Detailed { optional: true, .. })
    }

    /// Whether the needed job's artifacts are downloaded
    pub fn wants_artifacts(&self) -> bool {
        match self {
            Need::Job(_) => true,
            Need::Detailed { artifacts, .. } => *artifacts,
        }
    }
}

/// Entry of `inherit`: everything, nothing, or the listed names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InheritFilter {
    All(bool),
    Only(Vec<String>),
}

impl Default for InheritFilter {
    fn default() -> Self {
        InheritFilter::All(true)
    }
}

impl InheritFilter {
    pub fn includes(&self, name: &str) -> bool {
        match self {
            InheritFilter::All(all) => *all,
            InheritFilter::Only(names) => names.iter().any(|n| n == name),
        }
    }

    fn is_all(&self) -> bool {
        *self == InheritFilter::All(true)
    }
}

/// Which defaults and global variables a job picks up
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inherit {
    #[serde(default, skip_serializing_if = "InheritFilter::is_all")]
    pub default: InheritFilter,

    #[serde(default, skip_serializing_if = "InheritFilter::is_all")]
    pub variables: InheritFilter,
}

/// Variable definition - a scalar or a `{ value, description }` mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub value: String,
    pub description: Option<String>,
}

impl Variable {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: None,
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        if let Value::Mapping(map) = value {
            let value = map.get("value").map(scalar_to_string).unwrap_or(Some(String::new()))?;
            let description = map.get("description").and_then(Value::as_str).map(str::to_string);
            return Some(Self { value, description });
        }
        scalar_to_string(value).map(Self::new)
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for Variable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Variable::from_value(&value)
            .ok_or_else(|| D::Error::custom("variable must be a scalar or a mapping with 'value'"))
    }
}

impl Serialize for Variable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.description {
            None => serializer.serialize_str(&self.value),
            Some(description) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("value", &self.value)?;
                map.serialize_entry("description", description)?;
                map.end()
            }
        }
    }
}

/// Job configuration after merge keys, `extends` and defaults are applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Job name (the top-level key)
    #[serde(skip)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,

    #[serde(default = "default_stage")]
    pub stage: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_script: Option<Script>,

    #[serde(default)]
    pub script: Script,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_script: Option<Script>,

    /// Ref predicate restricting when the job runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only: Option<RefFilter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub except: Option<RefFilter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<Artifacts>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, Variable>,

    #[serde(default, skip_serializing_if = "When::is_default")]
    pub when: When,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_failure: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needs: Option<Vec<Need>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Downstream pipeline trigger, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherit: Option<Inherit>,
}

fn default_stage() -> String {
    DEFAULT_JOB_STAGE.to_string()
}

impl JobConfig {
    /// Every ref pattern named by `only` and `except`
    pub fn ref_patterns(&self) -> impl Iterator<Item = String> + '_ {
        self.only
            .iter()
            .chain(self.except.iter())
            .flat_map(|filter| filter.refs())
    }

    /// Artifact paths, empty when the job keeps none
    pub fn artifact_paths(&self) -> &[String] {
        self.artifacts.as_ref().map(|a| a.paths.as_slice()).unwrap_or(&[])
    }

    /// Whether global variable `name` is visible to the job
    pub fn inherits_variable(&self, name: &str) -> bool {
        self.inherit.as_ref().map_or(true, |inherit| inherit.variables.includes(name))
    }

    /// Manual jobs may fail unless told otherwise
    pub fn allows_failure(&self) -> bool {
        self.allow_failure.unwrap_or(self.when == When::Manual)
    }
}

/// Top-level pipeline configuration loaded from YAML
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Stage order
    pub stages: Stages,

    /// Global variables available to all jobs
    pub variables: BTreeMap<String, Variable>,

    /// Jobs in document order
    jobs: Vec<JobConfig>,

    /// Hidden template names in document order
    templates: Vec<String>,

    /// Non-fatal diagnostics collected while loading
    warnings: Vec<String>,
}

impl PipelineConfig {
    /// Load pipeline configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline file {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid pipeline file {}", path.display()))
    }

    /// Parse and validate pipeline configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config = Self::parse(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and expand a document without semantic validation
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut document: Value = serde_yaml::from_str(yaml)?;
        template::apply_merge_keys(&mut document, "")?;

        let root = match document {
            Value::Mapping(root) => root,
            _ => return Err(ConfigError::NotAMapping),
        };

        let mut stages = None;
        let mut variables = BTreeMap::new();
        let mut global_defaults = Mapping::new();
        let mut default_block = Mapping::new();
        let mut definitions = Mapping::new();
        let mut templates = Vec::new();
        let mut warnings = Vec::new();

        for (key, value) in root {
            let name = match key {
                Value::String(name) => name,
                other => {
                    let rendered = serde_yaml::to_string(&other).unwrap_or_default();
                    return Err(ConfigError::InvalidKey(rendered.trim().to_string()));
                }
            };

            match name.as_str() {
                "stages" | "types" => stages = Some(parse_stages(&name, value)?),
                "variables" => variables = parse_section(&name, value)?,
                "default" => default_block = parse_section(&name, value)?,
                "include" | "workflow" => {
                    warnings.push(format!("Top-level '{}' is not evaluated", name));
                }
                key if GLOBAL_DEFAULT_KEYS.contains(&key) => {
                    global_defaults.insert(Value::String(name.clone()), value);
                }
                _ => {
                    if name.starts_with('.') {
                        templates.push(name.clone());
                    }
                    definitions.insert(Value::String(name.clone()), value);
                }
            }
        }

        // `default` wins over the legacy global keys
        let mut defaults = global_defaults;
        for (key, value) in default_block {
            defaults.insert(key, value);
        }

        let mut resolver = TemplateResolver::new(&definitions);
        let mut jobs = Vec::new();

        for key in definitions.keys() {
            let Some(name) = key.as_str() else { continue };
            if name.starts_with('.') {
                continue;
            }

            let mut expanded = resolver.resolve(name)?;
            let inherit: Inherit = match expanded.get("inherit") {
                Some(value) => serde_yaml::from_value(value.clone()).map_err(|source| {
                    ConfigError::InvalidJob {
                        job: name.to_string(),
                        source,
                    }
                })?,
                None => Inherit::default(),
            };
            for (default_key, default_value) in &defaults {
                let inherited = default_key.as_str().is_some_and(|key| inherit.default.includes(key));
                if inherited && !expanded.contains_key(default_key) {
                    expanded.insert(default_key.clone(), default_value.clone());
                }
            }
            warnings.extend(key_warnings(name, &expanded));

            let mut job: JobConfig = serde_yaml::from_value(Value::Mapping(expanded)).map_err(|source| {
                ConfigError::InvalidJob {
                    job: name.to_string(),
                    source,
                }
            })?;
            job.name = name.to_string();

            for filter in job.only.iter().chain(job.except.iter()) {
                for sub_key in filter.unevaluated_keys() {
                    warnings.push(format!(
                        "Job '{}': 'only'/'except' condition '{}' is not evaluated",
                        name, sub_key
                    ));
                }
            }

            debug!("Loaded job '{}' in stage '{}'", job.name, job.stage);
            jobs.push(job);
        }

        for warning in &warnings {
            warn!("{}", warning);
        }

        let config = Self {
            stages: stages.unwrap_or_default(),
            variables,
            jobs,
            templates,
            warnings,
        };

        info!(
            "Parsed pipeline: {} stages, {} jobs, {} templates",
            config.stages.declared().len(),
            config.jobs.len(),
            config.templates.len()
        );

        Ok(config)
    }

    /// Validate the pipeline configuration, returning the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.errors().into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Every semantic problem in the configuration, in document order
    pub fn errors(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.jobs.is_empty() {
            errors.push(ConfigError::NoJobs);
        }

        let by_name: HashMap<&str, &JobConfig> =
            self.jobs.iter().map(|job| (job.name.as_str(), job)).collect();

        for job in &self.jobs {
            let job_stage = self.stages.position(&job.stage);
            if job_stage.is_none() {
                errors.push(ConfigError::UndeclaredStage {
                    job: job.name.clone(),
                    stage: job.stage.clone(),
                });
            }

            if job.script.is_empty() && job.trigger.is_none() {
                errors.push(ConfigError::MissingScript(job.name.clone()));
            }

            for pattern in job.ref_patterns() {
                if let Err(reason) = RefPattern::parse(&pattern) {
                    errors.push(ConfigError::InvalidRefPattern {
                        job: job.name.clone(),
                        pattern,
                        reason,
                    });
                }
            }

            if job.artifact_paths().iter().any(|path| path.trim().is_empty()) {
                errors.push(ConfigError::EmptyArtifactPath(job.name.clone()));
            }

            for need in job.needs.iter().flatten() {
                match by_name.get(need.job()) {
                    None => errors.push(ConfigError::UnknownNeed {
                        job: job.name.clone(),
                        need: need.job().to_string(),
                    }),
                    Some(needed) => {
                        let needed_stage = self.stages.position(&needed.stage);
                        if let (Some(own), Some(theirs)) = (job_stage, needed_stage) {
                            if theirs > own {
                                errors.push(ConfigError::NeedsLaterStage {
                                    job: job.name.clone(),
                                    need: needed.name.clone(),
                                    stage: needed.stage.clone(),
                                });
                            }
                        }
                    }
                }
            }

            for dependency in job.dependencies.iter().flatten() {
                match by_name.get(dependency.as_str()) {
                    None => errors.push(ConfigError::UnknownDependency {
                        job: job.name.clone(),
                        dependency: dependency.clone(),
                    }),
                    Some(depended) => {
                        let also_needed = job
                            .needs
                            .iter()
                            .flatten()
                            .any(|need| need.job() == dependency);
                        let earlier = match (self.stages.position(&depended.stage), job_stage) {
                            (Some(theirs), Some(own)) => theirs < own,
                            _ => true,
                        };
                        if !earlier && !also_needed {
                            errors.push(ConfigError::DependencyNotEarlier {
                                job: job.name.clone(),
                                dependency: dependency.clone(),
                            });
                        }
                    }
                }
            }
        }

        if let Err(cycle) = self.check_needs_cycles() {
            errors.push(cycle);
        }

        errors
    }

    /// Check for cycles in the `needs` graph
    ///
    /// Unknown needs are reported elsewhere and skipped here.
    fn check_needs_cycles(&self) -> Result<(), ConfigError> {
        let mut visited = HashSet::new();
        let mut recursion_stack = HashSet::new();

        for job in &self.jobs {
            if !visited.contains(job.name.as_str()) {
                self.dfs_check(&job.name, &mut visited, &mut recursion_stack)?;
            }
        }

        Ok(())
    }

    fn dfs_check<'a>(
        &'a self,
        job_name: &'a str,
        visited: &mut HashSet<&'a str>,
        recursion_stack: &mut HashSet<&'a str>,
    ) -> Result<(), ConfigError> {
        visited.insert(job_name);
        recursion_stack.insert(job_name);

        if let Some(job) = self.job(job_name) {
            for need in job.needs.iter().flatten() {
                let need = need.job();
                if recursion_stack.contains(need) {
                    return Err(ConfigError::NeedsCycle(need.to_string()));
                }
                if !visited.contains(need) {
                    self.dfs_check(need, visited, recursion_stack)?;
                }
            }
        }

        recursion_stack.remove(job_name);
        Ok(())
    }

    /// Jobs in document order
    pub fn jobs(&self) -> &[JobConfig] {
        &self.jobs
    }

    /// Get a job by name
    pub fn job(&self, name: &str) -> Option<&JobConfig> {
        self.jobs.iter().find(|job| job.name == name)
    }

    /// Hidden template names in document order
    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    /// Non-fatal diagnostics collected while loading
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Global variables as a plain string map
    pub fn variables_as_string_map(&self) -> BTreeMap<String, String> {
        self.variables
            .iter()
            .map(|(key, var)| (key.clone(), var.value.clone()))
            .collect()
    }

    /// The fully expanded document as YAML
    pub fn to_merged_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// The fully expanded document as JSON
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Convert config to a Pipeline domain model
    pub fn to_pipeline(&self) -> Result<crate::core::Pipeline, ConfigError> {
        crate::core::Pipeline::from_config(self)
    }
}

impl Serialize for PipelineConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("stages", &self.stages)?;
        if !self.variables.is_empty() {
            map.serialize_entry("variables", &self.variables)?;
        }
        for job in &self.jobs {
            map.serialize_entry(&job.name, job)?;
        }
        map.end()
    }
}

fn parse_stages(key: &str, value: Value) -> Result<Stages, ConfigError> {
    let invalid = || ConfigError::InvalidStages { key: key.to_string() };

    let names = match value {
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(name) => Ok(name),
                _ => Err(invalid()),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Value::Null => Vec::new(),
        _ => return Err(invalid()),
    };

    Stages::new(names)
}

fn parse_section<T>(key: &str, value: Value) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Default,
{
    if value.is_null() {
        return Ok(T::default());
    }
    serde_yaml::from_value(value).map_err(|source| ConfigError::InvalidSection {
        key: key.to_string(),
        source,
    })
}

fn key_warnings(job: &str, definition: &Mapping) -> Vec<String> {
    definition
        .keys()
        .filter_map(Value::as_str)
        .filter_map(|key| {
            if MODELED_JOB_KEYS.contains(&key) || RUNNER_JOB_KEYS.contains(&key) {
                None
            } else if UNEVALUATED_JOB_KEYS.contains(&key) {
                Some(format!("Job '{}': '{}' is not evaluated", job, key))
            } else {
                Some(format!("Job '{}': unknown key '{}'", job, key))
            }
        })
        .collect()
}
