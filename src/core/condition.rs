//! Ref predicates for `only` / `except`

use crate::core::{
    context::{PipelineSource, RefContext, RefKind},
    error::ConfigError,
};
use regex::Regex;
use std::fmt;

/// Special `only`/`except` keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKeyword {
    Branches,
    Tags,
    MergeRequests,
    Schedules,
    Pushes,
    Web,
    Api,
    Triggers,
    Pipelines,
    External,
    Chat,
}

impl RefKeyword {
    pub fn parse(keyword: &str) -> Option<Self> {
        let keyword = match keyword {
            "branches" => RefKeyword::Branches,
            "tags" => RefKeyword::Tags,
            "merge_requests" => RefKeyword::MergeRequests,
            "schedules" => RefKeyword::Schedules,
            "pushes" => RefKeyword::Pushes,
            "web" => RefKeyword::Web,
            "api" => RefKeyword::Api,
            "triggers" => RefKeyword::Triggers,
            "pipelines" => RefKeyword::Pipelines,
            "external" => RefKeyword::External,
            "chat" => RefKeyword::Chat,
            _ => return None,
        };
        Some(keyword)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RefKeyword::Branches => "branches",
            RefKeyword::Tags => "tags",
            RefKeyword::MergeRequests => "merge_requests",
            RefKeyword::Schedules => "schedules",
            RefKeyword::Pushes => "pushes",
            RefKeyword::Web => "web",
            RefKeyword::Api => "api",
            RefKeyword::Triggers => "triggers",
            RefKeyword::Pipelines => "pipelines",
            RefKeyword::External => "external",
            RefKeyword::Chat => "chat",
        }
    }

    pub fn matches(&self, context: &RefContext) -> bool {
        match self {
            // merge request pipelines only run jobs that opt in
            RefKeyword::Branches => {
                context.kind == RefKind::Branch && context.source != PipelineSource::MergeRequestEvent
            }
            RefKeyword::Tags => context.kind == RefKind::Tag,
            RefKeyword::MergeRequests => context.source == PipelineSource::MergeRequestEvent,
            RefKeyword::Schedules => context.source == PipelineSource::Schedule,
            RefKeyword::Pushes => context.source == PipelineSource::Push,
            RefKeyword::Web => context.source == PipelineSource::Web,
            RefKeyword::Api => context.source == PipelineSource::Api,
            RefKeyword::Triggers => context.source == PipelineSource::Trigger,
            RefKeyword::Pipelines => context.source == PipelineSource::Pipeline,
            RefKeyword::External => context.source == PipelineSource::External,
            RefKeyword::Chat => context.source == PipelineSource::Chat,
        }
    }
}

/// A single `only`/`except` entry
#[derive(Debug, Clone)]
pub enum RefPattern {
    /// Special keyword such as `branches` or `tags`
    Keyword(RefKeyword),
    /// Exact ref name
    Literal(String),
    /// `/regex/flags`, matched anywhere in the ref name unless anchored
    Regex(Regex),
}

impl RefPattern {
    pub fn parse(pattern: &str) -> Result<Self, String> {
        if let Some(keyword) = RefKeyword::parse(pattern) {
            return Ok(RefPattern::Keyword(keyword));
        }

        if let Some(body) = pattern.strip_prefix('/') {
            if let Some(end) = body.rfind('/') {
                let (expression, flags) = (&body[..end], &body[end + 1..]);
                let mut source = String::new();
                for flag in flags.chars() {
                    match flag {
                        'i' => source.push_str("(?i)"),
                        'm' => source.push_str("(?s)"),
                        'x' => source.push_str("(?x)"),
                        other => return Err(format!("unsupported regex flag '{}'", other)),
                    }
                }
                source.push_str(expression);
                return Regex::new(&source)
                    .map(RefPattern::Regex)
                    .map_err(|e| e.to_string());
            }
        }

        Ok(RefPattern::Literal(pattern.to_string()))
    }

    pub fn matches(&self, context: &RefContext) -> bool {
        match self {
            RefPattern::Keyword(keyword) => keyword.matches(context),
            RefPattern::Literal(name) => context.ref_name == *name,
            RefPattern::Regex(regex) => regex.is_match(&context.ref_name),
        }
    }
}

impl fmt::Display for RefPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefPattern::Keyword(keyword) => write!(f, "{}", keyword.as_str()),
            RefPattern::Literal(name) => write!(f, "{}", name),
            RefPattern::Regex(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

/// A set of patterns; matches when any pattern does
#[derive(Debug, Clone)]
pub struct RefPolicy {
    patterns: Vec<RefPattern>,
}

impl RefPolicy {
    pub fn parse(job: &str, patterns: &[String]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                RefPattern::parse(pattern).map_err(|reason| ConfigError::InvalidRefPattern {
                    job: job.to_string(),
                    pattern: pattern.clone(),
                    reason,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Policy applied when a job has no `only`: branches and tags
    pub fn default_only() -> Self {
        Self {
            patterns: vec![
                RefPattern::Keyword(RefKeyword::Branches),
                RefPattern::Keyword(RefKeyword::Tags),
            ],
        }
    }

    pub fn matches(&self, context: &RefContext) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(context))
    }

    pub fn patterns(&self) -> &[RefPattern] {
        &self.patterns
    }
}

impl fmt::Display for RefPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.patterns.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", rendered.join(", "))
    }
}

/// Why a job is left out of a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No `only` pattern matched the ref
    OnlyMismatch,
    /// An `except` pattern matched the ref
    ExceptMatch,
    /// The job declares `when: never`
    WhenNever,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::OnlyMismatch => "ref not matched by 'only'",
            SkipReason::ExceptMatch => "ref excluded by 'except'",
            SkipReason::WhenNever => "'when: never'",
        };
        f.write_str(text)
    }
}

/// Combined `only` / `except` condition of a job
#[derive(Debug, Clone)]
pub struct JobCondition {
    pub only: RefPolicy,
    pub except: Option<RefPolicy>,
}

impl JobCondition {
    /// `None` when the job runs for this context
    pub fn evaluate(&self, context: &RefContext) -> Option<SkipReason> {
        if !self.only.matches(context) {
            return Some(SkipReason::OnlyMismatch);
        }
        if self.except.as_ref().is_some_and(|except| except.matches(context)) {
            return Some(SkipReason::ExceptMatch);
        }
        None
    }
}

impl Default for JobCondition {
    fn default() -> Self {
        Self {
            only: RefPolicy::default_only(),
            except: None,
        }
    }
}
