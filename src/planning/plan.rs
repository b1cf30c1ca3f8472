//! The jobs a pipeline gets for one ref, grouped by stage

use crate::core::{
    condition::SkipReason,
    config::When,
    context::{expand_variables, PipelineSource, RefContext},
    job::Job,
    pipeline::Pipeline,
};
use crate::planning::{
    scheduler::{PlanScheduler, SchedulingStrategy},
    PlanError,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// A job as it would be created in the pipeline
#[derive(Debug, Clone, Serialize)]
pub struct PlannedJob {
    pub name: String,

    pub stage: String,

    /// Image with variables expanded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// `before_script`, `script` and `after_script` in order
    pub commands: Vec<String>,

    pub when: When,

    pub manual: bool,

    pub allow_failure: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<String>,

    /// Jobs whose artifacts are downloaded before this one starts
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub artifacts_from: Vec<String>,

    /// Needed jobs present in this plan; `None` means stage order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs: Option<Vec<String>>,

    /// Every variable visible to the job
    pub variables: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Planned jobs of one stage
#[derive(Debug, Clone, Serialize)]
pub struct StagePlan {
    pub name: String,
    pub jobs: Vec<PlannedJob>,
}

/// A job left out of the plan
#[derive(Debug, Clone, Serialize)]
pub struct SkippedJob {
    pub name: String,
    pub stage: String,
    pub reason: SkipReason,
}

/// The pipeline that would be created for a ref
#[derive(Debug, Clone, Serialize)]
pub struct PipelinePlan {
    pub ref_name: String,

    pub source: PipelineSource,

    /// Non-empty stages in execution order
    pub stages: Vec<StagePlan>,

    /// Excluded jobs in document order
    pub skipped: Vec<SkippedJob>,
}

impl PipelinePlan {
    /// Planned jobs in stage order
    pub fn jobs(&self) -> impl Iterator<Item = &PlannedJob> {
        self.stages.iter().flat_map(|stage| stage.jobs.iter())
    }

    /// Get a planned job by name
    pub fn job(&self, name: &str) -> Option<&PlannedJob> {
        self.jobs().find(|job| job.name == name)
    }

    pub fn job_count(&self) -> usize {
        self.stages.iter().map(|stage| stage.jobs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Names of the planned stages in order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name.as_str()).collect()
    }

    /// Groups of job names that may run concurrently, in order
    pub fn waves(&self, strategy: SchedulingStrategy) -> Vec<Vec<String>> {
        PlanScheduler::new(strategy).waves(self)
    }
}

/// Plan `pipeline` for `context`
pub fn build(pipeline: &Pipeline, context: &RefContext) -> Result<PipelinePlan, PlanError> {
    let mut included: Vec<(usize, &Job)> = Vec::new();
    let mut skipped = Vec::new();

    for (position, stage) in pipeline.stages().iter().enumerate() {
        for job in pipeline.jobs_in_stage(stage) {
            match job.skip_reason(context) {
                None => included.push((position, job)),
                Some(reason) => {
                    debug!("Skipping job '{}': {}", job.name, reason);
                    skipped.push(SkippedJob {
                        name: job.name.clone(),
                        stage: job.stage.clone(),
                        reason,
                    });
                }
            }
        }
    }

    // Report skipped jobs in document order rather than stage order
    let document_order: HashMap<&str, usize> = pipeline
        .jobs()
        .iter()
        .enumerate()
        .map(|(index, job)| (job.name.as_str(), index))
        .collect();
    skipped.sort_by_key(|job| document_order.get(job.name.as_str()).copied());

    let by_name: HashMap<&str, &Job> = included
        .iter()
        .map(|(_, job)| (job.name.as_str(), *job))
        .collect();

    let mut stages: Vec<StagePlan> = Vec::new();
    for (position, job) in &included {
        let needs = resolve_needs(job, &by_name)?;
        let artifacts_from = artifact_sources(job, *position, &included, &by_name)?;

        let variables = context.job_variables(job, &pipeline.variables);
        let image = job.image.as_ref().map(|image| expand_variables(image, &variables));

        let planned = PlannedJob {
            name: job.name.clone(),
            stage: job.stage.clone(),
            image,
            commands: job.commands(),
            when: job.when,
            manual: job.is_manual(),
            allow_failure: job.allow_failure,
            artifacts: job.artifacts.clone(),
            artifacts_from,
            needs,
            variables,
            tags: job.tags.clone(),
        };

        match stages.last_mut() {
            Some(last) if last.name == job.stage => last.jobs.push(planned),
            _ => stages.push(StagePlan {
                name: job.stage.clone(),
                jobs: vec![planned],
            }),
        }
    }

    let plan = PipelinePlan {
        ref_name: context.ref_name.clone(),
        source: context.source,
        stages,
        skipped,
    };

    info!(
        "Planned {} jobs in {} stages for '{}' ({} skipped)",
        plan.job_count(),
        plan.stages.len(),
        plan.ref_name,
        plan.skipped.len()
    );

    Ok(plan)
}

/// Needed jobs that made it into the plan; optional needs may be absent
fn resolve_needs(job: &Job, by_name: &HashMap<&str, &Job>) -> Result<Option<Vec<String>>, PlanError> {
    let Some(needs) = &job.needs else {
        return Ok(None);
    };

    let mut resolved = Vec::new();
    for need in needs {
        if by_name.contains_key(need.job()) {
            resolved.push(need.job().to_string());
        } else if !need.is_optional() {
            return Err(PlanError::MissingNeed {
                job: job.name.clone(),
                need: need.job().to_string(),
            });
        }
    }
    Ok(Some(resolved))
}

/// Jobs whose artifacts `job` receives
///
/// Explicit `dependencies` are taken as written. Otherwise `needs` entries
/// that want artifacts, or failing that every earlier-stage job, count when
/// they keep any.
fn artifact_sources(
    job: &Job,
    position: usize,
    included: &[(usize, &Job)],
    by_name: &HashMap<&str, &Job>,
) -> Result<Vec<String>, PlanError> {
    if let Some(dependencies) = &job.dependencies {
        for dependency in dependencies {
            if !by_name.contains_key(dependency.as_str()) {
                return Err(PlanError::MissingDependency {
                    job: job.name.clone(),
                    dependency: dependency.clone(),
                });
            }
        }
        return Ok(dependencies.clone());
    }

    if let Some(needs) = &job.needs {
        let sources = needs
            .iter()
            .filter(|need| need.wants_artifacts())
            .filter(|need| by_name.get(need.job()).is_some_and(|needed| needed.has_artifacts()))
            .map(|need| need.job().to_string())
            .collect();
        return Ok(sources);
    }

    Ok(included
        .iter()
        .filter(|(other_position, other)| *other_position < position && other.has_artifacts())
        .map(|(_, other)| other.name.clone())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::PipelineConfig;

    fn pipeline(yaml: &str) -> Pipeline {
        PipelineConfig::from_yaml(yaml).unwrap().to_pipeline().unwrap()
    }

    const DOCS_PIPELINE: &str = r#"
stages: [build, test, deploy]
variables:
  RUST_IMAGE: rust
compile:
  stage: build
  image: $RUST_IMAGE:1.80
  script: ["cargo build"]
  artifacts:
    paths: [target/]
unit:
  script: ["cargo test"]
release:
  stage: deploy
  script: ["cargo publish"]
  only: [tags]
pages:
  stage: deploy
  script: ["cargo doc"]
  only: [master]
  artifacts:
    paths: [public]
"#;

    #[test]
    fn test_plan_groups_by_stage_and_skips() {
        let plan = pipeline(DOCS_PIPELINE).plan(&RefContext::branch("master")).unwrap();

        assert_eq!(plan.stage_names(), vec!["build", "test", "deploy"]);
        assert_eq!(plan.job_count(), 3);
        assert_eq!(plan.skipped.len(), 1);
        assert_eq!(plan.skipped[0].name, "release");
        assert_eq!(plan.skipped[0].reason, SkipReason::OnlyMismatch);
    }

    #[test]
    fn test_plan_drops_empty_stages() {
        let plan = pipeline(DOCS_PIPELINE).plan(&RefContext::branch("feature")).unwrap();
        assert_eq!(plan.stage_names(), vec!["build", "test"]);
        let skipped: Vec<_> = plan.skipped.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(skipped, vec!["release", "pages"]);
    }

    #[test]
    fn test_plan_expands_image_and_collects_artifacts() {
        let plan = pipeline(DOCS_PIPELINE).plan(&RefContext::branch("master")).unwrap();

        let compile = plan.job("compile").unwrap();
        assert_eq!(compile.image.as_deref(), Some("rust:1.80"));
        assert_eq!(compile.variables["CI_JOB_STAGE"], "build");

        assert_eq!(plan.job("unit").unwrap().artifacts_from, vec!["compile"]);
        assert_eq!(plan.job("pages").unwrap().artifacts_from, vec!["compile"]);
    }

    #[test]
    fn test_pipeline_variables_override_config() {
        let context = RefContext::branch("master").with_variable("RUST_IMAGE", "rustlang/rust");
        let plan = pipeline(DOCS_PIPELINE).plan(&context).unwrap();
        assert_eq!(plan.job("compile").unwrap().image.as_deref(), Some("rustlang/rust:1.80"));
    }

    #[test]
    fn test_needs_select_artifacts() {
        let yaml = r#"
stages: [build, test]
a:
  stage: build
  script: ["a"]
  artifacts: {paths: [a.out]}
b:
  stage: build
  script: ["b"]
  artifacts: {paths: [b.out]}
c:
  script: ["c"]
  needs:
    - a
    - job: b
      artifacts: false
d:
  script: ["d"]
  dependencies: [b]
"#;
        let plan = pipeline(yaml).plan(&RefContext::branch("main")).unwrap();
        let c = plan.job("c").unwrap();
        assert_eq!(c.needs.as_deref(), Some(&["a".to_string(), "b".to_string()][..]));
        assert_eq!(c.artifacts_from, vec!["a"]);
        assert_eq!(plan.job("d").unwrap().artifacts_from, vec!["b"]);
    }

    #[test]
    fn test_missing_need_fails_unless_optional() {
        let yaml = r#"
stages: [build, test]
compile:
  stage: build
  script: ["make"]
  only: [master]
check:
  script: ["make check"]
  needs: [compile]
lint:
  script: ["make lint"]
  needs:
    - job: compile
      optional: true
"#;
        let pipeline = pipeline(yaml);
        assert!(pipeline.plan(&RefContext::branch("master")).is_ok());

        let err = pipeline.plan(&RefContext::branch("dev")).unwrap_err();
        assert_eq!(
            err,
            PlanError::MissingNeed {
                job: "check".to_string(),
                need: "compile".to_string()
            }
        );
    }

    #[test]
    fn test_manual_jobs_are_flagged() {
        let yaml = r#"
deploy:
  stage: deploy
  script: ["./deploy.sh"]
  when: manual
"#;
        let plan = pipeline(yaml).plan(&RefContext::tag("v1.0")).unwrap();
        let deploy = plan.job("deploy").unwrap();
        assert!(deploy.manual);
        assert!(deploy.allow_failure);
    }
}
