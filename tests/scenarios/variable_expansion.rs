//! Test: variable precedence and image expansion in plans

use crate::helpers::*;
use ciconf::core::{PipelineSource, RefContext};

const PIPELINE: &str = r#"
variables:
  REGISTRY: registry.example.com
  TAG: latest
  LEVEL: global

build:
  stage: build
  image: ${REGISTRY}/builder:$TAG
  variables:
    LEVEL: job
  script: ["make"]

publish:
  stage: deploy
  image: $REGISTRY/publisher:$CI_COMMIT_REF_SLUG
  script: ["make publish"]
"#;

#[test]
fn test_variable_precedence() {
    let plan = plan(PIPELINE, &RefContext::branch("main"));

    let build = plan.job("build").unwrap();
    assert_eq!(build.variables["LEVEL"], "job");
    assert_eq!(build.variables["CI_JOB_NAME"], "build");
    assert_eq!(build.variables["CI_COMMIT_BRANCH"], "main");

    let publish = plan.job("publish").unwrap();
    assert_eq!(publish.variables["LEVEL"], "global");
}

#[test]
fn test_pipeline_variables_win() {
    let context = RefContext::branch("main")
        .with_source(PipelineSource::Web)
        .with_variable("LEVEL", "pipeline")
        .with_variable("TAG", "v2");
    let plan = plan(PIPELINE, &context);

    let build = plan.job("build").unwrap();
    assert_eq!(build.variables["LEVEL"], "pipeline");
    assert_eq!(build.variables["CI_PIPELINE_SOURCE"], "web");
    assert_eq!(build.image.as_deref(), Some("registry.example.com/builder:v2"));
}

#[test]
fn test_image_uses_ref_slug() {
    let plan = plan(PIPELINE, &RefContext::branch("Feature/New_UI"));
    assert_eq!(
        plan.job("publish").unwrap().image.as_deref(),
        Some("registry.example.com/publisher:feature-new-ui")
    );
}

#[test]
fn test_inherit_variables_hides_globals() {
    let yaml = r#"
variables:
  REGISTRY: registry.example.com
  TAG: latest

isolated:
  image: ${REGISTRY}/tool
  inherit:
    variables: false
  script: ["make"]

partial:
  image: $REGISTRY/tool:$TAG
  inherit:
    variables: [REGISTRY]
  script: ["make"]
"#;
    let plan = plan(yaml, &RefContext::branch("main"));

    let isolated = plan.job("isolated").unwrap();
    assert!(!isolated.variables.contains_key("REGISTRY"));
    assert_eq!(isolated.variables["CI_JOB_NAME"], "isolated");
    assert_eq!(isolated.image.as_deref(), Some("/tool"));

    let partial = plan.job("partial").unwrap();
    assert_eq!(partial.image.as_deref(), Some("registry.example.com/tool:"));
}
