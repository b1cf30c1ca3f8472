//! Test: `only` / `except` decide which jobs a ref gets

use crate::helpers::*;
use ciconf::core::{PipelineSource, RefContext, SkipReason};

const PIPELINE: &str = r#"
stages: [build, test, deploy]

build:
  stage: build
  script: ["make"]

test:
  script: ["make test"]
  except: [/^docs-/]

mr-check:
  script: ["make check"]
  only: [merge_requests]

nightly:
  script: ["make bench"]
  only: [schedules]

release:
  stage: deploy
  script: ["make release"]
  only: [tags]
  except: [/-rc\d+$/]

pages:
  stage: deploy
  script: ["make docs"]
  only: [master]
"#;

#[test]
fn test_branch_push() {
    let plan = plan(PIPELINE, &RefContext::branch("feature"));
    assert_eq!(planned_names(&plan), vec!["build", "test"]);
    assert_eq!(skipped_names(&plan), vec!["mr-check", "nightly", "release", "pages"]);
}

#[test]
fn test_master_push() {
    let plan = plan(PIPELINE, &RefContext::branch("master"));
    assert_eq!(planned_names(&plan), vec!["build", "test", "pages"]);
}

#[test]
fn test_except_regex() {
    let plan = plan(PIPELINE, &RefContext::branch("docs-typo"));
    assert_eq!(planned_names(&plan), vec!["build"]);
    let test = plan.skipped.iter().find(|job| job.name == "test").unwrap();
    assert_eq!(test.reason, SkipReason::ExceptMatch);
}

#[test]
fn test_tags() {
    let plan_for_release = plan(PIPELINE, &RefContext::tag("v1.2.0"));
    assert_eq!(planned_names(&plan_for_release), vec!["build", "test", "release"]);

    let plan_for_rc = plan(PIPELINE, &RefContext::tag("v1.2.0-rc1"));
    assert_eq!(planned_names(&plan_for_rc), vec!["build", "test"]);
}

#[test]
fn test_merge_request_pipeline() {
    let context = RefContext::branch("feature").with_source(PipelineSource::MergeRequestEvent);
    let plan = plan(PIPELINE, &context);
    assert_eq!(planned_names(&plan), vec!["mr-check"]);
    assert_eq!(plan.stage_names(), vec!["test"]);
}

#[test]
fn test_scheduled_pipeline() {
    let context = RefContext::branch("master").with_source(PipelineSource::Schedule);
    let plan = plan(PIPELINE, &context);
    assert_eq!(planned_names(&plan), vec!["build", "test", "nightly", "pages"]);
}
