//! Test: `needs` turns stage order into a DAG

use crate::helpers::*;
use ciconf::core::RefContext;
use ciconf::planning::{PlanError, SchedulingStrategy};

const PIPELINE: &str = r#"
stages: [build, test, deploy]

build:linux:
  stage: build
  script: ["make linux"]
  artifacts:
    paths:
      - out/linux

build:mac:
  stage: build
  script: ["make mac"]
  artifacts:
    paths:
      - out/mac

test:linux:
  stage: test
  script: ["make test-linux"]
  needs:
    - build:linux

test:mac:
  stage: test
  script: ["make test-mac"]
  needs:
    - build:mac

deploy:linux:
  stage: deploy
  script: ["make deploy-linux"]
  needs:
    - test:linux
    - build:linux

report:
  stage: deploy
  script: ["make report"]
"#;

#[test]
fn test_stage_order_waves() {
    let plan = plan(PIPELINE, &RefContext::branch("main"));
    let waves = plan.waves(SchedulingStrategy::StageOrder);
    assert_eq!(
        waves,
        vec![
            vec!["build:linux", "build:mac"],
            vec!["test:linux", "test:mac"],
            vec!["deploy:linux", "report"],
        ]
    );
}

#[test]
fn test_needs_waves_run_ahead_of_stages() {
    let plan = plan(PIPELINE, &RefContext::branch("main"));
    let waves = plan.waves(SchedulingStrategy::Needs);
    assert_eq!(
        waves,
        vec![
            vec!["build:linux", "build:mac"],
            vec!["test:linux", "test:mac"],
            vec!["deploy:linux", "report"],
        ]
    );

    // every job lands in exactly one wave
    let total: usize = waves.iter().map(Vec::len).sum();
    assert_eq!(total, plan.job_count());
}

#[test]
fn test_artifacts_follow_needs() {
    let plan = plan(PIPELINE, &RefContext::branch("main"));
    assert_eq!(plan.job("test:linux").unwrap().artifacts_from, vec!["build:linux"]);
    assert_eq!(plan.job("deploy:linux").unwrap().artifacts_from, vec!["build:linux"]);
    assert_eq!(
        plan.job("report").unwrap().artifacts_from,
        vec!["build:linux", "build:mac"]
    );
}

#[test]
fn test_excluded_need_fails_planning() {
    let yaml = r#"
compile:
  stage: build
  script: ["make"]
  only: [tags]
check:
  script: ["make check"]
  needs: [compile]
"#;
    let pipeline = load(yaml).to_pipeline().unwrap();
    let err = pipeline.plan(&RefContext::branch("main")).unwrap_err();
    assert!(matches!(err, PlanError::MissingNeed { ref need, .. } if need == "compile"));
    assert!(pipeline.plan(&RefContext::tag("v1")).is_ok());
}

#[test]
fn test_excluded_dependency_fails_planning() {
    let yaml = r#"
compile:
  stage: build
  script: ["make"]
  only: [master]
check:
  script: ["make check"]
  dependencies: [compile]
"#;
    let pipeline = load(yaml).to_pipeline().unwrap();
    let err = pipeline.plan(&RefContext::branch("dev")).unwrap_err();
    assert!(matches!(err, PlanError::MissingDependency { ref dependency, .. } if dependency == "compile"));
}
