//! Test: invalid pipelines are rejected with every problem reported

use ciconf::core::{ConfigError, PipelineConfig};

#[test]
fn test_all_errors_are_reported() {
    let yaml = r#"
stages: [build, test]
compile:
  stage: compile
  script: ["make"]
empty:
  script: []
bad-pattern:
  script: ["x"]
  only: ["/(unclosed/"]
orphan:
  script: ["x"]
  needs: [ghost]
"#;
    let config = PipelineConfig::parse(yaml).unwrap();
    let errors = config.errors();

    assert_eq!(errors.len(), 4);
    assert!(matches!(&errors[0], ConfigError::UndeclaredStage { job, .. } if job == "compile"));
    assert!(matches!(&errors[1], ConfigError::MissingScript(job) if job == "empty"));
    assert!(matches!(&errors[2], ConfigError::InvalidRefPattern { job, .. } if job == "bad-pattern"));
    assert!(matches!(&errors[3], ConfigError::UnknownNeed { need, .. } if need == "ghost"));
}

#[test]
fn test_from_yaml_carries_config_error() {
    let err = PipelineConfig::from_yaml("job:\n  stage: nowhere\n  script: [x]\n").unwrap_err();
    let config_error = err.downcast_ref::<ConfigError>().unwrap();
    assert!(matches!(config_error, ConfigError::UndeclaredStage { .. }));
}

#[test]
fn test_structural_errors() {
    assert!(matches!(
        PipelineConfig::parse("stages: [a, a]\njob:\n  script: [x]\n"),
        Err(ConfigError::DuplicateStage(ref s)) if s == "a"
    ));
    assert!(matches!(
        PipelineConfig::parse("stages: build\n"),
        Err(ConfigError::InvalidStages { .. })
    ));
    assert!(matches!(
        PipelineConfig::parse("job:\n  extends: 42\n"),
        Err(ConfigError::InvalidExtends(ref j)) if j == "job"
    ));
    assert!(matches!(
        PipelineConfig::parse("key: [unclosed"),
        Err(ConfigError::Yaml(_))
    ));
}

#[test]
fn test_file_errors_name_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yml");
    std::fs::write(&path, "job:\n  stage: nowhere\n  script: [x]\n").unwrap();

    let err = PipelineConfig::from_file(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("broken.yml"));
    assert!(err.downcast_ref::<ConfigError>().is_some());
}
