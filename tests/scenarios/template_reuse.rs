//! Test: Template reuse through anchors, merge keys and `extends`

use crate::helpers::*;
use ciconf::core::config::When;

/// Merge keys and `extends` can be combined; defaults fill what is left
#[test]
fn test_merge_keys_extends_and_defaults() {
    let yaml = r#"
stages: [build, test, deploy]

default:
  image: rust:1.80
  before_script:
    - rustc --version

.rules: &rules
  only: [master, /^release-.*$/]

.cargo:
  stage: test
  variables:
    CARGO_HOME: .cargo
    RUST_BACKTRACE: "1"
  script:
    - cargo test

.cargo_release:
  extends: .cargo
  variables:
    RUST_BACKTRACE: full
  script:
    - cargo test --release

unit:
  extends: .cargo

release-test:
  extends: .cargo_release
  <<: *rules
  when: manual
"#;

    let config = load(yaml);
    assert_eq!(config.templates(), &[".rules", ".cargo", ".cargo_release"]);

    let unit = config.job("unit").unwrap();
    assert_eq!(unit.stage, "test");
    assert_eq!(unit.script.lines(), &["cargo test"]);
    assert_eq!(unit.image.as_ref().unwrap().name(), "rust:1.80");
    assert!(unit.only.is_none());

    let release = config.job("release-test").unwrap();
    assert_eq!(release.script.lines(), &["cargo test --release"]);
    assert_eq!(release.variables["CARGO_HOME"].value, ".cargo");
    assert_eq!(release.variables["RUST_BACKTRACE"].value, "full");
    assert_eq!(release.only.as_ref().unwrap().refs(), vec!["master", "/^release-.*$/"]);
    assert_eq!(release.when, When::Manual);
    assert_eq!(
        release.before_script.as_ref().unwrap().lines(),
        &["rustc --version"]
    );
}

/// A merge key replaces keys written before it; keys after it win
#[test]
fn test_merge_key_follows_document_order() {
    let yaml = r#"
.alpine: &alpine
  image: alpine
  script: ["ls"]
before:
  image: rust
  <<: *alpine
after:
  <<: *alpine
  image: rust
"#;
    let config = load(yaml);
    assert_eq!(config.job("before").unwrap().image.as_ref().unwrap().name(), "alpine");
    assert_eq!(config.job("after").unwrap().image.as_ref().unwrap().name(), "rust");
}

/// `inherit: default: false` opts a job out of the `default` block
#[test]
fn test_inherit_opts_out_of_defaults() {
    let yaml = r#"
default:
  image: rust:1.80
  before_script:
    - rustc --version
build:
  script: ["cargo build"]
notify:
  extends: .standalone
.standalone:
  inherit:
    default: false
  script: ["curl example.com"]
"#;
    let config = load(yaml);
    assert!(config.warnings().is_empty());
    assert!(config.job("build").unwrap().image.is_some());

    let notify = config.job("notify").unwrap();
    assert!(notify.image.is_none());
    assert!(notify.before_script.is_none());

    let plan = plan(yaml, &ciconf::core::RefContext::branch("main"));
    assert_eq!(plan.job("notify").unwrap().commands, vec!["curl example.com"]);
}

/// The merged document contains no templates and reloads to the same jobs
#[test]
fn test_merged_document_reloads() {
    let yaml = r#"
.base: &base
  image: alpine
  script: ["echo base"]
.ext:
  tags: [docker]
one:
  <<: *base
two:
  <<: *base
  extends: .ext
  script: ["echo two"]
"#;
    let config = load(yaml);
    let merged = config.to_merged_yaml().unwrap();
    assert!(!merged.contains(".base"));
    assert!(!merged.contains("extends"));

    let reloaded = load(&merged);
    assert_eq!(reloaded.jobs(), config.jobs());
    assert_eq!(reloaded.job("two").unwrap().tags, vec!["docker"]);
    assert_eq!(reloaded.job("two").unwrap().script.lines(), &["echo two"]);
}

/// JSON rendering keeps job order and the stage list
#[test]
fn test_json_rendering() {
    let yaml = r#"
stages: [only]
b:
  stage: only
  script: ["b"]
a:
  stage: only
  script: ["a"]
"#;
    let json = load(yaml).to_json().unwrap();
    assert_eq!(json["stages"], serde_json::json!(["only"]));
    assert_eq!(json["b"]["script"], serde_json::json!(["b"]));
    assert_eq!(json["a"]["stage"], "only");
}
