//! Stage ordering

use crate::core::error::ConfigError;
use serde::{Serialize, Serializer};

/// Stage that always runs before every declared stage
pub const PRE_STAGE: &str = ".pre";

/// Stage that always runs after every declared stage
pub const POST_STAGE: &str = ".post";

/// Stage assigned to jobs that don't name one
pub const DEFAULT_JOB_STAGE: &str = "test";

/// Stages used when the document has no `stages` list
pub const DEFAULT_STAGES: [&str; 3] = ["build", "test", "deploy"];

/// Ordered set of stage names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stages {
    declared: Vec<String>,
}

impl Stages {
    /// Build from the declared list, rejecting duplicates.
    ///
    /// `.pre` and `.post` are accepted but keep their fixed positions.
    pub fn new<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut declared: Vec<String> = Vec::new();
        let mut implicit_seen = (false, false);

        for name in names {
            let name = name.into();
            let seen = match name.as_str() {
                PRE_STAGE => std::mem::replace(&mut implicit_seen.0, true),
                POST_STAGE => std::mem::replace(&mut implicit_seen.1, true),
                _ => {
                    if declared.contains(&name) {
                        true
                    } else {
                        declared.push(name.clone());
                        false
                    }
                }
            };
            if seen {
                return Err(ConfigError::DuplicateStage(name));
            }
        }

        Ok(Self { declared })
    }

    /// The user-declared stages, without `.pre` and `.post`
    pub fn declared(&self) -> &[String] {
        &self.declared
    }

    /// Every stage in execution order, `.pre` first and `.post` last
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        std::iter::once(PRE_STAGE)
            .chain(self.declared.iter().map(String::as_str))
            .chain(std::iter::once(POST_STAGE))
    }

    /// Ordinal of a stage in execution order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.iter().position(|stage| stage == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }
}

impl Default for Stages {
    fn default() -> Self {
        Self {
            declared: DEFAULT_STAGES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Serialize for Stages {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.declared.serialize(serializer)
    }
}
