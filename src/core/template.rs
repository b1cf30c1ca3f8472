//! Template expansion: YAML merge keys and `extends`
//!
//! Anchors and aliases are resolved by the YAML parser itself, so by the time
//! a document reaches this module an alias is already a copy of its anchor.
//! What remains is folding `<<` merge keys into their surrounding mapping and
//! resolving `extends` chains between jobs and hidden templates.

use crate::core::error::ConfigError;
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use tracing::debug;

/// YAML merge key
pub const MERGE_KEY: &str = "<<";

/// Job key naming the templates a job inherits from
pub const EXTENDS_KEY: &str = "extends";

/// Maximum depth of an `extends` chain
pub const MAX_EXTENDS_DEPTH: usize = 11;

/// Expand every `<<` merge key in the document.
///
/// Entries are folded in document order, so a later key replaces an earlier
/// one: a merge key overrides keys written before it and keys written after
/// it override merged ones. When the merge key names a list of mappings, the
/// earlier mapping wins. A key keeps the position where it first appeared.
///
/// A quoted `"<<"` is treated as a merge key too, since the parsed document
/// no longer records quoting.
pub fn apply_merge_keys(value: &mut Value, path: &str) -> Result<(), ConfigError> {
    match value {
        Value::Mapping(map) => {
            for (key, child) in map.iter_mut() {
                let child_path = match key.as_str() {
                    Some(name) if path.is_empty() => name.to_string(),
                    Some(name) => format!("{}.{}", path, name),
                    None => path.to_string(),
                };
                apply_merge_keys(child, &child_path)?;
            }

            if !map.contains_key(MERGE_KEY) {
                return Ok(());
            }

            let mut merged = Mapping::new();
            for (key, child) in std::mem::take(map) {
                if key.as_str() != Some(MERGE_KEY) {
                    merged.insert(key, child);
                    continue;
                }

                let mut combined = Mapping::new();
                for source in merge_sources(child, path)? {
                    for (source_key, source_value) in source {
                        if !combined.contains_key(&source_key) {
                            combined.insert(source_key, source_value);
                        }
                    }
                }
                for (source_key, source_value) in combined {
                    merged.insert(source_key, source_value);
                }
            }

            debug!("Expanded merge key in '{}'", display_path(path));
            *map = merged;
            Ok(())
        }
        Value::Sequence(items) => {
            for item in items.iter_mut() {
                apply_merge_keys(item, path)?;
            }
            Ok(())
        }
        Value::Tagged(tagged) => apply_merge_keys(&mut tagged.value, path),
        _ => Ok(()),
    }
}

fn merge_sources(value: Value, path: &str) -> Result<Vec<Mapping>, ConfigError> {
    match value {
        Value::Mapping(map) => Ok(vec![map]),
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Mapping(map) => Ok(map),
                _ => Err(ConfigError::InvalidMerge(display_path(path))),
            })
            .collect(),
        _ => Err(ConfigError::InvalidMerge(display_path(path))),
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "<document>".to_string()
    } else {
        path.to_string()
    }
}

/// Merge `overlay` into `base`.
///
/// Nested mappings merge key by key; any other value, lists included,
/// replaces what `base` had.
pub fn deep_merge(base: &mut Mapping, overlay: Mapping) {
    for (key, value) in overlay {
        if let Value::Mapping(incoming) = value {
            if let Some(Value::Mapping(existing)) = base.get_mut(&key) {
                deep_merge(existing, incoming);
                continue;
            }
            base.insert(key, Value::Mapping(incoming));
        } else {
            base.insert(key, value);
        }
    }
}

/// Resolves `extends` chains against the top-level job and template definitions
pub struct TemplateResolver<'a> {
    definitions: &'a Mapping,
    /// Expanded definitions with the length of their longest `extends` chain
    resolved: HashMap<String, (Mapping, usize)>,
}

impl<'a> TemplateResolver<'a> {
    pub fn new(definitions: &'a Mapping) -> Self {
        Self {
            definitions,
            resolved: HashMap::new(),
        }
    }

    /// Fully expanded definition of a job or template, without its `extends` key
    pub fn resolve(&mut self, name: &str) -> Result<Mapping, ConfigError> {
        let mut chain = Vec::new();
        let (expanded, _) = self.resolve_chain(name, &mut chain)?;
        Ok(expanded)
    }

    fn resolve_chain(&mut self, name: &str, chain: &mut Vec<String>) -> Result<(Mapping, usize), ConfigError> {
        if let Some((done, depth)) = self.resolved.get(name) {
            if chain.len() + depth > MAX_EXTENDS_DEPTH {
                return Err(too_deep(chain, name));
            }
            return Ok((done.clone(), *depth));
        }

        if chain.iter().any(|ancestor| ancestor == name) {
            return Err(ConfigError::ExtendsCycle(name.to_string()));
        }

        if chain.len() > MAX_EXTENDS_DEPTH {
            return Err(too_deep(chain, name));
        }

        let definition = match self.definitions.get(name) {
            Some(Value::Mapping(map)) => map,
            _ => return Err(ConfigError::JobNotMapping(name.to_string())),
        };

        let parents = extends_targets(name, definition.get(EXTENDS_KEY))?;
        let own: Mapping = definition
            .iter()
            .filter(|(key, _)| key.as_str() != Some(EXTENDS_KEY))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        chain.push(name.to_string());
        let mut expanded = Mapping::new();
        let mut depth = 0;
        for parent in &parents {
            if !self.definitions.contains_key(parent.as_str()) {
                return Err(ConfigError::UnknownTemplate {
                    job: name.to_string(),
                    template: parent.clone(),
                });
            }
            let (inherited, parent_depth) = self.resolve_chain(parent, chain)?;
            depth = depth.max(parent_depth + 1);
            deep_merge(&mut expanded, inherited);
        }
        deep_merge(&mut expanded, own);
        chain.pop();

        if !parents.is_empty() {
            debug!("Job '{}' extends {:?}", name, parents);
        }

        self.resolved.insert(name.to_string(), (expanded.clone(), depth));
        Ok((expanded, depth))
    }
}

fn too_deep(chain: &[String], name: &str) -> ConfigError {
    ConfigError::ExtendsTooDeep {
        job: chain.first().map(String::as_str).unwrap_or(name).to_string(),
        limit: MAX_EXTENDS_DEPTH,
    }
}

fn extends_targets(job: &str, value: Option<&Value>) -> Result<Vec<String>, ConfigError> {
    match value {
        None => Ok(Vec::new()),
        Some(Value::String(name)) => Ok(vec![name.clone()]),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ConfigError::InvalidExtends(job.to_string()))
            })
            .collect(),
        Some(_) => Err(ConfigError::InvalidExtends(job.to_string())),
    }
}
