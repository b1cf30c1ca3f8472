//! Scenario-based tests for ciconf

#[path = "../helpers/mod.rs"]
mod helpers;

mod needs_dag;
mod ref_predicates;
mod template_reuse;
mod validation_errors;
mod variable_expansion;
