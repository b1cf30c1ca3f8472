//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{ExpandCommand, JobsCommand, PlanCommand, ValidateCommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Default pipeline file, relative to the working directory
pub const DEFAULT_PIPELINE_FILE: &str = ".gitlab-ci.yml";

/// Load, expand, validate and plan GitLab-style CI pipelines
#[derive(Debug, Parser, Clone)]
#[command(name = "ciconf")]
#[command(version)]
#[command(about = "Load, expand, validate and plan GitLab-style CI pipelines", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the pipeline file
    #[arg(short, long, global = true, default_value = DEFAULT_PIPELINE_FILE)]
    pub file: PathBuf,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Validate a pipeline file
    Validate(ValidateCommand),

    /// Print the pipeline after merge keys, `extends` and defaults are applied
    Expand(ExpandCommand),

    /// List jobs
    Jobs(JobsCommand),

    /// Show the pipeline a ref would get
    Plan(PlanCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
