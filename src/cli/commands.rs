//! CLI command definitions

use crate::core::context::{PipelineSource, RefContext};
use crate::planning::SchedulingStrategy;
use clap::Args;

/// Validate a pipeline file
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Print the expanded pipeline
#[derive(Debug, Args, Clone)]
pub struct ExpandCommand {
    /// Only print this job
    #[arg(long)]
    pub job: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// List jobs
#[derive(Debug, Args, Clone)]
pub struct JobsCommand {
    /// Only list jobs of this stage
    #[arg(long)]
    pub stage: Option<String>,
}

/// Plan the pipeline for a ref
#[derive(Debug, Args, Clone)]
pub struct PlanCommand {
    /// Branch or tag name
    #[arg(long = "ref")]
    pub ref_name: String,

    /// Treat the ref as a tag
    #[arg(long)]
    pub tag: bool,

    /// What triggered the pipeline
    #[arg(long, value_enum, default_value_t = PipelineSourceArg::Push)]
    pub source: PipelineSourceArg,

    /// Scheduling strategy
    #[arg(long, value_enum, default_value_t = SchedulingStrategyArg::Stage)]
    pub strategy: SchedulingStrategyArg,

    /// Variable overrides (key=value)
    #[arg(long, value_parser = parse_key_value)]
    pub var: Vec<(String, String)>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

impl PlanCommand {
    /// The ref context described by the arguments
    pub fn context(&self) -> RefContext {
        let context = if self.tag {
            RefContext::tag(&self.ref_name)
        } else {
            RefContext::branch(&self.ref_name)
        };

        self.var
            .iter()
            .fold(context.with_source(self.source.into()), |context, (key, value)| {
                context.with_variable(key, value)
            })
    }
}

/// Pipeline source argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PipelineSourceArg {
    Push,
    Web,
    Schedule,
    Api,
    Trigger,
    Pipeline,
    MergeRequestEvent,
    External,
    Chat,
}

impl From<PipelineSourceArg> for PipelineSource {
    fn from(arg: PipelineSourceArg) -> Self {
        match arg {
            PipelineSourceArg::Push => PipelineSource::Push,
            PipelineSourceArg::Web => PipelineSource::Web,
            PipelineSourceArg::Schedule => PipelineSource::Schedule,
            PipelineSourceArg::Api => PipelineSource::Api,
            PipelineSourceArg::Trigger => PipelineSource::Trigger,
            PipelineSourceArg::Pipeline => PipelineSource::Pipeline,
            PipelineSourceArg::MergeRequestEvent => PipelineSource::MergeRequestEvent,
            PipelineSourceArg::External => PipelineSource::External,
            PipelineSourceArg::Chat => PipelineSource::Chat,
        }
    }
}

/// Scheduling strategy argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SchedulingStrategyArg {
    Stage,
    Needs,
}

impl From<SchedulingStrategyArg> for SchedulingStrategy {
    fn from(arg: SchedulingStrategyArg) -> Self {
        match arg {
            SchedulingStrategyArg::Stage => SchedulingStrategy::StageOrder,
            SchedulingStrategyArg::Needs => SchedulingStrategy::Needs,
        }
    }
}

/// Parse key=value pairs
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("Invalid key=value pair: {}", s)),
    }
}
