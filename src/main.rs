use anyhow::{Context, Result};
use ciconf::cli::commands::{ExpandCommand, JobsCommand, PlanCommand, ValidateCommand};
use ciconf::cli::output::*;
use ciconf::cli::{Cli, Command};
use ciconf::core::PipelineConfig;
use ciconf::planning::SchedulingStrategy;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging; RUST_LOG overrides the default level
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to set logging subscriber")?;

    match &cli.command {
        Command::Validate(cmd) => validate_pipeline(&cli.file, cmd)?,
        Command::Expand(cmd) => expand_pipeline(&cli.file, cmd)?,
        Command::Jobs(cmd) => list_jobs(&cli.file, cmd)?,
        Command::Plan(cmd) => plan_pipeline(&cli.file, cmd)?,
    }

    Ok(())
}

fn validate_pipeline(file: &Path, cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating {}...", INFO, style(file.display()).bold());

    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read pipeline file {}", file.display()))?;

    let errors: Vec<String> = match PipelineConfig::parse(&content) {
        Ok(config) => {
            for warning in config.warnings() {
                println!("{}", format_warning(warning));
            }

            let errors = config.errors();
            if errors.is_empty() {
                println!("{} Pipeline configuration is valid!", CHECK);
                println!("{}", format_summary(&config));

                if cmd.json {
                    println!("\n{}", serde_json::to_string_pretty(&config.to_json()?)?);
                }
                return Ok(());
            }
            errors.iter().map(ToString::to_string).collect()
        }
        Err(e) => vec![e.to_string()],
    };

    println!("{} Validation failed:", CROSS);
    for error in &errors {
        println!("{}", format_error(error));
    }
    std::process::exit(1);
}

fn expand_pipeline(file: &Path, cmd: &ExpandCommand) -> Result<()> {
    let config = PipelineConfig::from_file(file)?;

    let output = match &cmd.job {
        Some(name) => {
            let job = config
                .job(name)
                .with_context(|| format!("No job named '{}'", name))?;
            if cmd.json {
                serde_json::to_string_pretty(job)?
            } else {
                let mut single = serde_yaml::Mapping::new();
                single.insert(name.clone().into(), serde_yaml::to_value(job)?);
                serde_yaml::to_string(&single)?
            }
        }
        None if cmd.json => serde_json::to_string_pretty(&config.to_json()?)?,
        None => config.to_merged_yaml()?,
    };

    println!("{}", output.trim_end());
    Ok(())
}

fn list_jobs(file: &Path, cmd: &JobsCommand) -> Result<()> {
    let config = PipelineConfig::from_file(file)?;

    println!("{} Stages: {}", INFO, format_stages(&config.stages));
    for stage in config.stages.iter() {
        if cmd.stage.as_deref().is_some_and(|wanted| wanted != stage) {
            continue;
        }
        for job in config.jobs().iter().filter(|job| job.stage == stage) {
            println!("{}", format_job_line(job));
        }
    }

    Ok(())
}

fn plan_pipeline(file: &Path, cmd: &PlanCommand) -> Result<()> {
    let config = PipelineConfig::from_file(file)?;
    let pipeline = config.to_pipeline()?;

    let context = cmd.context();
    let plan = pipeline
        .plan(&context)
        .with_context(|| format!("Failed to plan pipeline for '{}'", cmd.ref_name))?;

    let strategy: SchedulingStrategy = cmd.strategy.into();
    let waves = plan.waves(strategy);

    if cmd.json {
        let data = serde_json::json!({ "plan": plan, "waves": waves });
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        println!("{}", format_plan(&plan, &waves));
    }

    Ok(())
}
