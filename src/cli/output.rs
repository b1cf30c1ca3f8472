//! CLI output formatting

use crate::core::{config::JobConfig, stage::Stages, PipelineConfig};
use crate::planning::{PipelinePlan, PlannedJob, SkippedJob};
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");
pub static HAND: Emoji<'_, '_> = Emoji("✋ ", "* ");

/// Stage order as `a → b → c`
pub fn format_stages(stages: &Stages) -> String {
    stages
        .declared()
        .iter()
        .map(|stage| style(stage).cyan().to_string())
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Summary printed after a successful validation
pub fn format_summary(config: &PipelineConfig) -> String {
    format!(
        "  Stages: {}\n  Jobs: {}\n  Templates: {}\n  Variables: {}",
        format_stages(&config.stages),
        style(config.jobs().len()).cyan(),
        style(config.templates().len()).cyan(),
        style(config.variables.len()).cyan()
    )
}

/// One line per job: name, stage, image and `only`
pub fn format_job_line(job: &JobConfig) -> String {
    let mut line = format!(
        "  {} {}",
        style(&job.name).bold(),
        style(format!("[{}]", job.stage)).cyan()
    );
    if let Some(image) = &job.image {
        line.push_str(&format!(" {}", style(image.name()).dim()));
    }
    if let Some(only) = &job.only {
        line.push_str(&format!(" only: {}", style(only.refs().join(", ")).yellow()));
    }
    line
}

pub fn format_warning(warning: &str) -> String {
    format!("{}{}", WARN, style(warning).yellow())
}

pub fn format_error(error: &dyn std::fmt::Display) -> String {
    format!("  {}", style(error).red())
}

fn format_planned_job(job: &PlannedJob) -> String {
    let marker = if job.manual { HAND } else { CHECK };
    let mut line = format!("    {}{}", marker, style(&job.name).bold());
    if let Some(image) = &job.image {
        line.push_str(&format!(" {}", style(image).dim()));
    }
    if job.manual {
        line.push_str(&format!(" {}", style("(manual)").yellow()));
    }
    if !job.artifacts_from.is_empty() {
        line.push_str(&format!(" ← {}", style(job.artifacts_from.join(", ")).dim()));
    }
    if !job.artifacts.is_empty() {
        line.push_str(&format!(" → {}", style(job.artifacts.join(", ")).green()));
    }
    line
}

fn format_skipped_job(job: &SkippedJob) -> String {
    format!(
        "    {} {} {}",
        style("-").dim(),
        style(&job.name).dim(),
        style(format!("[{}] {}", job.stage, job.reason)).dim()
    )
}

/// A plan as stage blocks, followed by skipped jobs and waves
pub fn format_plan(plan: &PipelinePlan, waves: &[Vec<String>]) -> String {
    let mut lines = vec![format!(
        "{} Pipeline for {} ({})",
        ROCKET,
        style(&plan.ref_name).bold(),
        plan.source.as_str()
    )];

    if plan.is_empty() {
        lines.push(format!("  {}", style("No jobs would run").yellow()));
    }

    for stage in &plan.stages {
        lines.push(format!("  {}", style(&stage.name).cyan().bold()));
        lines.extend(stage.jobs.iter().map(format_planned_job));
    }

    if !plan.skipped.is_empty() {
        lines.push(format!("  {}", style("skipped").dim()));
        lines.extend(plan.skipped.iter().map(format_skipped_job));
    }

    if !waves.is_empty() {
        lines.push(format!("  {}", style("waves").bold()));
        for (index, wave) in waves.iter().enumerate() {
            lines.push(format!("    {}. {}", index + 1, wave.join(", ")));
        }
    }

    lines.join("\n")
}
