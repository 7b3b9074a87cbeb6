use crate::OutputFormat;
use anyhow::{Context, Result};
use loglens_core::{Config, Pipeline, RunOutcome};

/// Run the full pipeline against the newest log in `LOG_DIR`
pub fn execute(config: &Config, format: OutputFormat) -> Result<RunOutcome> {
    tracing::info!("Looking for logs in {}", config.log_dir.display());

    let outcome = Pipeline::new(config)
        .run()
        .context("Log analysis failed")?;

    match format {
        OutputFormat::Json => output_json(&outcome)?,
        _ => output_pretty(&outcome),
    }

    Ok(outcome)
}

fn output_pretty(outcome: &RunOutcome) {
    use console::style;

    match outcome {
        RunOutcome::NoLogFound => {
            println!("{}", style("No log files to analyze").yellow());
        }
        RunOutcome::AlreadyReported { report } => {
            println!(
                "{} {}",
                style("Already reported:").yellow(),
                report.display()
            );
        }
        RunOutcome::Generated { report, rows } => {
            println!(
                "{} {} ({} URLs)",
                style("Report written:").green().bold(),
                report.display(),
                rows
            );
        }
    }
}

fn output_json(outcome: &RunOutcome) -> Result<()> {
    let value = match outcome {
        RunOutcome::NoLogFound => serde_json::json!({ "status": "no_log_found" }),
        RunOutcome::AlreadyReported { report } => serde_json::json!({
            "status": "already_reported",
            "report": report.display().to_string(),
        }),
        RunOutcome::Generated { report, rows } => serde_json::json!({
            "status": "generated",
            "report": report.display().to_string(),
            "rows": rows,
        }),
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
