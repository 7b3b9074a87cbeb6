use crate::OutputFormat;
use anyhow::{Context, Result};
use loglens_core::pipeline::LogAnalysis;
use loglens_core::{Config, Pipeline};
use std::path::Path;

/// Analyze a single log file and return its metrics table
pub fn analyze_log(file: &Path, config: &Config, top: Option<usize>) -> Result<LogAnalysis> {
    tracing::debug!("Analyzing log file: {}", file.display());

    anyhow::ensure!(top != Some(0), "--top must be at least 1");
    let report_size = top.unwrap_or(config.report_size);
    Pipeline::new(config)
        .analyze(file, report_size)
        .with_context(|| format!("Failed to analyze {}", file.display()))
}

pub fn execute(
    file: &Path,
    config: &Config,
    top: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    tracing::info!("Extracting statistics from log file: {}", file.display());

    let analysis = analyze_log(file, config, top)?;

    match format {
        OutputFormat::Json => output_json(&analysis)?,
        OutputFormat::Table => output_table(&analysis),
        OutputFormat::Pretty => output_pretty(&analysis),
    }

    Ok(())
}

fn output_pretty(analysis: &LogAnalysis) {
    use console::style;

    println!("\n{}", style("Access Log Statistics").bold().cyan());
    println!("{}", style("=====================").cyan());

    println!("\n{}", style("Summary:").bold());
    println!("  File:               {}", analysis.file.display());
    println!("  Total Lines:        {}", analysis.stats.total_lines);
    println!("  Parsed Lines:       {}", analysis.stats.matched_lines);
    println!("  Dropped:            {}%", analysis.drop_ratio);
    println!(
        "  Total Request Time: {:.3} s",
        analysis.total_request_time
    );

    if !analysis.metrics.is_empty() {
        println!("\n{}", style("URLs:").bold());
        for (i, row) in analysis.metrics.iter().enumerate() {
            println!(
                "  {}. [avg {:.3} s, max {:.3} s, med {:.3} s] x{} ({}% of requests, {}% of time) {}",
                i + 1,
                row.time_avg,
                row.time_max,
                row.time_med,
                row.count,
                row.count_perc,
                row.time_perc,
                row.url.trim_end()
            );
        }
    }

    println!();
}

fn output_json(analysis: &LogAnalysis) -> Result<()> {
    let json = serde_json::to_string_pretty(analysis)?;
    println!("{}", json);
    Ok(())
}

fn output_table(analysis: &LogAnalysis) {
    println!("url,count,count_perc,time_sum,time_perc,time_avg,time_max,time_med");
    for row in &analysis.metrics {
        println!(
            "{},{},{},{},{},{},{},{}",
            row.url.trim_end(),
            row.count,
            row.count_perc,
            row.time_sum,
            row.time_perc,
            row.time_avg,
            row.time_max,
            row.time_med
        );
    }
}
