use assert_cmd::Command;
use flate2::Compression;
use flate2::write::GzEncoder;
use loglens_cli::OutputFormat;
use loglens_core::Config;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to get path to test fixtures
fn fixture_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join("LOG_DIR")
        .join(filename)
}

fn permissive_config() -> Config {
    Config {
        max_drop: 20.0,
        ..Config::default()
    }
}

#[test]
fn test_analyze_log_returns_metrics() {
    let file = fixture_path("nginx-access-ui.log-20170630");

    let analysis =
        loglens_cli::commands::stats::analyze_log(&file, &permissive_config(), None).unwrap();

    assert_eq!(analysis.stats.total_lines, 6);
    assert_eq!(analysis.stats.matched_lines, 5);
    assert_eq!(analysis.drop_ratio, 16.667);
    assert_eq!(analysis.metrics.len(), 3);

    let banner = &analysis.metrics[0];
    assert_eq!(banner.url, "/api/v2/banner/25019354 ");
    assert_eq!(banner.count, 3);
    assert_eq!(banner.time_max, 0.39);
    assert_eq!(banner.time_med, 0.39);
    assert_eq!(banner.count_perc, 50.0);
    assert_eq!(banner.time_perc, 77.896);
}

#[test]
fn test_analyze_log_top_limits_rows() {
    let file = fixture_path("nginx-access-ui.log-20170630");

    let analysis =
        loglens_cli::commands::stats::analyze_log(&file, &permissive_config(), Some(2)).unwrap();

    let urls: Vec<_> = analysis.metrics.iter().map(|m| m.url.as_str()).collect();
    assert_eq!(
        urls,
        vec!["/api/v2/banner/25019354 ", "/api/v2/banner/16852664 "]
    );
}

#[test]
fn test_analyze_gzipped_log() {
    let temp_dir = TempDir::new().unwrap();
    let gz = temp_dir.path().join("nginx-access-ui.log-20170630.gz");
    let plain = fs::read(fixture_path("nginx-access-ui.log-20170630")).unwrap();
    let mut encoder = GzEncoder::new(fs::File::create(&gz).unwrap(), Compression::default());
    encoder.write_all(&plain).unwrap();
    encoder.finish().unwrap();

    let analysis =
        loglens_cli::commands::stats::analyze_log(&gz, &permissive_config(), None).unwrap();

    assert_eq!(analysis.stats.total_lines, 6);
    assert_eq!(analysis.metrics.len(), 3);
}

#[test]
fn test_analyze_log_rejects_zero_top() {
    let file = fixture_path("nginx-access-ui.log-20170630");

    let result = loglens_cli::commands::stats::analyze_log(&file, &permissive_config(), Some(0));

    assert!(result.is_err());
}

#[test]
fn test_analyze_log_respects_max_drop() {
    let file = fixture_path("nginx-access-ui.log-20170630");

    let result = loglens_cli::commands::stats::analyze_log(&file, &Config::default(), None);

    assert!(result.is_err());
}

#[test]
fn test_execute_prints_every_format() {
    let file = fixture_path("nginx-access-ui.log-20170630");
    for format in [OutputFormat::Pretty, OutputFormat::Json, OutputFormat::Table] {
        let result =
            loglens_cli::commands::stats::execute(&file, &permissive_config(), None, format);
        assert!(result.is_ok(), "{:?} output should succeed", format);
    }
}

#[allow(deprecated)]
#[test]
fn test_stats_command_json_output() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("config.json");
    fs::write(&config, r#"{"MAX_DROP": 20}"#).unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin("loglens"));
    cmd.arg("stats")
        .arg(fixture_path("nginx-access-ui.log-20170630"))
        .arg("--config")
        .arg(&config)
        .arg("--format")
        .arg("json");

    let output = cmd.assert().success().get_output().stdout.clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["stats"]["total_lines"], 6);
    assert_eq!(json["metrics"].as_array().unwrap().len(), 3);
}

#[allow(deprecated)]
#[test]
fn test_stats_command_missing_file() {
    Command::new(assert_cmd::cargo::cargo_bin("loglens"))
        .arg("stats")
        .arg("/no/such/nginx-access-ui.log-20170630")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to analyze"));
}

#[allow(deprecated)]
#[test]
fn test_stats_command_zero_top_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("config.json");
    fs::write(&config, r#"{"MAX_DROP": 20}"#).unwrap();

    Command::new(assert_cmd::cargo::cargo_bin("loglens"))
        .arg("stats")
        .arg(fixture_path("nginx-access-ui.log-20170630"))
        .arg("--config")
        .arg(&config)
        .arg("--top")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--top must be at least 1"));
}
