use crate::analysis::{Aggregator, MetricsCalculator, UrlMetrics};
use crate::locator::find_latest_log;
use crate::log::{LogReader, ParseStats};
use crate::report::{ReportWriter, report_path};
use crate::{Config, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// How a run ended when nothing went wrong
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The log directory is missing or holds no matching log
    NoLogFound,
    /// The newest log already has a report
    AlreadyReported { report: PathBuf },
    /// A new report was written
    Generated { report: PathBuf, rows: usize },
}

/// Metrics for a single log file, without a rendered report
#[derive(Debug, Clone, Serialize)]
pub struct LogAnalysis {
    pub file: PathBuf,
    pub stats: ParseStats,
    pub drop_ratio: f64,
    pub total_request_time: f64,
    pub metrics: Vec<UrlMetrics>,
}

/// Locate, parse, aggregate and report, driven by one [`Config`]
pub struct Pipeline<'a> {
    config: &'a Config,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<RunOutcome> {
        let Some(log) = find_latest_log(&self.config.log_dir)? else {
            tracing::info!("No log files to analyze");
            return Ok(RunOutcome::NoLogFound);
        };

        let report = report_path(&self.config.report_dir, log.date);
        if report.exists() {
            tracing::info!(
                "Latest log {} is already analyzed in {}",
                log.path.display(),
                report.display()
            );
            return Ok(RunOutcome::AlreadyReported { report });
        }

        let analysis = self.analyze(&log.path, self.config.report_size)?;
        let rows = analysis.metrics.len();
        let report = ReportWriter::to_file(
            &self.config.report_sample,
            &self.config.report_dir,
            log.date,
            &analysis.metrics,
        )?;

        Ok(RunOutcome::Generated { report, rows })
    }

    /// Parse one log file and compute its metrics table
    ///
    /// Fails with [`crate::Error::ParseQuality`] when too many lines are unparsed.
    pub fn analyze(&self, path: &Path, report_size: usize) -> Result<LogAnalysis> {
        let lines = LogReader::open(path)?;
        let aggregate = Aggregator::new(self.config.max_drop).aggregate(lines)?;
        let metrics = MetricsCalculator::new(report_size).calculate(&aggregate);

        Ok(LogAnalysis {
            file: path.to_path_buf(),
            stats: aggregate.stats,
            drop_ratio: aggregate.stats.drop_ratio(),
            total_request_time: aggregate.total_request_time,
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::fs;
    use tempfile::TempDir;

    const LOG: &str = concat!(
        "1.196.116.32 -  - [29/Jun/2017:03:50:22 +0300] \"GET /api/v2/banner/25019354 HTTP/1.1\" 200 927 \"-\" \"Lynx/2.8.8dev.9\" \"-\" \"1498697422-2190034393-4708-9752759\" \"dc7161be3\" 0.390\n",
        "1.99.174.176 3b81f63526fa8  - [29/Jun/2017:03:50:22 +0300] \"GET /api/1/photogenic_banners/list/?server_name=WIN7RB4 HTTP/1.1\" 200 12 \"-\" \"Python-urllib/2.7\" \"-\" \"1498697422-32900793-4708-9752770\" \"-\" 0.133\n",
        "1.196.116.32 -  - [29/Jun/2017:03:50:22 +0300] \"GET /api/v2/banner/25019354 HTTP/1.1\" 200 927 \"-\" \"Lynx/2.8.8dev.9\" \"-\" \"1498697422-2190034393-4708-9752759\" \"dc7161be3\" 0.390\n",
        "broken line\n",
        "1.169.137.128 -  - [29/Jun/2017:03:50:22 +0300] \"GET /api/v2/banner/16852664 HTTP/1.1\" 200 19415 \"-\" \"Slotovod\" \"-\" \"1498697422-2118016444-4708-9752769\" \"712e90144abee9\" 0.199\n",
        "1.196.116.32 -  - [29/Jun/2017:03:50:22 +0300] \"GET /api/v2/banner/25019354 HTTP/1.1\" 200 927 \"-\" \"Lynx/2.8.8dev.9\" \"-\" \"1498697422-2190034393-4708-9752759\" \"dc7161be3\" 0.390\n",
    );

    fn setup(max_drop: f64) -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        let log_dir = dir.path().join("logs");
        fs::create_dir(&log_dir).unwrap();
        fs::write(log_dir.join("nginx-access-ui.log-20170630"), LOG).unwrap();
        fs::write(log_dir.join("nginx-access-ui.log-20170629"), "stale").unwrap();

        let sample = dir.path().join("report.html");
        fs::write(&sample, "<script>\nvar table = $table_json;\n</script>\n").unwrap();

        let config = Config {
            report_size: 1000,
            report_dir: dir.path().join("reports"),
            report_sample: sample,
            log_dir,
            max_drop,
            log_filename: None,
        };
        (dir, config)
    }

    fn embedded_table(path: &Path) -> Vec<UrlMetrics> {
        let content = fs::read_to_string(path).unwrap();
        let start = content.find("var table = ").unwrap() + "var table = ".len();
        let end = start + content[start..].find(";\n").unwrap();
        serde_json::from_str(&content[start..end]).unwrap()
    }

    #[test]
    fn test_run_generates_report_once() {
        let (_dir, config) = setup(20.0);
        let pipeline = Pipeline::new(&config);
        let expected = config.report_dir.join("report-2017.06.30.html");

        let first = pipeline.run().unwrap();
        assert_eq!(
            first,
            RunOutcome::Generated {
                report: expected.clone(),
                rows: 3
            }
        );
        let written = fs::read_to_string(&expected).unwrap();

        let second = pipeline.run().unwrap();
        assert_eq!(
            second,
            RunOutcome::AlreadyReported {
                report: expected.clone()
            }
        );
        assert_eq!(fs::read_to_string(&expected).unwrap(), written);
    }

    #[test]
    fn test_embedded_table_matches_metrics() {
        let (_dir, config) = setup(20.0);
        let pipeline = Pipeline::new(&config);
        let log = config.log_dir.join("nginx-access-ui.log-20170630");

        let analysis = pipeline.analyze(&log, config.report_size).unwrap();
        let RunOutcome::Generated { report, .. } = pipeline.run().unwrap() else {
            panic!("report should have been generated");
        };

        assert_eq!(embedded_table(&report), analysis.metrics);
        assert_eq!(analysis.drop_ratio, 16.667);
        assert_eq!(analysis.metrics[0].count_perc, 50.0);
    }

    #[test]
    fn test_quality_gate_aborts_without_report() {
        let (_dir, config) = setup(0.0);

        let result = Pipeline::new(&config).run();

        assert!(matches!(result, Err(Error::ParseQuality { .. })));
        assert!(!config.report_dir.join("report-2017.06.30.html").exists());
    }

    #[test]
    fn test_no_log_found() {
        let (dir, mut config) = setup(20.0);
        config.log_dir = dir.path().join("missing");

        assert_eq!(Pipeline::new(&config).run().unwrap(), RunOutcome::NoLogFound);
    }

    #[test]
    fn test_report_size_limits_rows() {
        let (_dir, mut config) = setup(20.0);
        config.report_size = 2;

        let outcome = Pipeline::new(&config).run().unwrap();
        let RunOutcome::Generated { report, rows } = outcome else {
            panic!("report should have been generated");
        };
        assert_eq!(rows, 2);
        assert_eq!(embedded_table(&report).len(), 2);
    }
}
