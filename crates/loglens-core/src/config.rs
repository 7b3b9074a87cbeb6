use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Resolved settings for one analyzer run.
///
/// Every key is optional in the JSON file; missing keys keep their defaults.
/// Unknown keys are ignored so that one file can be shared with other tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct Config {
    /// Maximum number of URL rows kept in the report
    pub report_size: usize,
    /// Directory where rendered reports are written
    pub report_dir: PathBuf,
    /// HTML template containing the `$table_json` placeholder
    pub report_sample: PathBuf,
    /// Directory scanned for access logs
    pub log_dir: PathBuf,
    /// Highest tolerated share of unparsed lines, in percent
    pub max_drop: f64,
    /// Write logs to this file instead of stderr
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filename: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report_size: 1000,
            report_dir: PathBuf::from("resources/REPORTS_DIR/"),
            report_sample: PathBuf::from("resources/REPORT_SAMPLE/report.html"),
            log_dir: PathBuf::from("resources/LOG_DIR/"),
            max_drop: 5.0,
            log_filename: None,
        }
    }
}

impl Config {
    /// Load a JSON config file and overlay it on the defaults
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!("Reading config from: {}", path.display());

        let file = File::open(path).map_err(|e| Error::file(path, e))?;
        let config: Config = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.report_size == 0 {
            return Err(Error::Config("REPORT_SIZE must be at least 1".to_string()));
        }
        if !self.max_drop.is_finite() || self.max_drop < 0.0 {
            return Err(Error::Config(format!(
                "MAX_DROP must be a non-negative percentage, got {}",
                self.max_drop
            )));
        }
        Ok(())
    }
}

impl FromStr for Config {
    type Err = Error;

    /// Parse a config from a JSON string
    fn from_str(content: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
