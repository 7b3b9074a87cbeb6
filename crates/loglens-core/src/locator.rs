use crate::{Error, Result};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name prefix of the access logs we look for
pub const LOG_PREFIX: &str = "nginx-access-ui.log";

lazy_static! {
    static ref LOG_NAME_PATTERN: Regex =
        Regex::new(r"^nginx-access-ui\.log-(?P<date>\d{8})(?:\.gz)?$").unwrap();
}

/// An access log picked for analysis, together with the date in its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub path: PathBuf,
    pub date: NaiveDate,
}

/// Extract the embedded date from a log file name
///
/// Returns `None` for names that don't follow `nginx-access-ui.log-YYYYMMDD[.gz]`
/// or whose date token is not a real calendar date.
pub fn parse_log_date(file_name: &str) -> Option<NaiveDate> {
    let captures = LOG_NAME_PATTERN.captures(file_name)?;
    let token = &captures["date"];
    match NaiveDate::parse_from_str(token, "%Y%m%d") {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::debug!("Skipping {}: bad date {}: {}", file_name, token, e);
            None
        }
    }
}

/// Find the log file with the most recent embedded date in `dir`
///
/// A missing directory or one without matching files is not an error: the
/// caller gets `Ok(None)` and has nothing to do.
pub fn find_latest_log(dir: &Path) -> Result<Option<LogFile>> {
    tracing::debug!("Looking for the latest log in: {}", dir.display());

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!("Log directory {} does not exist", dir.display());
            return Ok(None);
        }
        Err(e) => return Err(Error::file(dir, e)),
    };

    let mut latest: Option<LogFile> = None;
    for entry in entries {
        let entry = entry.map_err(|e| Error::file(dir, e))?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let Some(date) = parse_log_date(name) else {
            continue;
        };
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }

        if latest.as_ref().is_none_or(|current| date > current.date) {
            latest = Some(LogFile {
                path: entry.path(),
                date,
            });
        }
    }

    match &latest {
        Some(log) => tracing::info!("Found latest log: {}", log.path.display()),
        None => tracing::info!("No {} files in {}", LOG_PREFIX, dir.display()),
    }

    Ok(latest)
}
