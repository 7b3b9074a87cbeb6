use serde::{Deserialize, Serialize};

/// One access log line that matched the request pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecord {
    /// Request target as captured, including the space before the protocol
    pub url: String,
    /// Request processing time in seconds
    pub request_time: f64,
}

/// Line counters collected while scanning a log file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    pub total_lines: usize,
    pub matched_lines: usize,
}

impl ParseStats {
    pub fn dropped_lines(&self) -> usize {
        self.total_lines - self.matched_lines
    }

    /// Share of unparsed lines in percent, rounded to 3 decimals
    ///
    /// An empty file has nothing to drop and reports `0.0`.
    pub fn drop_ratio(&self) -> f64 {
        if self.total_lines == 0 {
            return 0.0;
        }
        round3(self.dropped_lines() as f64 / self.total_lines as f64 * 100.0)
    }
}

/// Round to 3 decimal places
///
/// Goes through decimal formatting so the exact binary value is rounded,
/// not a product that has already been rounded once.
pub fn round3(value: f64) -> f64 {
    format!("{:.3}", value).parse::<f64>().unwrap_or(value)
}
