use super::{Aggregate, UrlAggregate};
use crate::log::LogLines;
use crate::{Error, Result};
use std::io::BufRead;

/// Folds parsed records into per-URL request times and enforces the
/// parse-quality gate
pub struct Aggregator {
    max_drop: f64,
}

impl Aggregator {
    pub fn new(max_drop: f64) -> Self {
        Self { max_drop }
    }

    /// Drain `lines` completely, then check the drop ratio
    pub fn aggregate<R: BufRead>(&self, mut lines: LogLines<R>) -> Result<Aggregate> {
        let mut urls = UrlAggregate::new();
        let mut total_request_time = 0.0;

        for record in lines.by_ref() {
            let record = record?;
            total_request_time += record.request_time;
            urls.record(record.url, record.request_time);
        }

        let stats = lines.stats();
        if stats.total_lines == 0 {
            tracing::warn!("Log file is empty, nothing to aggregate");
        }

        let dropped = stats.drop_ratio();
        if dropped > self.max_drop {
            tracing::error!(
                "Found {}% unparsed lines, more than allowed {}%",
                dropped,
                self.max_drop
            );
            return Err(Error::ParseQuality {
                dropped,
                allowed: self.max_drop,
            });
        }

        tracing::info!(
            "Parsed {} of {} lines ({}% dropped, allowed {}%), {} distinct URLs",
            stats.matched_lines,
            stats.total_lines,
            dropped,
            self.max_drop,
            urls.len()
        );

        Ok(Aggregate {
            urls,
            stats,
            total_request_time,
        })
    }
}
