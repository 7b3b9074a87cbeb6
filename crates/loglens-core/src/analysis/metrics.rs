use super::{Aggregate, UrlMetrics};
use crate::log::round3;
use std::cmp::Ordering;

/// Turns aggregated request times into report rows
pub struct MetricsCalculator {
    report_size: usize,
}

impl MetricsCalculator {
    pub fn new(report_size: usize) -> Self {
        Self { report_size }
    }

    pub fn calculate(&self, aggregate: &Aggregate) -> Vec<UrlMetrics> {
        tracing::debug!("Calculating metrics for {} URLs", aggregate.urls.len());

        let total_lines = aggregate.stats.total_lines as f64;
        let total_time = aggregate.total_request_time;

        let mut table: Vec<UrlMetrics> = aggregate
            .urls
            .iter()
            .filter(|(_, times)| !times.is_empty())
            .map(|(url, times)| {
                let count = times.len();
                let time_sum: f64 = times.iter().sum();
                let time_max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);

                UrlMetrics {
                    url: url.to_string(),
                    count,
                    time_sum,
                    time_avg: time_sum / count as f64,
                    time_max,
                    time_med: median(times),
                    count_perc: percent(count as f64, total_lines),
                    time_perc: percent(time_sum, total_time),
                }
            })
            .collect();

        if table.len() > self.report_size {
            tracing::info!(
                "{} URLs exceed report size {}, keeping the slowest on average",
                table.len(),
                self.report_size
            );
            // Stable, so equal averages keep first-seen order
            table.sort_by(|a, b| {
                b.time_avg
                    .partial_cmp(&a.time_avg)
                    .unwrap_or(Ordering::Equal)
            });
            table.truncate(self.report_size);
        }

        tracing::info!("Calculated metrics for {} URLs", table.len());
        table
    }
}

/// Median of `values`; the mean of the two middle values for even lengths.
/// Returns `0.0` for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len().is_multiple_of(2) {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    round3(part / whole * 100.0)
}
