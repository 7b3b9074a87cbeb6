mod aggregator;
mod metrics;

pub use aggregator::Aggregator;
pub use metrics::{MetricsCalculator, median};

use crate::log::ParseStats;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request times per URL, iterated in the order URLs were first seen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlAggregate {
    entries: Vec<(String, Vec<f64>)>,
    index: HashMap<String, usize>,
}

impl UrlAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, url: String, request_time: f64) {
        match self.index.get(&url) {
            Some(&idx) => self.entries[idx].1.push(request_time),
            None => {
                self.index.insert(url.clone(), self.entries.len());
                self.entries.push((url, vec![request_time]));
            }
        }
    }

    pub fn get(&self, url: &str) -> Option<&[f64]> {
        self.index
            .get(url)
            .map(|&idx| self.entries[idx].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.entries
            .iter()
            .map(|(url, times)| (url.as_str(), times.as_slice()))
    }

    /// Number of distinct URLs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for UrlAggregate {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        let mut urls = UrlAggregate::new();
        for (url, time) in iter {
            urls.record(url.into(), time);
        }
        urls
    }
}

/// Everything one pass over a log file produces
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    pub urls: UrlAggregate,
    pub stats: ParseStats,
    /// Sum of all matched request times, in file order
    pub total_request_time: f64,
}

/// One report row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlMetrics {
    pub url: String,
    pub count: usize,
    pub time_sum: f64,
    pub time_avg: f64,
    pub time_max: f64,
    pub time_med: f64,
    pub count_perc: f64,
    pub time_perc: f64,
}
