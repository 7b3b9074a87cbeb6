use super::types::{ParseStats, ParsedRecord};
use crate::{Error, Result};
use flate2::read::MultiGzDecoder;
use lazy_static::lazy_static;
use regex::bytes::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

lazy_static! {
    /// Quoted request with method, URL and protocol, then the request time
    /// as the last space-separated decimal number on the line.
    static ref LINE_PATTERN: Regex = Regex::new(
        r#"(?i-u).*"(GET|POST|PUT|HEAD) (?P<url>.+)HTTP/1\.[01]".* (?P<request_time>\d+\.\d+)"#
    )
    .unwrap();
}

pub struct LogReader;

impl LogReader {
    /// Open an access log, decompressing it on the fly when it ends in `.gz`
    pub fn open(path: &Path) -> Result<LogLines<Box<dyn BufRead>>> {
        tracing::info!("Starting to parse {}", path.display());

        let file = File::open(path).map_err(|e| Error::file(path, e))?;
        let reader: Box<dyn BufRead> = if Self::is_gzipped(path) {
            tracing::debug!("Reading {} as gzip", path.display());
            Box::new(BufReader::new(MultiGzDecoder::new(BufReader::new(file))))
        } else {
            Box::new(BufReader::new(file))
        };

        let mut lines = LogLines::from_reader(reader);
        lines.source = Some(path.to_path_buf());
        Ok(lines)
    }

    pub fn is_gzipped(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "gz")
    }

    /// Match a single raw line against the request pattern
    ///
    /// Lines whose URL is not valid UTF-8 are treated as unmatched.
    pub fn parse_line(line: &[u8]) -> Option<ParsedRecord> {
        let captures = LINE_PATTERN.captures(line)?;

        let url = match std::str::from_utf8(&captures["url"]) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::debug!("Skipping line with non UTF-8 URL: {}", e);
                return None;
            }
        };
        let request_time = std::str::from_utf8(&captures["request_time"])
            .ok()?
            .parse::<f64>()
            .ok()
            .filter(|t| t.is_finite());
        let Some(request_time) = request_time else {
            tracing::debug!("Skipping line with out of range request time");
            return None;
        };

        Some(ParsedRecord { url, request_time })
    }
}

/// Lazy, single-pass sequence of matched records from one log
///
/// Counters in [`LogLines::stats`] are only final once the iterator has been
/// drained. A read error is yielded once and ends the sequence.
pub struct LogLines<R> {
    lines: io::Split<R>,
    stats: ParseStats,
    source: Option<PathBuf>,
    finished: bool,
}

impl<R: BufRead> LogLines<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: reader.split(b'\n'),
            stats: ParseStats::default(),
            source: None,
            finished: false,
        }
    }

    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    fn read_error(&self, e: io::Error) -> Error {
        match &self.source {
            Some(path) => Error::file(path, e),
            None => Error::Io(e),
        }
    }
}

impl<R: BufRead> Iterator for LogLines<R> {
    type Item = Result<ParsedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(self.read_error(e)));
                }
                None => {
                    self.finished = true;
                    return None;
                }
            };

            self.stats.total_lines += 1;
            if let Some(record) = LogReader::parse_line(&line) {
                self.stats.matched_lines += 1;
                return Some(Ok(record));
            }
        }
    }
}
