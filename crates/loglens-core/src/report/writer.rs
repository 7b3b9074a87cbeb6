use super::{TABLE_PLACEHOLDER, render_template, report_path};
use crate::analysis::UrlMetrics;
use crate::{Error, Result};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub struct ReportWriter;

impl ReportWriter {
    /// Render the metrics table into the template text
    pub fn render(template: &str, table: &[UrlMetrics]) -> Result<String> {
        if !template.contains(TABLE_PLACEHOLDER) {
            tracing::warn!("Report template has no ${} placeholder", TABLE_PLACEHOLDER);
        }

        let table_json = serde_json::to_string(table)?;
        let values = HashMap::from([(TABLE_PLACEHOLDER, table_json)]);
        Ok(render_template(template, &values))
    }

    /// Write the report for `date` into `report_dir` using the template at `sample`
    ///
    /// The report is assembled in a temporary file next to its destination and
    /// only moved into place once fully written. An existing report is never
    /// overwritten.
    pub fn to_file(
        sample: &Path,
        report_dir: &Path,
        date: NaiveDate,
        table: &[UrlMetrics],
    ) -> Result<PathBuf> {
        tracing::debug!("Reading report template from: {}", sample.display());

        let template = fs::read_to_string(sample).map_err(|e| Error::file(sample, e))?;
        let content = Self::render(&template, table)?;

        fs::create_dir_all(report_dir).map_err(|e| Error::file(report_dir, e))?;
        let path = report_path(report_dir, date);

        let mut tmp = NamedTempFile::new_in(report_dir).map_err(|e| Error::file(report_dir, e))?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| Error::file(&path, e))?;
        tmp.persist_noclobber(&path)
            .map_err(|e| Error::file(&path, e.error))?;

        tracing::info!(
            "Wrote report with {} URLs to {}",
            table.len(),
            path.display()
        );

        Ok(path)
    }
}
