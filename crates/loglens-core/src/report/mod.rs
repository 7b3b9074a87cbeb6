mod template;
mod writer;

pub use template::render_template;
pub use writer::ReportWriter;

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Placeholder in the report template replaced by the metrics table
pub const TABLE_PLACEHOLDER: &str = "table_json";

/// Report file name for a log date, e.g. `report-2017.06.30.html`
pub fn report_file_name(date: NaiveDate) -> String {
    format!("report-{}.html", date.format("%Y.%m.%d"))
}

/// Full path of the report for a log date.
///
/// Both the "already processed" check and the writer go through here.
pub fn report_path(report_dir: &Path, date: NaiveDate) -> PathBuf {
    report_dir.join(report_file_name(date))
}
