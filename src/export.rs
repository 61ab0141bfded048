//! CSV export of the cached subscriber list

use crate::api::Subscriber;
use crate::error::Result;
use crate::view::format_click_rate;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

/// Header row of the export
pub const CSV_HEADERS: [&str; 8] = [
    "ID",
    "Name",
    "Email",
    "Status",
    "Date Joined",
    "Opens",
    "Clicks",
    "Click Rate %",
];

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

/// Render subscribers as CSV: plain header, every data cell double-quoted
pub fn to_csv(subscribers: &[Subscriber]) -> String {
    let mut csv = CSV_HEADERS.join(",");
    csv.push('\n');

    for sub in subscribers {
        let row = [
            quote(&sub.id),
            quote(&sub.name),
            quote(&sub.email),
            quote(sub.status.as_str()),
            quote(sub.date.as_deref().unwrap_or("")),
            quote(&sub.opens.to_string()),
            quote(&sub.clicks.to_string()),
            quote(&format_click_rate(sub)),
        ];
        csv.push_str(&row.join(","));
        csv.push('\n');
    }
    csv
}

/// `subscribers_<YYYY-MM-DD>.csv`
pub fn file_name(date: NaiveDate) -> String {
    format!("subscribers_{}.csv", date.format("%Y-%m-%d"))
}

/// Write the export into `dir` and return the file path
///
/// # Errors
/// * `DashboardError::Export` if the directory or file cannot be written
pub fn write_csv(dir: &Path, subscribers: &[Subscriber], date: NaiveDate) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name(date));
    fs::write(&path, to_csv(subscribers))?;
    tracing::info!(path = %path.display(), rows = subscribers.len(), "Exported subscribers");
    Ok(path)
}
