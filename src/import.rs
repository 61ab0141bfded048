//! Subscriber import files
//!
//! Accepts `.json` (a top-level array or an object with a `data` array) and
//! `.csv` (header row with Name/Email columns). Parsing is deliberately
//! forgiving: entries without an email are dropped, missing names become
//! `Unknown`.

use crate::api::ImportEntry;
use crate::error::{DashboardError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Name given to JSON entries that have none
pub const UNKNOWN_NAME: &str = "Unknown";

/// Number of entries shown in the confirmation dialog
pub const SAMPLE_SIZE: usize = 3;

/// Supported import formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// JSON array or `{ "data": [...] }`
    Json,
    /// Comma-separated with a header row
    Csv,
}

/// Pick the format from the file extension
///
/// # Errors
/// * `DashboardError::Import` for anything other than `.json` or `.csv`
pub fn detect_format(path: &Path) -> Result<ImportFormat> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if name.ends_with(".json") {
        Ok(ImportFormat::Json)
    } else if name.ends_with(".csv") {
        Ok(ImportFormat::Csv)
    } else {
        Err(DashboardError::Import(
            "Please select a CSV or JSON file".to_string(),
        ))
    }
}

/// Read and parse an import file
///
/// # Errors
/// * `DashboardError::Import` for unsupported files, unreadable files,
///   malformed content, or files without a single usable entry
pub fn parse_file(path: &Path) -> Result<Vec<ImportEntry>> {
    let format = detect_format(path)?;
    let text = fs::read_to_string(path).map_err(|e| {
        DashboardError::Import(format!("Cannot read {}: {}", path.display(), e))
    })?;

    let entries = match format {
        ImportFormat::Json => parse_json(&text)?,
        ImportFormat::Csv => parse_csv(&text)?,
    };

    if entries.is_empty() {
        return Err(DashboardError::Import(
            "No valid subscribers found in file".to_string(),
        ));
    }
    tracing::info!(path = %path.display(), count = entries.len(), "Parsed import file");
    Ok(entries)
}

/// Parse JSON import content
///
/// A JSON document of any other shape yields no entries.
pub fn parse_json(text: &str) -> Result<Vec<ImportEntry>> {
    let document: Value = serde_json::from_str(text)
        .map_err(|_| DashboardError::Import("Invalid JSON format".to_string()))?;

    let items: &[Value] = match &document {
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        Value::Array(items) => items.as_slice(),
        _ => &[],
    };

    Ok(items
        .iter()
        .filter_map(|item| {
            let email = non_empty_field(item, "email")?;
            let name = non_empty_field(item, "name").unwrap_or_else(|| UNKNOWN_NAME.to_string());
            Some(ImportEntry::new(name, email))
        })
        .collect())
}

/// A field rendered as text, or `None` when absent, null, false or empty
fn non_empty_field(item: &Value, key: &str) -> Option<String> {
    match item.get(key)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Parse CSV import content
///
/// The first non-blank line is the header. The first column whose header
/// contains `name` and the first containing `email` (case-insensitive) are
/// used. Rows missing either value are skipped.
///
/// # Errors
/// * `DashboardError::Import` when there is no data row or a column is missing
pub fn parse_csv(text: &str) -> Result<Vec<ImportEntry>> {
    let lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
    if lines.len() < 2 {
        return Err(DashboardError::Import(
            "CSV file appears to be empty".to_string(),
        ));
    }

    let headers: Vec<String> = lines[0]
        .split(',')
        .map(|h| h.trim().to_lowercase())
        .collect();
    let name_index = headers.iter().position(|h| h.contains("name"));
    let email_index = headers.iter().position(|h| h.contains("email"));

    let (Some(name_index), Some(email_index)) = (name_index, email_index) else {
        return Err(DashboardError::Import(
            "CSV must contain Name and Email columns".to_string(),
        ));
    };

    let mut entries = Vec::new();
    for line in &lines[1..] {
        let values: Vec<&str> = line.split(',').map(unquote).collect();
        match (values.get(name_index), values.get(email_index)) {
            (Some(name), Some(email)) if !name.is_empty() && !email.is_empty() => {
                entries.push(ImportEntry::new(*name, *email));
            }
            _ => tracing::debug!(line = %line, "Skipping CSV row without name or email"),
        }
    }
    Ok(entries)
}

/// Trim a cell and strip one pair of surrounding double quotes
fn unquote(cell: &str) -> &str {
    let cell = cell.trim();
    let cell = cell.strip_prefix('"').unwrap_or(cell);
    cell.strip_suffix('"').unwrap_or(cell)
}

/// Text of the confirmation dialog shown before submitting
pub fn confirmation_message(entries: &[ImportEntry]) -> String {
    let sample = entries
        .iter()
        .take(SAMPLE_SIZE)
        .map(|e| format!("{} ({})", e.name, e.email))
        .collect::<Vec<_>>()
        .join(", ");
    let more = if entries.len() > SAMPLE_SIZE { "..." } else { "" };
    format!(
        "Found {} subscribers to import.\n\nSample: {}{}\n\nContinue?",
        entries.len(),
        sample,
        more
    )
}
