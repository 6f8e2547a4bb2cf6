//! History export to CSV and plain text

use chrono::{Local, NaiveDate, SecondsFormat, TimeZone};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::error::{KpwgenError, Result};
use crate::history::HistoryEntry;

const CSV_HEADER: [&str; 4] = ["Platform", "Account", "Password", "Generated At"];
const TXT_SEPARATOR: &str = "----------------------------------------";
const FILENAME_PLATFORMS: usize = 3;

/// Export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Txt,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Txt => "txt",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Txt => "text/plain",
        }
    }

    pub fn render(&self, entries: &[HistoryEntry]) -> String {
        match self {
            ExportFormat::Csv => to_csv(entries),
            ExportFormat::Txt => to_txt(entries),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = KpwgenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "txt" | "text" => Ok(ExportFormat::Txt),
            _ => Err(KpwgenError::InvalidFormat(s.to_string())),
        }
    }
}

/// Quote a field if it contains a comma, quote or newline
fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render entries as CSV; empty input gives an empty string
pub fn to_csv(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push(CSV_HEADER.join(","));
    for entry in entries {
        let fields = [
            escape_csv_field(&entry.platform),
            escape_csv_field(entry.account.as_deref().unwrap_or("")),
            escape_csv_field(&entry.password),
            escape_csv_field(&entry.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ];
        lines.push(fields.join(","));
    }
    lines.join("\n")
}

/// Render entries as labelled text blocks in the local time zone
pub fn to_txt(entries: &[HistoryEntry]) -> String {
    to_txt_in(entries, &Local)
}

/// Render entries as labelled text blocks, timestamps shown in `tz`
pub fn to_txt_in<Tz>(entries: &[HistoryEntry], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    entries
        .iter()
        .map(|entry| {
            let mut block = format!("Platform   : {}\n", entry.platform);
            if let Some(account) = entry.account.as_deref().filter(|a| !a.is_empty()) {
                block.push_str(&format!("Account    : {}\n", account));
            }
            block.push_str(&format!("Password   : {}\n", entry.password));
            block.push_str(&format!(
                "Generated  : {}\n",
                entry
                    .timestamp
                    .with_timezone(tz)
                    .format("%-d/%-m/%Y, %H.%M.%S")
            ));
            block.push_str(TXT_SEPARATOR);
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Export filename (no extension) dated today
pub fn filename(entries: &[HistoryEntry]) -> String {
    filename_on(entries, Local::now().date_naive())
}

/// Export filename (no extension) for an explicit date
pub fn filename_on(entries: &[HistoryEntry], date: NaiveDate) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let mut platforms = entries
        .iter()
        .take(FILENAME_PLATFORMS)
        .map(|entry| {
            entry
                .platform
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("-");

    if entries.len() > FILENAME_PLATFORMS {
        platforms.push_str(&format!("_{}+", entries.len() - FILENAME_PLATFORMS));
    }

    format!("Kpwgen_{}_{}", date.format("%d-%m-%Y"), platforms)
}

/// First path in `dir` not already taken: `stem.ext`, then `stem (1).ext`, ...
async fn unused_path(dir: &Path, stem: &str, extension: &str) -> Result<PathBuf> {
    let mut path = dir.join(format!("{}.{}", stem, extension));
    let mut n = 0;
    while tokio::fs::try_exists(&path).await? {
        n += 1;
        path = dir.join(format!("{} ({}).{}", stem, n, extension));
    }
    Ok(path)
}

/// Write an export file into `dir`, returning its path.
///
/// Existing files are never replaced; a numbered name is used instead.
pub async fn write_export(
    dir: &Path,
    entries: &[HistoryEntry],
    format: ExportFormat,
) -> Result<PathBuf> {
    if entries.is_empty() {
        return Err(KpwgenError::NothingToExport);
    }

    let path = unused_path(dir, &filename(entries), format.extension()).await?;
    let contents = format.render(entries);

    // Write atomically using a temp file
    let temp_path = path.with_extension("tmp");
    tokio::fs::write(&temp_path, contents.as_bytes()).await?;
    tokio::fs::rename(&temp_path, &path).await?;

    info!(
        "Exported {} entries as {} to {:?}",
        entries.len(),
        format.mime_type(),
        path
    );
    Ok(path)
}
