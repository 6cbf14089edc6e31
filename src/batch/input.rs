use anyhow::{Context, Result};
use std::path::Path;
use tracing::warn;

const USERNAME_COLUMN: &str = "username";

/// One record of the input file.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRow {
    pub username: Option<String>,
    /// Remaining columns, passed through untouched.
    pub extra: Vec<(String, String)>,
}

impl InputRow {
    /// The username as written to the output; missing cells become empty.
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or("")
    }
}

/// Read every row of a headed CSV file into memory.
pub fn read_rows(path: &Path) -> Result<Vec<InputRow>> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open input file {}", path.display()))?;

    parse_rows(reader).with_context(|| format!("Failed to parse input file {}", path.display()))
}

fn parse_rows<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<InputRow>> {
    let headers: Vec<String> = reader
        .byte_headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(decode)
        .collect();
    let username_idx = headers.iter().position(|h| h.trim() == USERNAME_COLUMN);
    if username_idx.is_none() {
        warn!("Input has no '{}' column; every row will be rejected", USERNAME_COLUMN);
    }

    let mut rows = Vec::new();
    for (line, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Bad CSV record at row {}", line + 1))?;

        if std::str::from_utf8(record.as_slice()).is_err() {
            warn!("Row {} is not valid UTF-8; decoding lossily", line + 1);
        }

        let mut username = None;
        let mut extra = Vec::new();
        for (idx, value) in record.iter().enumerate() {
            if Some(idx) == username_idx {
                username = Some(decode(value));
            } else {
                let header = headers.get(idx).cloned().unwrap_or_default();
                extra.push((header, decode(value)));
            }
        }

        rows.push(InputRow { username, extra });
    }

    Ok(rows)
}

/// Bad bytes become U+FFFD rather than failing the whole file.
fn decode(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}
