use std::path::Path;

use crate::error::InputError;
use crate::models::RawRecord;
use crate::title::{collapse_whitespace, trim_leading_zeros};

pub fn read_subjects(path: &Path) -> Result<Vec<RawRecord>, InputError> {
    if !path.exists() {
        return Err(InputError::Missing {
            path: path.to_path_buf(),
        });
    }

    let text = std::fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let records = parse_subjects(&text);
    tracing::info!("read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Parses tab-separated `issue_id, state, title, ...` rows. Rows that are
/// blank, short, or lack an integer id are dropped.
pub fn parse_subjects(text: &str) -> Vec<RawRecord> {
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(line) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!("skipped {skipped} unparseable rows");
    }

    records
}

fn parse_line(line: &str) -> Option<RawRecord> {
    let columns: Vec<&str> = line.split('\t').collect();
    if columns.len() < 3 {
        return None;
    }

    let issue_id = parse_issue_id(columns[0])?;

    Some(RawRecord {
        issue_id,
        state: collapse_whitespace(columns[1]),
        raw_title: columns[2].trim().to_string(),
    })
}

/// Accepts an optionally signed run of ASCII digits of any length.
fn parse_issue_id(column: &str) -> Option<String> {
    let column = column.trim();
    let (negative, digits) = match column.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, column.strip_prefix('+').unwrap_or(column)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let magnitude = trim_leading_zeros(digits);
    if negative && magnitude != "0" {
        Some(format!("-{magnitude}"))
    } else {
        Some(magnitude.to_string())
    }
}
