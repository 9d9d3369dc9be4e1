//! CSV dataset readers
//!
//! Columns are looked up by explicit header name. A missing column is a
//! [`Error::Dataset`], never a guess at some other column. Rows that are
//! short, unreadable or unparsable are skipped with a warning.

use crate::error::{Error, Result};
use crate::types::CustomerRecord;
use csv::{Reader, StringRecord};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

/// Column names of the spam dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpamColumns {
    #[serde(default = "default_text_column")]
    pub text: String,

    #[serde(default = "default_label_column")]
    pub label: String,
}

impl Default for SpamColumns {
    fn default() -> Self {
        Self {
            text: default_text_column(),
            label: default_label_column(),
        }
    }
}

fn default_text_column() -> String {
    "text".to_string()
}

fn default_label_column() -> String {
    "label".to_string()
}

/// Default label column of the churn dataset
pub const CHURN_LABEL_COLUMN: &str = "Churn";

/// One row of the spam dataset, label kept verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpamRow {
    pub text: String,
    pub label: String,
}

/// One row of the churn dataset
#[derive(Debug, Clone, PartialEq)]
pub struct ChurnRow {
    pub record: CustomerRecord,
    pub churned: bool,
}

fn column_index(headers: &StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers.iter().position(|h| h.trim() == name).ok_or_else(|| {
        Error::dataset(format!("column '{}' not found in {}", name, path.display()))
    })
}

fn field<'r>(record: &'r StringRecord, index: usize, line: u64) -> Result<&'r str> {
    record
        .get(index)
        .ok_or_else(|| Error::dataset(format!("line {}: missing field {}", line, index)))
}

/// Parse every data row, skipping rows that fail
fn parse_rows<T>(
    reader: &mut Reader<File>,
    path: &Path,
    mut parse: impl FnMut(&StringRecord, u64) -> Result<T>,
) -> Vec<T> {
    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for (i, record) in reader.records().enumerate() {
        let parsed = record.map_err(Error::from).and_then(|record| {
            let line = record.position().map_or(i as u64 + 2, |p| p.line());
            parse(&record, line)
        });
        match parsed {
            Ok(row) => rows.push(row),
            Err(e) => {
                skipped += 1;
                warn!("Skipping row in {}: {}", path.display(), e);
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {} malformed rows in {}", skipped, path.display());
    }
    rows
}

fn parse_number<T: std::str::FromStr>(raw: &str, column: &str, line: u64) -> Result<T> {
    raw.trim().parse::<T>().map_err(|_| {
        Error::dataset(format!("line {}: column '{}' is not a number: '{}'", line, column, raw))
    })
}

/// Read every row of a spam dataset
pub fn read_spam_dataset(path: impl AsRef<Path>, columns: &SpamColumns) -> Result<Vec<SpamRow>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers = reader.headers()?.clone();
    let text_idx = column_index(&headers, &columns.text, path)?;
    let label_idx = column_index(&headers, &columns.label, path)?;

    let rows = parse_rows(&mut reader, path, |record, line| {
        Ok(SpamRow {
            text: field(record, text_idx, line)?.to_string(),
            label: field(record, label_idx, line)?.to_string(),
        })
    });

    debug!("Read {} spam rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Read the label column of a churn dataset as booleans
pub fn read_churn_labels(path: impl AsRef<Path>, label_column: &str) -> Result<Vec<bool>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers = reader.headers()?.clone();
    let label_idx = column_index(&headers, label_column, path)?;

    let labels = parse_rows(&mut reader, path, |record, line| {
        let value: f64 = parse_number(field(record, label_idx, line)?, label_column, line)?;
        Ok(value >= 0.5)
    });

    Ok(labels)
}

/// Read every row of a churn dataset with all model features
pub fn read_churn_dataset(path: impl AsRef<Path>, label_column: &str) -> Result<Vec<ChurnRow>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers = reader.headers()?.clone();
    let age = column_index(&headers, "Age", path)?;
    let gender = column_index(&headers, "Gender", path)?;
    let location = column_index(&headers, "Location", path)?;
    let months = column_index(&headers, "Subscription_Length_Months", path)?;
    let bill = column_index(&headers, "Monthly_Bill", path)?;
    let usage = column_index(&headers, "Total_Usage_GB", path)?;
    let label = column_index(&headers, label_column, path)?;

    let rows = parse_rows(&mut reader, path, |record, line| {
        let customer = CustomerRecord {
            age: parse_number(field(record, age, line)?, "Age", line)?,
            gender: field(record, gender, line)?.trim().to_string(),
            location: field(record, location, line)?.trim().to_string(),
            subscription_length_months: parse_number(
                field(record, months, line)?,
                "Subscription_Length_Months",
                line,
            )?,
            monthly_bill: parse_number(field(record, bill, line)?, "Monthly_Bill", line)?,
            total_usage_gb: parse_number(field(record, usage, line)?, "Total_Usage_GB", line)?,
        };
        let churn: f64 = parse_number(field(record, label, line)?, label_column, line)?;

        Ok(ChurnRow {
            record: customer,
            churned: churn >= 0.5,
        })
    });

    debug!("Read {} churn rows from {}", rows.len(), path.display());
    Ok(rows)
}
