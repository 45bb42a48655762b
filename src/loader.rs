//! Loading audit exports from disk.
//!
//! Reading, decoding and shaping the page records is a single fallible
//! step: callers get either a complete [`Dataset`] or an [`AuditError`].

use crate::analysis::count_pages_scanned;
use crate::error::{AuditError, MalformedRecord, Result};
use crate::models::PageRecord;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Decoded page records of one audit export.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Pages in export order.
    pub pages: Vec<PageRecord>,
    /// Page count of the raw decoded value.
    pub pages_scanned: usize,
}

impl Dataset {
    /// Shape a decoded JSON value into page records.
    pub fn from_value(value: Value) -> std::result::Result<Self, MalformedRecord> {
        let pages_scanned = count_pages_scanned(&value);

        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(MalformedRecord::NotASequence {
                    found: json_kind(&other),
                })
            }
        };

        let pages = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                if !item.is_object() {
                    return Err(MalformedRecord::InvalidPage {
                        index,
                        reason: format!("expected an object, found {}", json_kind(&item)),
                    });
                }
                serde_json::from_value::<PageRecord>(item).map_err(|e| {
                    MalformedRecord::InvalidPage {
                        index,
                        reason: e.to_string(),
                    }
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            pages,
            pages_scanned,
        })
    }

    /// Decode JSON text read from `path`.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let value: Value = serde_json::from_str(content).map_err(|source| AuditError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::from_value(value)?)
    }
}

/// Read and decode the audit export at `path`.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    debug!("Reading audit export: {}", path.display());

    let content = fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => AuditError::NotFound {
            path: path.to_path_buf(),
        },
        _ => AuditError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    debug!("Read {} bytes", content.len());

    let dataset = Dataset::parse(&content, path)?;
    debug!("Decoded {} page records", dataset.pages.len());

    Ok(dataset)
}

/// Name of a JSON value's kind, for diagnostics.
fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
