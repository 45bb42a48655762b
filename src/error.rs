//! Error types for loading and aggregating audit data.

use std::path::PathBuf;
use thiserror::Error;

/// A record that does not have the shape the aggregation expects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedRecord {
    #[error("expected a JSON array of pages, found {found}")]
    NotASequence { found: &'static str },

    #[error("page {index}: {reason}")]
    InvalidPage { index: usize, reason: String },

    #[error("page {page}: missing `{field}` field")]
    MissingPageField { page: usize, field: &'static str },

    #[error("page {page}, issue {issue}: missing `{field}` field")]
    MissingIssueField {
        page: usize,
        issue: usize,
        field: &'static str,
    },
}

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("{} not found. Check the path.", .path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON decode error: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed record: {0}")]
    Malformed(#[from] MalformedRecord),

    #[error("Failed to render report: {0}")]
    Render(#[from] serde_json::Error),

    #[error("Failed to write report to {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AuditError {
    /// Process exit code for this error.
    ///
    /// 1 = file or IO problem, 2 = JSON decode error, 3 = malformed record.
    pub fn exit_code(&self) -> i32 {
        match self {
            AuditError::NotFound { .. }
            | AuditError::Io { .. }
            | AuditError::Render(_)
            | AuditError::Output { .. } => 1,
            AuditError::Decode { .. } => 2,
            AuditError::Malformed(_) => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let not_found = AuditError::NotFound {
            path: PathBuf::from("sample.json"),
        };
        assert_eq!(not_found.exit_code(), 1);

        let decode = AuditError::Decode {
            path: PathBuf::from("sample.json"),
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        };
        assert_eq!(decode.exit_code(), 2);

        let malformed = AuditError::from(MalformedRecord::MissingPageField {
            page: 0,
            field: "issues",
        });
        assert_eq!(malformed.exit_code(), 3);

        let render = AuditError::from(serde_json::Error::io(std::io::Error::other("closed")));
        assert_eq!(render.exit_code(), 1);
        assert!(render.to_string().starts_with("Failed to render report: "));
    }

    #[test]
    fn test_messages() {
        let not_found = AuditError::NotFound {
            path: PathBuf::from("sample.json"),
        };
        assert_eq!(not_found.to_string(), "sample.json not found. Check the path.");

        let decode = AuditError::Decode {
            path: PathBuf::from("sample.json"),
            source: serde_json::from_str::<serde_json::Value>("[1,").unwrap_err(),
        };
        assert!(decode.to_string().starts_with("JSON decode error: "));

        let missing = MalformedRecord::MissingIssueField {
            page: 1,
            issue: 2,
            field: "severity",
        };
        assert_eq!(
            missing.to_string(),
            "page 1, issue 2: missing `severity` field"
        );
    }
}
