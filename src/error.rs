//! Error types for the CRM outreach pipeline.
//!
//! This module defines custom error types using `thiserror` for precise error handling.

use std::fmt;
use thiserror::Error;

/// Errors that can occur when talking to the CRM or the messaging provider.
///
/// Non-success HTTP statuses on GraphQL calls are returned as
/// [`crate::client::ApiResponse`] values, not as errors; this enum covers the
/// failures where no usable response exists.
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Network timeout
    #[error("Request timeout")]
    Timeout,

    /// API returned a status that the caller cannot work with
    #[error("API error (status {status}): {body}")]
    Status { status: u16, body: String },

    /// Required credential or setting is missing
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is missing
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    /// Environment variable has invalid value
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

/// Errors that abort a CRM export.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Page size must be greater than zero")]
    InvalidPageSize,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A source row that is missing a required field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRow {
    /// 1-based position in the source file (header excluded)
    pub line: usize,
    pub hs_object_id: String,
    pub firstname: String,
    pub phone: String,
}

impl fmt::Display for InvalidRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {} (id={:?}, firstname={:?}, phone={:?})",
            self.line, self.hs_object_id, self.firstname, self.phone
        )
    }
}

/// Errors that abort an outreach run while loading or checking the source file.
#[derive(Error, Debug)]
pub enum OutreachError {
    /// One or more rows lack `phone` or `firstname`; nothing was sent.
    #[error("Required fields missing (phone, firstname) in {} row(s): {}", .0.len(), format_rows(.0))]
    Validation(Vec<InvalidRow>),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

fn format_rows(rows: &[InvalidRow]) -> String {
    rows.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience type alias for Results with ApiError
pub type ApiResult<T> = Result<T, ApiError>;

/// Convenience type alias for Results with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Convenience type alias for Results with ExportError
pub type ExportResult<T> = Result<T, ExportError>;

/// Convenience type alias for Results with OutreachError
pub type OutreachResult<T> = Result<T, OutreachError>;
