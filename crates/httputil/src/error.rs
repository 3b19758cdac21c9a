//! Error types for header, query string and status line processing.
//!
//! Parsing in this crate is permissive by default: malformed elements, ranges and dates degrade to
//! a best-effort interpretation. The errors below cover the few places where input must be
//! rejected instead.

use http::StatusCode;
use thiserror::Error;

/// Top-level error type covering every failure this crate can report.
#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("status error: {source}")]
    Status {
        #[from]
        source: StatusError,
    },

    #[error("encode error: {source}")]
    Encode {
        #[from]
        source: EncodeError,
    },
}

/// Errors caused by malformed client input.
///
/// All variants map to `400 Bad Request`, see [`ParseError::status_code`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed HTTP header: `{header}`")]
    MalformedHeader { header: String },

    #[error("bad query field: {field:?}")]
    BadQueryField { field: String },

    #[error("invalid percent escape in query field: {field:?}")]
    InvalidPercentEscape { field: String },

    #[error("query field {field:?} is not valid {charset}")]
    UndecodableQuery { field: String, charset: &'static str },
}

impl ParseError {
    pub fn malformed_header<S: ToString>(header: S) -> Self {
        Self::MalformedHeader { header: header.to_string() }
    }

    pub fn bad_query_field<S: ToString>(field: S) -> Self {
        Self::BadQueryField { field: field.to_string() }
    }

    pub fn invalid_percent_escape<S: ToString>(field: S) -> Self {
        Self::InvalidPercentEscape { field: field.to_string() }
    }

    pub fn undecodable_query<S: ToString>(field: S, charset: &'static str) -> Self {
        Self::UndecodableQuery { field: field.to_string(), charset }
    }

    /// The response status a server should answer with when this error escapes a handler.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

/// Errors caused by server code supplying an illegal response status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    #[error("Illegal response status from server ({input:?} is non-numeric).")]
    NonNumeric { input: String },

    #[error("Illegal response status from server ({code} is out of range).")]
    OutOfRange { code: i64 },
}

impl StatusError {
    pub fn non_numeric<S: ToString>(input: S) -> Self {
        Self::NonNumeric { input: input.to_string() }
    }

    pub fn out_of_range(code: i64) -> Self {
        Self::OutOfRange { code }
    }
}

/// Errors raised while preparing header fields for the wire.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Could not encode header part {value:?} using any of the encodings {charsets:?}.")]
    Unencodable { value: String, charsets: Vec<&'static str> },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },
}

impl EncodeError {
    pub fn unencodable<S: ToString>(value: S, charsets: Vec<&'static str>) -> Self {
        Self::Unencodable { value: value.to_string(), charsets }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }
}
