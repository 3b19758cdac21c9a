//! Response status registry and validation.
//!
//! The registry maps every standard status code to its reason phrase and a short description
//! suitable for error pages. It is built once on first use and never mutated afterwards.
//!
//! # References
//! * [RFC 9110 Section 15](https://www.rfc-editor.org/rfc/rfc9110.html#name-status-codes)

use std::collections::HashMap;
use std::fmt;

use http::StatusCode;
use once_cell::sync::Lazy;

use crate::ensure;
use crate::error::StatusError;

/// Reason phrase and description for one status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusEntry {
    pub code: u16,
    pub reason: &'static str,
    pub description: &'static str,
}

const fn entry(code: u16, reason: &'static str, description: &'static str) -> StatusEntry {
    StatusEntry { code, reason, description }
}

#[rustfmt::skip]
const STATUS_ENTRIES: &[StatusEntry] = &[
    entry(100, "Continue", "Request received, please continue"),
    entry(101, "Switching Protocols", "Switching to new protocol; obey Upgrade header"),
    entry(102, "Processing", ""),
    entry(103, "Early Hints", ""),

    entry(200, "OK", "Request fulfilled, document follows"),
    entry(201, "Created", "Document created, URL follows"),
    entry(202, "Accepted", "Request accepted, processing continues off-line"),
    entry(203, "Non-Authoritative Information", "Request fulfilled from cache"),
    entry(204, "No Content", "Request fulfilled, nothing follows"),
    entry(205, "Reset Content", "Clear input form for further input"),
    entry(206, "Partial Content", "Partial content follows"),
    entry(207, "Multi-Status", ""),
    entry(208, "Already Reported", ""),
    entry(226, "IM Used", ""),

    entry(300, "Multiple Choices", "Object has several resources -- see URI list"),
    entry(301, "Moved Permanently", "Object moved permanently -- see URI list"),
    entry(302, "Found", "Object moved temporarily -- see URI list"),
    entry(303, "See Other", "Object moved -- see Method and URL list"),
    entry(304, "Not Modified", "Document has not changed since given time"),
    entry(305, "Use Proxy", "You must use proxy specified in Location to access this resource"),
    entry(307, "Temporary Redirect", "Object moved temporarily -- see URI list"),
    entry(308, "Permanent Redirect", "Object moved permanently -- see URI list"),

    entry(400, "Bad Request", "Bad request syntax or unsupported method"),
    entry(401, "Unauthorized", "No permission -- see authorization schemes"),
    entry(402, "Payment Required", "No payment -- see charging schemes"),
    entry(403, "Forbidden", "Request forbidden -- authorization will not help"),
    entry(404, "Not Found", "Nothing matches the given URI"),
    entry(405, "Method Not Allowed", "Specified method is invalid for this resource"),
    entry(406, "Not Acceptable", "URI not available in preferred format"),
    entry(407, "Proxy Authentication Required", "You must authenticate with this proxy before proceeding"),
    entry(408, "Request Timeout", "Request timed out; try again later"),
    entry(409, "Conflict", "Request conflict"),
    entry(410, "Gone", "URI no longer exists and has been permanently removed"),
    entry(411, "Length Required", "Client must specify Content-Length"),
    entry(412, "Precondition Failed", "Precondition in headers is false"),
    entry(413, "Request Entity Too Large", "Entity is too large"),
    entry(414, "Request-URI Too Long", "URI is too long"),
    entry(415, "Unsupported Media Type", "Entity body in unsupported format"),
    entry(416, "Requested Range Not Satisfiable", "Cannot satisfy request range"),
    entry(417, "Expectation Failed", "Expect condition could not be satisfied"),
    entry(418, "I'm a Teapot", "Server refuses to brew coffee because it is a teapot."),
    entry(421, "Misdirected Request", "Server is not able to produce a response"),
    entry(422, "Unprocessable Entity", ""),
    entry(423, "Locked", ""),
    entry(424, "Failed Dependency", ""),
    entry(425, "Too Early", ""),
    entry(426, "Upgrade Required", ""),
    entry(428, "Precondition Required", "The origin server requires the request to be conditional"),
    entry(429, "Too Many Requests", "The user has sent too many requests in a given amount of time (\"rate limiting\")"),
    entry(431, "Request Header Fields Too Large", "The server is unwilling to process the request because its header fields are too large"),
    entry(451, "Unavailable For Legal Reasons", "The server is denying access to the resource as a consequence of a legal demand"),

    // 500 and 503 use the longer descriptions shown on error pages.
    entry(500, "Internal Server Error", "The server encountered an unexpected condition which prevented it from fulfilling the request."),
    entry(501, "Not Implemented", "Server does not support this operation"),
    entry(502, "Bad Gateway", "Invalid responses from another server/proxy"),
    entry(503, "Service Unavailable", "The server is currently unable to handle the request due to a temporary overloading or maintenance of the server."),
    entry(504, "Gateway Timeout", "The gateway server did not receive a timely response"),
    entry(505, "HTTP Version Not Supported", "Cannot fulfill request"),
    entry(506, "Variant Also Negotiates", ""),
    entry(507, "Insufficient Storage", ""),
    entry(508, "Loop Detected", ""),
    entry(510, "Not Extended", ""),
    entry(511, "Network Authentication Required", "The client needs to authenticate to gain network access"),
];

static STATUS_REGISTRY: Lazy<HashMap<u16, &'static StatusEntry>> =
    Lazy::new(|| STATUS_ENTRIES.iter().map(|entry| (entry.code, entry)).collect());

/// Looks up the registry entry for `code`.
pub fn status_entry(code: u16) -> Option<&'static StatusEntry> {
    STATUS_REGISTRY.get(&code).copied()
}

/// Anything [`valid_status`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusInput<'a> {
    /// No status given; means `200`.
    Unset,
    Code(i64),
    /// `"404"` or `"404 Not Found"`.
    Line(&'a str),
}

impl From<i32> for StatusInput<'_> {
    fn from(code: i32) -> Self {
        StatusInput::Code(i64::from(code))
    }
}

impl From<i64> for StatusInput<'_> {
    fn from(code: i64) -> Self {
        StatusInput::Code(code)
    }
}

impl From<u16> for StatusInput<'_> {
    fn from(code: u16) -> Self {
        StatusInput::Code(i64::from(code))
    }
}

impl From<StatusCode> for StatusInput<'_> {
    fn from(code: StatusCode) -> Self {
        StatusInput::Code(i64::from(code.as_u16()))
    }
}

impl<'a> From<&'a str> for StatusInput<'a> {
    fn from(line: &'a str) -> Self {
        StatusInput::Line(line)
    }
}

impl<'a, T: Into<StatusInput<'a>>> From<Option<T>> for StatusInput<'a> {
    fn from(status: Option<T>) -> Self {
        status.map_or(StatusInput::Unset, Into::into)
    }
}

/// A validated response status: code, reason phrase and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidStatus {
    pub code: u16,
    pub reason: String,
    pub description: &'static str,
}

impl ValidStatus {
    /// The status line fragment, e.g. `404 Not Found`.
    pub fn status_line(&self) -> String {
        self.to_string()
    }

    pub fn status_code(&self) -> StatusCode {
        // the code has been range checked against 100..=599, which `StatusCode` accepts
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn into_parts(self) -> (u16, String, &'static str) {
        (self.code, self.reason, self.description)
    }
}

impl fmt::Display for ValidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.reason)
    }
}

/// Returns a legal status code, reason phrase and description.
///
/// The input may be a code, a `"code"` or `"code reason"` string, or nothing, which means `200`.
/// When no reason is supplied the registry's reason phrase is used; codes the registry doesn't
/// know get an empty reason and description.
///
/// # Errors
///
/// Returns [`StatusError::NonNumeric`] when the code part is not an integer and
/// [`StatusError::OutOfRange`] when it is outside `100..=599`.
pub fn valid_status<'a, S: Into<StatusInput<'a>>>(status: S) -> Result<ValidStatus, StatusError> {
    let (code, reason) = match status.into() {
        StatusInput::Unset | StatusInput::Code(0) => (200, None),
        StatusInput::Line("") => (200, None),
        StatusInput::Code(code) => (code, None),
        StatusInput::Line(line) => {
            let (code, reason) = line.split_once(' ').unwrap_or((line, ""));
            let code = code.parse::<i64>().map_err(|_| StatusError::non_numeric(code))?;
            let reason = reason.trim();
            (code, (!reason.is_empty()).then_some(reason))
        }
    };

    ensure!((100..=599).contains(&code), StatusError::out_of_range(code));
    let code = u16::try_from(code).map_err(|_| StatusError::out_of_range(code))?;

    let (default_reason, description) = status_entry(code).map_or(("", ""), |entry| (entry.reason, entry.description));

    Ok(ValidStatus { code, reason: reason.unwrap_or(default_reason).to_string(), description })
}
