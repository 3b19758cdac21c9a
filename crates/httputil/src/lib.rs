//! HTTP header utilities for micro-http
//!
//! This crate parses and produces the header-level pieces of an HTTP/1.x message that sit above
//! the wire codec: structured header elements, byte ranges, query strings, status lines, RFC 2047
//! encoded words and an ordered, case-insensitive header store.
//!
//! # Features
//!
//! - `Accept*`/`TE` element lists sorted by quality value
//! - `Range` and `If-Range` evaluation
//! - Query string decoding, including server-side image maps
//! - Status code validation against a registry of reason phrases
//! - A header map that encodes its fields for output, falling back to RFC 2047 words
//!
//!
//! # Example
//!
//! ```
//! use micro_httputil::{HeaderMap, get_ranges, valid_status};
//! use tracing::{Level, info};
//! use tracing_subscriber::FmtSubscriber;
//!
//! let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
//! tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
//!
//! let mut request_headers = HeaderMap::new();
//! request_headers.insert("accept", "text/html;q=0.8, application/json");
//! request_headers.insert("range", "bytes=0-99");
//!
//! let preferred = request_headers.values("Accept").unwrap();
//! assert_eq!(preferred, ["application/json", "text/html"]);
//!
//! let ranges = get_ranges(request_headers.get_str("Range"), 1000).unwrap();
//! info!(?ranges, "serving partial content");
//!
//! let status = valid_status(206).unwrap();
//! let mut response_headers = HeaderMap::new();
//! response_headers.insert("content-range", ranges[0].content_range(1000));
//! response_headers.insert("content-length", ranges[0].len());
//!
//! assert_eq!(status.status_line(), "206 Partial Content");
//! assert_eq!(response_headers.output().unwrap().len(), 2);
//! ```
//!
//!
//! # Architecture
//!
//! - [`element`]: header elements and element lists
//! - [`range`]: `Range` and `If-Range` request headers
//! - [`query`]: query string parsing
//! - [`status`]: the status registry and [`valid_status`]
//! - [`rfc2047`] and [`charset`]: encoded words and the supported charsets
//! - [`header_map`]: the [`HeaderMap`] store and its output encoding
//! - [`host`] and [`url`]: small value types and helpers
//!
//! # Error Handling
//!
//! Parsing is permissive: malformed elements, ranges and dates are interpreted on a best-effort
//! basis or ignored. The few rejecting paths report:
//!
//! - [`ParseError`]: malformed client input, answered with `400 Bad Request`
//! - [`StatusError`]: an invalid status produced by the server itself
//! - [`EncodeError`]: header output that can't be encoded
//! - [`Error`]: the union of the above
//!
//! # Concurrency
//!
//! Everything is synchronous and free of shared mutable state. The status registry is built once
//! and is read-only afterwards; a [`HeaderMap`] is owned by a single request or response.

pub mod charset;
pub mod element;
pub mod error;
pub mod header_map;
pub mod host;
pub mod query;
pub mod range;
pub mod rfc2047;
pub mod status;
pub mod url;

mod utils;
pub(crate) use utils::ensure;

pub use charset::Charset;
pub use element::{AcceptElement, HeaderElement, header_elements};
pub use error::{EncodeError, Error, ParseError, StatusError};
pub use header_map::{EncodingPolicy, FieldValue, HeaderMap, encode_text};
pub use host::Host;
pub use query::{QueryOptions, QueryParams, QueryValue, parse_query_string, parse_query_string_with};
pub use range::{ByteRange, get_ranges, matches_if_range_check};
pub use rfc2047::{decode_text, decode_text_maybe, encode_word};
pub use status::{ValidStatus, status_entry, valid_status};
pub use url::{http_date, protocol_from_http, urljoin, urljoin_bytes};
