//! `Range` and `If-Range` request headers.
//!
//! # References
//! * [RFC 7233 Section 3.1](https://www.rfc-editor.org/rfc/rfc7233.html#section-3.1)
//! * [RFC 7233 Section 3.2](https://www.rfc-editor.org/rfc/rfc7233.html#section-3.2)

use std::fmt;
use std::ops::Range;
use std::time::SystemTime;

use tracing::{debug, trace};
use unicase::UniCase;

/// A satisfiable byte range, half-open: `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "byte range start {start} is past its end {end}");
        Self { start, end }
    }

    /// Number of bytes in the range; a range whose `end` lies before `start` is empty.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn as_range(&self) -> Range<u64> {
        self.start..self.end
    }

    /// The `Content-Range` value announcing this range of a `complete_length` byte resource,
    /// e.g. `bytes 3-6/10`.
    pub fn content_range(&self, complete_length: u64) -> String {
        format!("bytes {}-{}/{complete_length}", self.start, self.end.saturating_sub(1))
    }
}

impl From<ByteRange> for Range<u64> {
    fn from(range: ByteRange) -> Self {
        range.as_range()
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end.saturating_sub(1))
    }
}

/// The `Content-Range` value of a `416 Range Not Satisfiable` response, e.g. `bytes */1234`.
pub fn unsatisfied_content_range(complete_length: u64) -> String {
    format!("bytes */{complete_length}")
}

/// Returns the byte ranges a `Range` header asks for, or `None`.
///
/// `None` means the header must be ignored and the full content served: it is absent, uses a
/// unit other than `bytes`, or is syntactically invalid. A single backwards spec such as
/// `bytes=9-3` invalidates the whole header.
///
/// Otherwise every satisfiable spec becomes a half-open [`ByteRange`]; `bytes=3-6` yields `3..7`.
/// Specs starting at or beyond `content_length` are dropped, so an empty list means none was
/// satisfiable and the caller should respond with `416`.
pub fn get_ranges(header: Option<&str>, content_length: u64) -> Option<Vec<ByteRange>> {
    let header = header.filter(|header| !header.is_empty())?;

    let Some((unit, specs)) = header.split_once('=') else {
        debug!(header, "range header without unit, ignoring");
        return None;
    };
    if UniCase::ascii(unit.trim()) != UniCase::ascii("bytes") {
        debug!(header, "unsupported range unit, ignoring");
        return None;
    }

    let mut ranges = Vec::new();
    for spec in specs.split(',') {
        let Some((start, stop)) = spec.split_once('-') else {
            debug!(header, spec, "range spec without '-', ignoring header");
            return None;
        };
        let (start, stop) = (start.trim(), stop.trim());

        if !start.is_empty() {
            let start = parse_position(header, start)?;
            if start >= content_length {
                // unsatisfiable specs are skipped, not fatal
                trace!(start, content_length, "range starts beyond content, skipping");
                continue;
            }
            let stop = if stop.is_empty() { content_length - 1 } else { parse_position(header, stop)? };
            if stop < start {
                debug!(header, start, stop, "backwards range, ignoring header");
                return None;
            }
            ranges.push(ByteRange::new(start, stop.min(content_length - 1) + 1));
        } else {
            if stop.is_empty() {
                debug!(header, "range spec without positions, ignoring header");
                return None;
            }
            // suffix range: the last `suffix` bytes, or the whole entity when it is shorter
            let suffix = parse_position(header, stop)?;
            if suffix == 0 || content_length == 0 {
                trace!(suffix, content_length, "empty suffix range, skipping");
                continue;
            }
            ranges.push(ByteRange::new(content_length.saturating_sub(suffix), content_length));
        }
    }

    Some(ranges)
}

fn parse_position(header: &str, position: &str) -> Option<u64> {
    match position.parse() {
        Ok(position) => Some(position),
        Err(e) => {
            debug!(header, position, cause = %e, "invalid range position, ignoring header");
            None
        }
    }
}

/// Returns `true` when the `Range` header should be honoured given the `If-Range` header.
///
/// An absent `If-Range` always passes. A date passes when it lies strictly in the past. Entity
/// tags are not compared: any value that isn't an HTTP date fails the check, so the full content
/// is served.
pub fn matches_if_range_check(header: Option<&str>) -> bool {
    matches_if_range_check_at(header, SystemTime::now())
}

/// [`matches_if_range_check`] evaluated against the given clock reading.
pub fn matches_if_range_check_at(header: Option<&str>, now: SystemTime) -> bool {
    let Some(header) = header.filter(|header| !header.is_empty()) else {
        return true;
    };

    match httpdate::parse_http_date(header.trim()) {
        Ok(date) => date < now,
        Err(_) => {
            trace!(header, "if-range is not a date, entity tags are unsupported");
            false
        }
    }
}
