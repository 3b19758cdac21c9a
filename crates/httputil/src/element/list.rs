//! Splitting a full header value into its sorted element list.
//!
//! # Definition for Recipients
//! ```text
//! #element => [ element ] *( OWS "," OWS [ element ] )
//! ```
//!
//! # References
//! * [RFC 9110 Section 5.6.1](https://www.rfc-editor.org/rfc/rfc9110.html#section-5.6.1)

use crate::element::{AcceptElement, HeaderElement, compare_by_value, compare_preference};
use crate::error::ParseError;

/// Splits a header value on the commas that are followed by an even number of `"` up to the end
/// of the value, so commas inside quoted strings stay put. Segments are returned untrimmed.
///
/// An empty value yields no segments.
pub fn split_header_value(value: &str) -> Vec<&str> {
    if value.is_empty() {
        return Vec::new();
    }

    let total_quotes = value.bytes().filter(|byte| *byte == b'"').count();
    let mut quotes_seen = 0;
    let mut segments = Vec::new();
    let mut start = 0;
    for (index, byte) in value.bytes().enumerate() {
        match byte {
            b'"' => quotes_seen += 1,
            b',' if (total_quotes - quotes_seen) % 2 == 0 => {
                segments.push(&value[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    segments.push(&value[start..]);
    segments
}

/// Returns `true` for the headers whose elements carry a quality value.
///
/// The comparison is case-sensitive, so callers must pass the canonical field name.
pub fn is_quality_header(name: &str) -> bool {
    name.starts_with("Accept") || name == "TE"
}

/// Parses every element of an `Accept*`-style value, most preferred first.
///
/// # Errors
///
/// Fails when any element carries an unparseable quality.
pub fn accept_elements(value: &str) -> Result<Vec<AcceptElement>, ParseError> {
    let mut keyed = split_header_value(value)
        .into_iter()
        .map(|segment| {
            let element = AcceptElement::parse(segment.trim());
            element.preference().map(|preference| (preference, element))
        })
        .collect::<Result<Vec<_>, _>>()?;

    keyed.sort_by(|(a, _), (b, _)| compare_preference(a, b));
    Ok(keyed.into_iter().rev().map(|(_, element)| element).collect())
}

/// Parses every element of a plain header value.
///
/// The result is sorted by value and reversed to mirror the quality ordering of
/// [`accept_elements`]; for plain headers the order carries no meaning.
pub fn plain_elements(value: &str) -> Vec<HeaderElement> {
    let mut elements: Vec<_> = split_header_value(value).into_iter().map(|segment| HeaderElement::from(segment.trim())).collect();
    elements.sort_by(compare_by_value);
    elements.reverse();
    elements
}

/// Returns the sorted element list of a comma-separated header value.
///
/// Elements of [quality headers](is_quality_header) are parsed as [`AcceptElement`]s and ordered
/// most preferred first; everything else is parsed as plain [`HeaderElement`]s.
///
/// # Errors
///
/// Fails with [`ParseError::MalformedHeader`] when an element of a quality header carries an
/// unparseable quality.
pub fn header_elements(name: &str, value: &str) -> Result<Vec<HeaderElement>, ParseError> {
    if is_quality_header(name) {
        Ok(accept_elements(value)?.into_iter().map(AcceptElement::into_inner).collect())
    } else {
        Ok(plain_elements(value))
    }
}
