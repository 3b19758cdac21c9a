//! Elements of `Accept*` and `TE` headers, which carry a quality value.
//!
//! # Definition
//! ```text
//! weight = OWS ";" OWS "q=" qvalue
//! qvalue = ( "0" [ "." 0*3DIGIT ] )
//!        / ( "1" [ "." 0*3("0") ] )
//! ```
//!
//! # References
//! * [RFC 9110 Section 12.4.2](https://www.rfc-editor.org/rfc/rfc9110.html#name-quality-values)

use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;

use tracing::debug;

use crate::element::{HeaderElement, ParamValue};
use crate::error::ParseError;

/// An element from an `Accept*` header's element list.
///
/// The quality is kept under the `q` parameter as a nested [`HeaderElement`], so any
/// accept-extensions following it (`;q=0.5;ext=1`) are preserved as that element's parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptElement(HeaderElement);

impl AcceptElement {
    /// Parses an element such as `text/html;level=1;q=0.7`.
    ///
    /// The first `;q=` separates the media-range parameters from the accept-params. Like
    /// [`HeaderElement::parse`] this never fails; an unusable quality is only reported by
    /// [`qvalue`](Self::qvalue).
    pub fn parse(element: &str) -> Self {
        let (media_range, quality) = match find_quality_separator(element) {
            Some((start, end)) => (&element[..start], Some(&element[end..])),
            None => (element, None),
        };

        let (value, mut params) = HeaderElement::parse(media_range.trim());
        if let Some(quality) = quality {
            // Other headers can't carry extensions, but it's easier to parse them as if they did.
            params.insert("q".to_string(), ParamValue::Element(HeaderElement::from(quality.trim())));
        }

        Self(HeaderElement::new(value, params))
    }

    /// The quality, or priority, of this element; `1.0` when no `q` parameter is present.
    ///
    /// # Errors
    ///
    /// An unparseable quality is a malformed request, reported as
    /// [`ParseError::MalformedHeader`] carrying this element's text.
    pub fn qvalue(&self) -> Result<f64, ParseError> {
        let quality = self.0.param("q").map_or("1", ParamValue::as_str);
        quality.trim().parse::<f64>().map_err(|e| {
            debug!(element = %self, cause = %e, "malformed quality value");
            ParseError::malformed_header(self)
        })
    }

    /// The element's value parsed as a media range, when it is one.
    pub fn mime(&self) -> Option<mime::Mime> {
        self.0.value().parse().ok()
    }

    /// The sort key used for quality ordering, see [`compare_preference`].
    ///
    /// # Errors
    ///
    /// Fails like [`qvalue`](Self::qvalue).
    pub fn preference(&self) -> Result<Preference, ParseError> {
        Ok(Preference { quality: self.qvalue()?, rendered: self.to_string() })
    }

    pub fn into_inner(self) -> HeaderElement {
        self.0
    }
}

impl Deref for AcceptElement {
    type Target = HeaderElement;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<HeaderElement> for AcceptElement {
    fn from(element: HeaderElement) -> Self {
        Self(element)
    }
}

impl From<&str> for AcceptElement {
    fn from(element: &str) -> Self {
        Self::parse(element)
    }
}

impl fmt::Display for AcceptElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Precomputed ordering key of an [`AcceptElement`].
#[derive(Debug, Clone, PartialEq)]
pub struct Preference {
    pub quality: f64,
    pub rendered: String,
}

/// Orders by ascending quality, then by ascending rendered text.
///
/// Sorting with this comparator and reversing yields the most preferred element first. On equal
/// quality this puts the lexicographically greatest rendering first; that tie-break carries no
/// meaning and is kept only so existing clients see the same order.
pub fn compare_preference(a: &Preference, b: &Preference) -> Ordering {
    a.quality.total_cmp(&b.quality).then_with(|| a.rendered.cmp(&b.rendered))
}

/// Finds the first `; *q *=` and returns its byte span.
fn find_quality_separator(element: &str) -> Option<(usize, usize)> {
    let bytes = element.as_bytes();
    bytes.iter().enumerate().filter(|(_, byte)| **byte == b';').find_map(|(start, _)| {
        let mut index = start + 1;
        while bytes.get(index) == Some(&b' ') {
            index += 1;
        }
        if bytes.get(index) != Some(&b'q') {
            return None;
        }
        index += 1;
        while bytes.get(index) == Some(&b' ') {
            index += 1;
        }
        (bytes.get(index) == Some(&b'=')).then_some((start, index + 1))
    })
}
