//! The character sets header and query text is converted with.

use std::fmt;

use unicase::UniCase;

/// A character set supported for header values, RFC 2047 words and query strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Charset {
    Utf8,
    /// ISO-8859-1, the historical default charset of HTTP/1.1 field values.
    Latin1,
    Ascii,
}

const LATIN1_LABELS: &[&str] = &["iso-8859-1", "iso8859-1", "iso_8859-1", "latin-1", "latin1", "l1"];

impl Charset {
    /// Resolves a charset label, ignoring ASCII case.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = UniCase::ascii(label.trim());
        if label == UniCase::ascii("utf-8") || label == UniCase::ascii("utf8") {
            Some(Charset::Utf8)
        } else if LATIN1_LABELS.iter().any(|known| label == UniCase::ascii(*known)) {
            Some(Charset::Latin1)
        } else if label == UniCase::ascii("us-ascii") || label == UniCase::ascii("ascii") {
            Some(Charset::Ascii)
        } else {
            None
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Latin1 => "ISO-8859-1",
            Charset::Ascii => "US-ASCII",
        }
    }

    /// Encodes `text`, or returns `None` when a character has no representation.
    pub fn encode(self, text: &str) -> Option<Vec<u8>> {
        match self {
            Charset::Utf8 => Some(text.as_bytes().to_vec()),
            Charset::Latin1 => text.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect(),
            Charset::Ascii => text.is_ascii().then(|| text.as_bytes().to_vec()),
        }
    }

    /// Decodes `bytes`, or returns `None` when they are not valid in this charset.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Charset::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
            Charset::Latin1 => Some(bytes.iter().map(|byte| char::from(*byte)).collect()),
            Charset::Ascii => bytes.is_ascii().then(|| bytes.iter().map(|byte| char::from(*byte)).collect()),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
