//! Preparing header names and values for the wire.
//!
//! Text is encoded with the first configured charset that can represent it. When none can, an
//! HTTP/1.1 policy with RFC 2047 enabled falls back to a single base64 UTF-8 encoded word.
//! Finally the control bytes `0x00..=0x1F` and `0x7F` are deleted from the encoded output.

use bytes::Bytes;
use http::Version;
use tracing::trace;

use crate::charset::Charset;
use crate::error::EncodeError;
use crate::header_map::FieldValue;
use crate::rfc2047;

/// How header text is turned into bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingPolicy {
    /// Protocol version of the message; RFC 2047 words are only produced for HTTP/1.1.
    pub version: Version,
    /// Charsets to try, in order of preference.
    pub charsets: Vec<Charset>,
    /// Whether text no charset can represent may be sent as an RFC 2047 encoded word.
    pub use_rfc_2047: bool,
}

impl Default for EncodingPolicy {
    fn default() -> Self {
        Self { version: Version::HTTP_11, charsets: vec![Charset::Latin1], use_rfc_2047: true }
    }
}

impl EncodingPolicy {
    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn charsets<I: IntoIterator<Item = Charset>>(mut self, charsets: I) -> Self {
        self.charsets = charsets.into_iter().collect();
        self
    }

    pub fn use_rfc_2047(mut self, use_rfc_2047: bool) -> Self {
        self.use_rfc_2047 = use_rfc_2047;
        self
    }
}

/// Encodes a header name or value for HTTP output.
///
/// # Errors
///
/// Returns [`EncodeError::Unencodable`] when no configured charset can represent `text` and the
/// RFC 2047 fallback is disabled or the protocol isn't HTTP/1.1.
pub fn encode_text(text: &str, policy: &EncodingPolicy) -> Result<Bytes, EncodeError> {
    if let Some(encoded) = policy.charsets.iter().find_map(|charset| charset.encode(text)) {
        return Ok(Bytes::from(encoded));
    }

    if policy.version == Version::HTTP_11 && policy.use_rfc_2047 {
        trace!(value = text, "encoding header text as rfc 2047 word");
        return Ok(Bytes::from(rfc2047::encode_word(text)));
    }

    Err(EncodeError::unencodable(text, policy.charsets.iter().map(|charset| charset.name()).collect()))
}

/// Encodes one header name or value and deletes the control bytes from the result.
///
/// # Errors
///
/// Fails like [`encode_text`] for text; bytes are never rejected.
pub fn encode_header_item(item: &FieldValue, policy: &EncodingPolicy) -> Result<Bytes, EncodeError> {
    let encoded = match item {
        FieldValue::Text(text) => encode_text(text, policy)?,
        FieldValue::Bytes(bytes) => bytes.clone(),
    };
    Ok(delete_control_bytes(encoded))
}

fn is_control_byte(byte: u8) -> bool {
    byte < 0x20 || byte == 0x7F
}

fn delete_control_bytes(encoded: Bytes) -> Bytes {
    if !encoded.iter().copied().any(is_control_byte) {
        return encoded;
    }
    encoded.iter().copied().filter(|byte| !is_control_byte(*byte)).collect::<Vec<_>>().into()
}
