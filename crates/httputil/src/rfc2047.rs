//! RFC 2047 encoded words in header text.
//!
//! Field values outside ISO-8859-1 travel as encoded words:
//!
//! ```text
//! encoded-word = "=?" charset "?" encoding "?" encoded-text "?="
//! encoding     = "Q" / "B"
//! ```
//!
//! # References
//! * [RFC 2047](https://www.rfc-editor.org/rfc/rfc2047.html)

use std::borrow::Cow;

use base64ct::{Base64, Encoding};
use tracing::debug;

use crate::charset::Charset;

/// Decodes every encoded word in `value` and joins the result with the surrounding plain text.
///
/// Whitespace separating two adjacent encoded words is dropped. Words that can't be decoded, for
/// example because of an unknown charset, are kept as they are.
///
/// ```
/// use micro_httputil::decode_text;
///
/// assert_eq!(decode_text("=?utf-8?q?f=C3=BCr?="), "f\u{fc}r");
/// ```
pub fn decode_text(value: &str) -> String {
    let mut decoded = String::with_capacity(value.len());
    let mut rest = value;
    let mut after_word = false;

    while let Some(start) = rest.find("=?") {
        let (literal, candidate) = rest.split_at(start);
        let Some((word, consumed)) = decode_word(candidate) else {
            decoded.push_str(&rest[..start + 2]);
            rest = &rest[start + 2..];
            after_word = false;
            continue;
        };

        if !(after_word && literal.chars().all(char::is_whitespace)) {
            decoded.push_str(literal);
        }
        decoded.push_str(&word);
        rest = &candidate[consumed..];
        after_word = true;
    }

    decoded.push_str(rest);
    decoded
}

/// Like [`decode_text`], but skips the work when `value` holds no `=?`.
pub fn decode_text_maybe(value: &str) -> Cow<'_, str> {
    if value.contains("=?") { Cow::Owned(decode_text(value)) } else { Cow::Borrowed(value) }
}

/// Encodes `text` as a single base64 UTF-8 word.
///
/// The word is never folded, since HTTP has deprecated line folding.
pub fn encode_word(text: &str) -> String {
    format!("=?utf-8?b?{}?=", Base64::encode_string(text.as_bytes()))
}

/// Decodes the encoded word at the start of `candidate`, returning the text and the number of
/// bytes it spans.
fn decode_word(candidate: &str) -> Option<(String, usize)> {
    let inner = candidate.strip_prefix("=?")?;
    let (charset, inner) = inner.split_once('?')?;
    if charset.is_empty() || charset.contains(char::is_whitespace) {
        return None;
    }
    let (encoding, inner) = inner.split_at_checked(1)?;
    let data_start = inner.strip_prefix('?')?;
    let end = data_start.find("?=")?;
    let data = &data_start[..end];
    let consumed = candidate.len() - data_start.len() + end + 2;

    // RFC 2231 allows a language suffix: `=?utf-8*en?q?...?=`
    let label = charset.split('*').next().unwrap_or(charset);
    let Some(charset) = Charset::from_label(label) else {
        debug!(charset = label, "unsupported charset in encoded word");
        return None;
    };

    let bytes = match encoding {
        "q" | "Q" => decode_quoted_printable(data),
        "b" | "B" => decode_base64(data)?,
        _ => return None,
    };

    match charset.decode(&bytes) {
        Some(text) => Some((text, consumed)),
        None => {
            debug!(%charset, word = &candidate[..consumed], "encoded word is not valid in its charset");
            None
        }
    }
}

fn decode_quoted_printable(data: &str) -> Vec<u8> {
    let bytes = data.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'_' => decoded.push(b' '),
            b'=' => {
                let escaped = bytes.get(index + 1..index + 3).and_then(|hex| std::str::from_utf8(hex).ok()).and_then(|hex| u8::from_str_radix(hex, 16).ok());
                if let Some(byte) = escaped {
                    decoded.push(byte);
                    index += 2;
                } else {
                    decoded.push(b'=');
                }
            }
            byte => decoded.push(byte),
        }
        index += 1;
    }
    decoded
}

fn decode_base64(data: &str) -> Option<Vec<u8>> {
    let mut padded: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }
    match Base64::decode_vec(&padded) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            debug!(data, cause = %e, "invalid base64 in encoded word");
            None
        }
    }
}
