//! Case-insensitive, ordered storage for header fields.
//!
//! Every key is normalized with [`normalize_key`] on its way in and out, so `content-type`,
//! `Content-Type` and `CONTENT-TYPE` address the same field. Fields keep their insertion order,
//! and overwriting a field keeps its position.
//!
//! A [`HeaderMap`] belongs to a single request or response; it has no internal locking.

mod encoder;

use std::borrow::Cow;
use std::time::SystemTime;

use bytes::Bytes;
use indexmap::IndexMap;

pub use encoder::EncodingPolicy;
pub use encoder::encode_header_item;
pub use encoder::encode_text;

use crate::element::{HeaderElement, header_elements};
use crate::error::{EncodeError, ParseError};
use crate::rfc2047::decode_text_maybe;

/// A stored header value.
///
/// Structured values such as numbers, elements and dates are converted to text when stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Text(String),
    /// Raw bytes, sent as they are apart from control byte removal.
    Bytes(Bytes),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Bytes(_) => None,
        }
    }

    /// The value as text; bytes are read as ISO-8859-1, which maps every byte to a character.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(text) => Cow::Borrowed(text),
            FieldValue::Bytes(bytes) => Cow::Owned(bytes.iter().map(|byte| char::from(*byte)).collect()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}

impl From<Bytes> for FieldValue {
    fn from(bytes: Bytes) -> Self {
        FieldValue::Bytes(bytes)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(bytes: Vec<u8>) -> Self {
        FieldValue::Bytes(Bytes::from(bytes))
    }
}

impl From<u64> for FieldValue {
    fn from(number: u64) -> Self {
        FieldValue::Text(number.to_string())
    }
}

impl From<usize> for FieldValue {
    fn from(number: usize) -> Self {
        FieldValue::Text(number.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(number: i64) -> Self {
        FieldValue::Text(number.to_string())
    }
}

impl From<HeaderElement> for FieldValue {
    fn from(element: HeaderElement) -> Self {
        FieldValue::Text(element.to_string())
    }
}

impl From<SystemTime> for FieldValue {
    fn from(date_time: SystemTime) -> Self {
        FieldValue::Text(httpdate::fmt_http_date(date_time))
    }
}

/// Returns the canonical form of a header name: every letter that follows a non-letter is
/// upper-cased and every other letter lower-cased (`content-md5` becomes `Content-Md5`).
pub fn normalize_key(key: &str) -> String {
    let mut normalized = String::with_capacity(key.len());
    let mut after_letter = false;
    for c in key.chars() {
        if after_letter {
            normalized.extend(c.to_lowercase());
        } else {
            normalized.extend(c.to_uppercase());
        }
        after_letter = c.is_alphabetic();
    }
    normalized
}

/// Header fields of one request or response.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    fields: IndexMap<String, FieldValue>,
    policy: EncodingPolicy,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty map whose [`output`](Self::output) encodes with `policy`.
    pub fn with_policy(policy: EncodingPolicy) -> Self {
        Self { fields: IndexMap::new(), policy }
    }

    /// Builds a request header map from raw `(name, value)` pairs as read from the wire.
    ///
    /// Values are trimmed and RFC 2047 decoded; repeated fields are combined with
    /// [`append`](Self::append).
    pub fn from_wire<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut headers = Self::new();
        for (name, value) in pairs {
            headers.append(name, &decode_text_maybe(value.trim()));
        }
        headers
    }

    pub fn policy(&self) -> &EncodingPolicy {
        &self.policy
    }

    pub fn set_policy(&mut self, policy: EncodingPolicy) {
        self.policy = policy;
    }

    /// Stores `value` under `key`, returning the value it replaces.
    pub fn insert<K: AsRef<str>, V: Into<FieldValue>>(&mut self, key: K, value: V) -> Option<FieldValue> {
        self.fields.insert(normalize_key(key.as_ref()), value.into())
    }

    /// Adds `value` to the field, joining it to an existing value with `", "`.
    pub fn append<K: AsRef<str>>(&mut self, key: K, value: &str) {
        let key = normalize_key(key.as_ref());
        match self.fields.get_mut(&key) {
            Some(existing) => {
                let joined = format!("{}, {value}", existing.to_text());
                *existing = FieldValue::Text(joined);
            }
            None => {
                self.fields.insert(key, FieldValue::from(value));
            }
        }
    }

    pub fn get<K: AsRef<str>>(&self, key: K) -> Option<&FieldValue> {
        self.fields.get(&normalize_key(key.as_ref()))
    }

    /// The value under `key` when it is stored as text.
    pub fn get_str<K: AsRef<str>>(&self, key: K) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_str)
    }

    pub fn contains_key<K: AsRef<str>>(&self, key: K) -> bool {
        self.fields.contains_key(&normalize_key(key.as_ref()))
    }

    /// Removes the field, keeping the order of the remaining ones.
    pub fn remove<K: AsRef<str>>(&mut self, key: K) -> Option<FieldValue> {
        self.fields.shift_remove(&normalize_key(key.as_ref()))
    }

    /// Returns the value under `key`, inserting the result of `default` first when it is absent.
    pub fn get_or_insert_with<K, F, V>(&mut self, key: K, default: F) -> &mut FieldValue
    where
        K: AsRef<str>,
        F: FnOnce() -> V,
        V: Into<FieldValue>,
    {
        self.fields.entry(normalize_key(key.as_ref())).or_insert_with(|| default().into())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Returns the sorted element list of the field, see [`header_elements`].
    ///
    /// # Errors
    ///
    /// Fails when an `Accept*` field carries a malformed quality value.
    pub fn elements<K: AsRef<str>>(&self, key: K) -> Result<Vec<HeaderElement>, ParseError> {
        let key = normalize_key(key.as_ref());
        match self.fields.get(&key) {
            Some(value) => header_elements(&key, &value.to_text()),
            None => Ok(Vec::new()),
        }
    }

    /// Returns the value of each element of the field, in [`elements`](Self::elements) order.
    ///
    /// # Errors
    ///
    /// Fails like [`elements`](Self::elements).
    pub fn values<K: AsRef<str>>(&self, key: K) -> Result<Vec<String>, ParseError> {
        Ok(self.elements(key)?.into_iter().map(|element| element.into_parts().0).collect())
    }

    /// Encodes all fields into `(name, value)` byte pairs ready for the wire.
    ///
    /// # Errors
    ///
    /// Fails when a name or value can't be represented under the map's [`EncodingPolicy`].
    pub fn output(&self) -> Result<Vec<(Bytes, Bytes)>, EncodeError> {
        Self::encode_header_items(&self.policy, self.iter())
    }

    /// Encodes arbitrary `(name, value)` pairs with `policy`, see [`encode_header_item`].
    ///
    /// # Errors
    ///
    /// Fails when a name or value can't be represented under `policy`.
    pub fn encode_header_items<'a, I>(policy: &EncodingPolicy, items: I) -> Result<Vec<(Bytes, Bytes)>, EncodeError>
    where
        I: IntoIterator<Item = (&'a str, &'a FieldValue)>,
    {
        items
            .into_iter()
            .map(|(name, value)| {
                let name = encode_header_item(&FieldValue::from(name), policy)?;
                let value = encode_header_item(value, policy)?;
                Ok((name, value))
            })
            .collect()
    }

    /// Encodes the fields and collects them into an [`http::HeaderMap`].
    ///
    /// # Errors
    ///
    /// Fails when encoding fails or an encoded name isn't a valid `http` header name.
    pub fn to_http_headers(&self) -> Result<http::HeaderMap, EncodeError> {
        let output = self.output()?;
        let mut headers = http::HeaderMap::with_capacity(output.len());
        for (name, value) in output {
            let name = http::HeaderName::from_bytes(&name).map_err(EncodeError::invalid_header)?;
            let value = http::HeaderValue::from_maybe_shared(value).map_err(EncodeError::invalid_header)?;
            headers.append(name, value);
        }
        Ok(headers)
    }
}

impl<K: AsRef<str>, V: Into<FieldValue>> FromIterator<(K, V)> for HeaderMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = Self::new();
        headers.extend(iter);
        headers
    }
}

impl<K: AsRef<str>, V: Into<FieldValue>> Extend<(K, V)> for HeaderMap {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn normalize_key_title_cases_words() {
        assert_eq!(normalize_key("content-type"), "Content-Type");
        assert_eq!(normalize_key("CONTENT-TYPE"), "Content-Type");
        assert_eq!(normalize_key("x-forwarded-for"), "X-Forwarded-For");
        assert_eq!(normalize_key("content-md5"), "Content-Md5");
        assert_eq!(normalize_key("te"), "Te");
        assert_eq!(normalize_key("x_custom header"), "X_Custom Header");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "text/html");
        assert_eq!(headers.get_str("Content-Type"), Some("text/html"));
        assert_eq!(headers.get_str("CONTENT-TYPE"), Some("text/html"));
        assert!(headers.contains_key("Content-type"));
        assert_eq!(headers.keys().collect::<Vec<_>>(), ["Content-Type"]);
    }

    #[test]
    fn colliding_keys_overwrite_in_place() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Foo", "first");
        headers.insert("Server", "micro");
        let previous = headers.insert("x-foo", "second");
        assert_eq!(previous, Some(FieldValue::from("first")));
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.iter().map(|(key, _)| key).collect::<Vec<_>>(), ["X-Foo", "Server"]);
        assert_eq!(headers.get_str("X-FOO"), Some("second"));
    }

    #[test]
    fn remove_keeps_order() {
        let mut headers: HeaderMap = [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
        assert_eq!(headers.remove("B"), Some(FieldValue::from("2")));
        assert_eq!(headers.remove("b"), None);
        assert_eq!(headers.keys().collect::<Vec<_>>(), ["A", "C"]);
    }

    #[test]
    fn get_or_insert_with_only_inserts_once() {
        let mut headers = HeaderMap::new();
        headers.get_or_insert_with("cache-control", || "no-cache");
        headers.get_or_insert_with("Cache-Control", || "max-age=0");
        assert_eq!(headers.get_str("cache-control"), Some("no-cache"));
    }

    #[test]
    fn structured_values_are_stringified() {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Length", 42_u64);
        headers.insert("Content-Type", HeaderElement::from("text/plain; charset=utf-8"));
        headers.insert("Last-Modified", httpdate::parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT").unwrap());
        assert_eq!(headers.get_str("content-length"), Some("42"));
        assert_eq!(headers.get_str("content-type"), Some("text/plain;charset=utf-8"));
        assert_eq!(headers.get_str("last-modified"), Some("Sun, 06 Nov 1994 08:49:37 GMT"));
    }

    #[test]
    fn elements_and_values_of_accept_field() {
        let mut headers = HeaderMap::new();
        headers.insert("accept", "text/html;q=0.5, text/plain;q=0.9, text/*;q=0.1");
        assert_eq!(headers.values("Accept").unwrap(), ["text/plain", "text/html", "text/*"]);
        assert!(headers.elements("accept-charset").unwrap().is_empty());

        headers.insert("accept-encoding", "gzip;q=nope");
        assert_eq!(headers.elements("Accept-Encoding"), Err(ParseError::malformed_header("gzip;q=nope")));
    }

    #[test]
    fn te_is_normalized_to_a_plain_field() {
        // the canonical key is `Te`, which is not a quality header
        let mut headers = HeaderMap::new();
        headers.insert("TE", "trailers, deflate;q=bogus");
        let values = headers.values("te").unwrap();
        assert_eq!(values, ["trailers", "deflate"]);
    }

    #[test]
    fn output_encodes_names_and_values() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "text/plain");
        headers.insert("x-name", "f\u{fc}r");
        headers.insert("x-wide", "\u{8200}");
        headers.insert("x-raw", Bytes::from_static(b"raw\r\nvalue"));

        let output = headers.output().unwrap();
        assert_eq!(
            output,
            [
                (Bytes::from_static(b"Content-Type"), Bytes::from_static(b"text/plain")),
                (Bytes::from_static(b"X-Name"), Bytes::from_static(b"f\xfcr")),
                (Bytes::from_static(b"X-Wide"), Bytes::from_static(b"=?utf-8?b?6IiA?=")),
                (Bytes::from_static(b"X-Raw"), Bytes::from_static(b"rawvalue")),
            ]
        );
    }

    #[test]
    fn output_fails_without_fallback() {
        let mut headers = HeaderMap::with_policy(EncodingPolicy::default().use_rfc_2047(false));
        headers.insert("x-wide", "\u{8200}");
        assert!(matches!(headers.output(), Err(EncodeError::Unencodable { .. })));
    }

    #[test]
    fn convert_to_http_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("content-length", 5_usize);
        headers.insert("x-wide", "\u{8200}");
        let headers = headers.to_http_headers().unwrap();
        assert_eq!(headers.get(http::header::CONTENT_LENGTH).unwrap(), "5");
        assert_eq!(headers.get("x-wide").unwrap(), "=?utf-8?b?6IiA?=");
    }

    #[test]
    fn from_wire_decodes_and_combines() {
        let raw = indoc! {"
            Host: 127.0.0.1:8080
            accept-encoding: gzip
            Accept-Encoding: br;q=0.5
            X-Subject:  =?utf-8?q?f=C3=BCr?=
        "};

        let pairs = raw.lines().filter_map(|line| line.split_once(':'));
        let headers = HeaderMap::from_wire(pairs);

        assert_eq!(headers.len(), 3);
        assert_eq!(headers.get_str("host"), Some("127.0.0.1:8080"));
        assert_eq!(headers.get_str("accept-encoding"), Some("gzip, br;q=0.5"));
        assert_eq!(headers.values("Accept-Encoding").unwrap(), ["gzip", "br"]);
        assert_eq!(headers.get_str("x-subject"), Some("f\u{fc}r"));
    }
}
