//! URL query string parsing.
//!
//! Pairs are separated by `&` or, for legacy clients, `;`. Repeated names collect all of their
//! values in order. A query string of the form `x,y` comes from a server-side image map and is
//! returned as `x` and `y` coordinates.

use std::mem;

use indexmap::IndexMap;
use tracing::trace;

use crate::charset::Charset;
use crate::error::ParseError;

/// The value stored under one query parameter name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    /// The name occurred more than once; values in order of appearance.
    Multiple(Vec<String>),
    /// One coordinate of an image-map query.
    Coordinate(u64),
}

impl QueryValue {
    fn push(&mut self, value: String) {
        match self {
            QueryValue::Multiple(values) => values.push(value),
            QueryValue::Single(first) => {
                let first = mem::take(first);
                *self = QueryValue::Multiple(vec![first, value]);
            }
            QueryValue::Coordinate(coordinate) => {
                let first = coordinate.to_string();
                *self = QueryValue::Multiple(vec![first, value]);
            }
        }
    }

    /// The first value as text, if this is not a coordinate.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::Single(value) => Some(value),
            QueryValue::Multiple(values) => values.first().map(String::as_str),
            QueryValue::Coordinate(_) => None,
        }
    }
}

/// Parameters parsed from a query string, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: IndexMap<String, QueryValue>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&QueryValue> {
        self.params.get(name)
    }

    /// Every text value stored under `name`.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        match self.params.get(name) {
            Some(QueryValue::Single(value)) => vec![value.as_str()],
            Some(QueryValue::Multiple(values)) => values.iter().map(String::as_str).collect(),
            Some(QueryValue::Coordinate(_)) | None => Vec::new(),
        }
    }

    /// The `(x, y)` coordinates when the query string came from an image map.
    pub fn image_map(&self) -> Option<(u64, u64)> {
        match (self.params.get("x"), self.params.get("y")) {
            (Some(QueryValue::Coordinate(x)), Some(QueryValue::Coordinate(y))) => Some((*x, *y)),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &QueryValue)> {
        self.params.iter()
    }

    pub fn into_inner(self) -> IndexMap<String, QueryValue> {
        self.params
    }

    fn append(&mut self, name: String, value: String) {
        if let Some(existing) = self.params.get_mut(&name) {
            existing.push(value);
        } else {
            self.params.insert(name, QueryValue::Single(value));
        }
    }
}

impl<'a> IntoIterator for &'a QueryParams {
    type Item = (&'a String, &'a QueryValue);
    type IntoIter = indexmap::map::Iter<'a, String, QueryValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

/// How [`parse_query_string_with`] treats blank and malformed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Keep `name=` and bare `name` fields as empty strings instead of dropping them.
    pub keep_blank_values: bool,
    /// Fail on malformed fields instead of silently skipping them.
    pub strict_parsing: bool,
    /// The charset percent-decoded bytes are interpreted in.
    pub charset: Charset,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self { keep_blank_values: true, strict_parsing: false, charset: Charset::Utf8 }
    }
}

impl QueryOptions {
    pub fn keep_blank_values(mut self, keep_blank_values: bool) -> Self {
        self.keep_blank_values = keep_blank_values;
        self
    }

    pub fn strict_parsing(mut self, strict_parsing: bool) -> Self {
        self.strict_parsing = strict_parsing;
        self
    }

    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }
}

/// Parses a query string with the lenient [default options](QueryOptions::default).
///
/// Fields that can't be decoded are dropped, so this never fails.
pub fn parse_query_string(query_string: &str) -> QueryParams {
    // lenient parsing has no error path
    parse_query_string_with(query_string, &QueryOptions::default()).unwrap_or_default()
}

/// Parses a query string into its parameters.
///
/// # Errors
///
/// Only with [`QueryOptions::strict_parsing`]: a field without `=`, an empty field, a malformed
/// `%` escape or bytes that aren't valid in the configured charset fail the whole parse. Leniently,
/// such fields are skipped and malformed escapes are kept literally.
pub fn parse_query_string_with(query_string: &str, options: &QueryOptions) -> Result<QueryParams, ParseError> {
    if let Some((x, y)) = parse_image_map(query_string) {
        let mut params = IndexMap::with_capacity(2);
        params.insert("x".to_string(), QueryValue::Coordinate(x));
        params.insert("y".to_string(), QueryValue::Coordinate(y));
        return Ok(QueryParams { params });
    }

    let mut params = QueryParams::new();
    for field in query_string.split(['&', ';']) {
        if field.is_empty() && !options.strict_parsing {
            continue;
        }

        let (name, value) = match field.split_once('=') {
            Some(pair) => pair,
            None if options.strict_parsing => return Err(ParseError::bad_query_field(field)),
            // a control-name with no equal sign
            None if options.keep_blank_values => (field, ""),
            None => continue,
        };

        if value.is_empty() && !options.keep_blank_values {
            continue;
        }

        let decoded = decode_component(name, options).and_then(|name| Ok((name, decode_component(value, options)?)));
        match decoded {
            Ok((name, value)) => params.append(name, value),
            Err(e) if options.strict_parsing => return Err(e),
            Err(e) => trace!(field, cause = %e, "dropping undecodable query field"),
        }
    }

    Ok(params)
}

/// Matches `^[0-9]+,[0-9]+$`.
fn parse_image_map(query_string: &str) -> Option<(u64, u64)> {
    let (x, y) = query_string.split_once(',')?;
    let is_number = |part: &str| !part.is_empty() && part.bytes().all(|byte| byte.is_ascii_digit());
    if !is_number(x) || !is_number(y) {
        return None;
    }
    // all digits, so parsing only fails on overflow
    let coordinate = |part: &str| part.parse().unwrap_or(u64::MAX);
    Some((coordinate(x), coordinate(y)))
}

fn decode_component(raw: &str, options: &QueryOptions) -> Result<String, ParseError> {
    if options.strict_parsing && has_malformed_escape(raw) {
        return Err(ParseError::invalid_percent_escape(raw));
    }

    let spaced = raw.replace('+', " ");
    let mut decoded = String::with_capacity(spaced.len());
    let mut rest = spaced.as_str();

    // only escaped octets are read in the configured charset, literal text is already unicode
    while let Some(start) = rest.find('%') {
        decoded.push_str(&rest[..start]);
        let escaped = &rest[start..];
        let run = escaped_run_len(escaped.as_bytes());
        if run == 0 {
            decoded.push('%');
            rest = &escaped[1..];
            continue;
        }

        let bytes = urlencoding::decode_binary(escaped[..run].as_bytes());
        let text = options.charset.decode(&bytes).ok_or_else(|| ParseError::undecodable_query(raw, options.charset.name()))?;
        decoded.push_str(&text);
        rest = &escaped[run..];
    }

    decoded.push_str(rest);
    Ok(decoded)
}

/// Length of the run of consecutive `%XX` escapes at the start of `bytes`.
fn escaped_run_len(bytes: &[u8]) -> usize {
    let mut len = 0;
    while bytes.get(len) == Some(&b'%') && bytes.get(len + 1..len + 3).is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
        len += 3;
    }
    len
}

fn has_malformed_escape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.iter().enumerate().any(|(index, byte)| {
        *byte == b'%' && !bytes.get(index + 1..index + 3).is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(value: &str) -> QueryValue {
        QueryValue::Single(value.to_string())
    }

    #[test]
    fn image_map_coordinates() {
        let params = parse_query_string("12,34");
        assert_eq!(params.get("x"), Some(&QueryValue::Coordinate(12)));
        assert_eq!(params.get("y"), Some(&QueryValue::Coordinate(34)));
        assert_eq!(params.image_map(), Some((12, 34)));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn image_map_must_match_whole_string() {
        let params = parse_query_string("12,34&a=1");
        assert_eq!(params.image_map(), None);
        assert_eq!(params.get("a"), Some(&single("1")));
        assert_eq!(parse_query_string(",34").image_map(), None);
    }

    #[test]
    fn simple_pairs() {
        let params = parse_query_string("a=1&b=2");
        assert_eq!(params.get("a"), Some(&single("1")));
        assert_eq!(params.get("b"), Some(&single("2")));
        let names: Vec<_> = params.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn repeated_names_accumulate_in_order() {
        let params = parse_query_string("a=1&a=2&a=3");
        assert_eq!(params.get("a"), Some(&QueryValue::Multiple(vec!["1".into(), "2".into(), "3".into()])));
        assert_eq!(params.get_all("a"), ["1", "2", "3"]);
        assert_eq!(params.get("a").and_then(QueryValue::as_str), Some("1"));
    }

    #[test]
    fn semicolon_separates_fields() {
        let params = parse_query_string("a=1;b=2&c=3");
        assert_eq!(params.len(), 3);
        assert_eq!(params.get("b"), Some(&single("2")));
    }

    #[test]
    fn percent_and_plus_decoding() {
        let params = parse_query_string("name=J%C3%BCrgen+M&q=a%2Bb&sp%20ace=1");
        assert_eq!(params.get("name"), Some(&single("J\u{fc}rgen M")));
        assert_eq!(params.get("q"), Some(&single("a+b")));
        assert_eq!(params.get("sp ace"), Some(&single("1")));
    }

    #[test]
    fn blank_values_kept_by_default() {
        let params = parse_query_string("a=&b&c=3");
        assert_eq!(params.get("a"), Some(&single("")));
        assert_eq!(params.get("b"), Some(&single("")));

        let options = QueryOptions::default().keep_blank_values(false);
        let params = parse_query_string_with("a=&b&c=3", &options).unwrap();
        assert!(!params.contains("a"));
        assert!(!params.contains("b"));
        assert_eq!(params.get("c"), Some(&single("3")));
    }

    #[test]
    fn empty_fields_are_skipped() {
        let params = parse_query_string("&&a=1&;");
        assert_eq!(params.len(), 1);
        assert!(parse_query_string("").is_empty());
    }

    #[test]
    fn other_charset() {
        let options = QueryOptions::default().charset(Charset::Latin1);
        let params = parse_query_string_with("name=J%FCrgen", &options).unwrap();
        assert_eq!(params.get("name"), Some(&single("J\u{fc}rgen")));
    }

    #[test]
    fn literal_text_is_not_reinterpreted_by_charset() {
        let latin1 = QueryOptions::default().charset(Charset::Latin1);
        let params = parse_query_string_with("name=caf\u{e9}&escaped=caf%E9", &latin1).unwrap();
        assert_eq!(params.get("name"), Some(&single("caf\u{e9}")));
        assert_eq!(params.get("escaped"), Some(&single("caf\u{e9}")));

        let ascii = QueryOptions::default().charset(Charset::Ascii);
        let params = parse_query_string_with("name=caf\u{e9}&n=a%41b", &ascii).unwrap();
        assert_eq!(params.get("name"), Some(&single("caf\u{e9}")));
        assert_eq!(params.get("n"), Some(&single("aAb")));

        let strict_ascii = ascii.strict_parsing(true);
        let params = parse_query_string_with("name=caf\u{e9}", &strict_ascii).unwrap();
        assert_eq!(params.get("name"), Some(&single("caf\u{e9}")));
        assert_eq!(parse_query_string_with("name=caf%E9", &strict_ascii), Err(ParseError::undecodable_query("caf%E9", "US-ASCII")));
    }

    #[test]
    fn escapes_decode_as_one_sequence() {
        // a multi-byte utf-8 character split over adjacent escapes
        let params = parse_query_string("w=%E8%88%80-%41");
        assert_eq!(params.get("w"), Some(&single("\u{8200}-A")));
    }

    #[test]
    fn oversized_image_map_coordinates_saturate() {
        let params = parse_query_string("99999999999999999999999,1");
        assert_eq!(params.image_map(), Some((u64::MAX, 1)));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn undecodable_field_dropped_when_lenient() {
        let params = parse_query_string("a=%FF&b=2");
        assert!(!params.contains("a"));
        assert_eq!(params.get("b"), Some(&single("2")));

        // malformed escapes stay literal
        assert_eq!(parse_query_string("p=100%").get("p"), Some(&single("100%")));
    }

    #[test]
    fn strict_parsing_rejects_malformed_fields() {
        let strict = QueryOptions::default().strict_parsing(true);
        assert_eq!(parse_query_string_with("a=%FF", &strict), Err(ParseError::undecodable_query("%FF", "UTF-8")));
        assert_eq!(parse_query_string_with("p=100%", &strict), Err(ParseError::invalid_percent_escape("100%")));
        assert_eq!(parse_query_string_with("p=%zz", &strict), Err(ParseError::invalid_percent_escape("%zz")));
        assert_eq!(parse_query_string_with("a=1&&b=2", &strict), Err(ParseError::bad_query_field("")));
        assert_eq!(parse_query_string_with("a=1&flag", &strict), Err(ParseError::bad_query_field("flag")));

        let params = parse_query_string_with("a=1&b=%41", &strict).unwrap();
        assert_eq!(params.get("b"), Some(&single("A")));
    }
}
