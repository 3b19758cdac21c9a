//! A single `token;key=val` element from a comma-separated header value.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

/// The value of one element parameter.
///
/// Most parameters are plain text. The `q` parameter of an
/// [`AcceptElement`](super::AcceptElement) is itself an element so that accept-extensions
/// following the quality survive as its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Element(HeaderElement),
}

impl ParamValue {
    /// The bare text of the parameter, unwrapping a nested element to its value.
    pub fn as_str(&self) -> &str {
        match self {
            ParamValue::Text(text) => text,
            ParamValue::Element(element) => element.value(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(text) => f.write_str(text),
            ParamValue::Element(element) => element.fmt(f),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(text: &str) -> Self {
        ParamValue::Text(text.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(text: String) -> Self {
        ParamValue::Text(text)
    }
}

impl From<HeaderElement> for ParamValue {
    fn from(element: HeaderElement) -> Self {
        ParamValue::Element(element)
    }
}

pub type Params = IndexMap<String, ParamValue>;

/// An element (with parameters) from an HTTP header's element list.
///
/// Parsing never fails: garbage input produces an element whose value is the garbage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeaderElement {
    value: String,
    params: Params,
}

impl HeaderElement {
    pub fn new<V: Into<String>>(value: V, params: Params) -> Self {
        Self { value: value.into(), params }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    pub fn into_parts(self) -> (String, Params) {
        (self.value, self.params)
    }

    /// Splits `token;key=val;key2="quoted"` into `("token", {key: val, key2: quoted})`.
    ///
    /// Parameter names are trimmed and lower-cased; values are trimmed and, when wrapped in double
    /// quotes, unquoted with `\\` and `\"` unescaped. Parameters without `=` are skipped and a
    /// repeated name keeps the last value.
    pub fn parse(element: &str) -> (String, Params) {
        let mut parts = split_params(element);
        let value = parts.next().unwrap_or_default().to_string();

        let mut params = Params::new();
        for part in parts {
            let Some((name, value)) = part.split_once('=') else {
                continue;
            };
            let name = name.trim().to_ascii_lowercase();
            params.insert(name, ParamValue::Text(unquote(value.trim())));
        }

        (value, params)
    }
}

impl FromStr for HeaderElement {
    type Err = Infallible;

    fn from_str(element: &str) -> Result<Self, Self::Err> {
        let (value, params) = Self::parse(element);
        Ok(Self { value, params })
    }
}

impl From<&str> for HeaderElement {
    fn from(element: &str) -> Self {
        let (value, params) = Self::parse(element);
        Self { value, params }
    }
}

impl fmt::Display for HeaderElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)?;
        for (name, value) in &self.params {
            write!(f, ";{name}={value}")?;
        }
        Ok(())
    }
}

/// Orders plain elements by their value only; parameters are ignored.
pub fn compare_by_value(a: &HeaderElement, b: &HeaderElement) -> Ordering {
    a.value.cmp(&b.value)
}

/// Iterates the `;`-separated parts of an element, trimmed. A `;` inside a quoted string does not
/// separate; `\"` does not open or close a quoted string.
fn split_params(element: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(element);
    std::iter::from_fn(move || {
        let current = rest?;
        let mut quotes = 0usize;
        let mut escaped_quotes = 0usize;
        let mut previous = None;
        for (index, byte) in current.bytes().enumerate() {
            match byte {
                b'"' => {
                    quotes += 1;
                    if previous == Some(b'\\') {
                        escaped_quotes += 1;
                    }
                }
                b';' if (quotes - escaped_quotes) % 2 == 0 => {
                    rest = Some(&current[index + 1..]);
                    return Some(current[..index].trim());
                }
                _ => {}
            }
            previous = Some(byte);
        }
        rest = None;
        Some(current.trim())
    })
}

fn unquote(value: &str) -> String {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value[1..value.len() - 1].replace("\\\\", "\\").replace("\\\"", "\"")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> ParamValue {
        ParamValue::Text(value.to_string())
    }

    #[test]
    fn parse_bare_token() {
        let element = HeaderElement::from("gzip");
        assert_eq!(element.value(), "gzip");
        assert!(element.params().is_empty());
    }

    #[test]
    fn parse_token_with_params() {
        let element = HeaderElement::from("text/html; charset=UTF-8 ; Level=1");
        assert_eq!(element.value(), "text/html");
        assert_eq!(element.param("charset"), Some(&text("UTF-8")));
        assert_eq!(element.param("level"), Some(&text("1")));
        assert_eq!(element.param("Level"), None);
    }

    #[test]
    fn parse_quoted_param_keeps_separators() {
        let element = HeaderElement::from(r#"form-data; name="a;b"; filename="x \"y\" \\z""#);
        assert_eq!(element.value(), "form-data");
        assert_eq!(element.param("name"), Some(&text("a;b")));
        assert_eq!(element.param("filename"), Some(&text(r#"x "y" \z"#)));
    }

    #[test]
    fn parse_skips_params_without_equals() {
        let element = HeaderElement::from("no-cache; private; max-age=0");
        assert_eq!(element.params().len(), 1);
        assert_eq!(element.param("max-age"), Some(&text("0")));
    }

    #[test]
    fn parse_repeated_param_keeps_last_value_in_first_position() {
        let element = HeaderElement::from("a; x=1; y=2; x=3");
        let names: Vec<_> = element.params().keys().map(String::as_str).collect();
        assert_eq!(names, ["x", "y"]);
        assert_eq!(element.param("x"), Some(&text("3")));
    }

    #[test]
    fn parse_garbage_passes_through() {
        assert_eq!(HeaderElement::from("").value(), "");
        assert_eq!(HeaderElement::from(" ;;= ").value(), "");
        assert_eq!(HeaderElement::from("@@@").value(), "@@@");
    }

    #[test]
    fn display_reassembles_params_in_order() {
        let element: HeaderElement = "text/plain;  format=flowed ; charset=utf-8".parse().unwrap();
        assert_eq!(element.to_string(), "text/plain;format=flowed;charset=utf-8");
    }

    #[test]
    fn compare_by_value_ignores_params() {
        let a = HeaderElement::from("b;x=1");
        let b = HeaderElement::from("b;x=2");
        let c = HeaderElement::from("a;z=9");
        assert_eq!(compare_by_value(&a, &b), Ordering::Equal);
        assert_eq!(compare_by_value(&a, &c), Ordering::Greater);
    }
}
