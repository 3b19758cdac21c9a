//! Small helpers around request paths, protocol versions and dates.

use std::time::SystemTime;

use http::Version;

/// Joins path atoms into a single URL path, skipping empty atoms.
///
/// Runs of `/` collapse to one, and an empty result becomes `/`, so a blank `SCRIPT_NAME` or
/// `PATH_INFO` never produces a broken path.
///
/// ```
/// use micro_httputil::url::urljoin;
///
/// assert_eq!(urljoin(&["/app/", "/index"]), "/app/index");
/// assert_eq!(urljoin(&["", ""]), "/");
/// ```
pub fn urljoin(atoms: &[&str]) -> String {
    let joined = atoms.iter().filter(|atom| !atom.is_empty()).copied().collect::<Vec<_>>().join("/");
    let mut url = String::with_capacity(joined.len());
    for c in joined.chars() {
        if c == '/' && url.ends_with('/') {
            continue;
        }
        url.push(c);
    }
    if url.is_empty() { "/".to_string() } else { url }
}

/// [`urljoin`] for raw path bytes.
pub fn urljoin_bytes(atoms: &[&[u8]]) -> Vec<u8> {
    let joined = atoms.iter().filter(|atom| !atom.is_empty()).copied().collect::<Vec<_>>().join(&b'/');
    let mut url = Vec::with_capacity(joined.len());
    for byte in joined {
        if byte == b'/' && url.last() == Some(&b'/') {
            continue;
        }
        url.push(byte);
    }
    if url.is_empty() { b"/".to_vec() } else { url }
}

/// Returns `(major, minor)` from an `HTTP/x.y` protocol string.
pub fn protocol_from_http(protocol: &str) -> Option<(u8, u8)> {
    let version = protocol.strip_prefix("HTTP/")?;
    let (major, minor) = version.split_once('.')?;
    let digit = |part: &str| match part.as_bytes() {
        [byte] if byte.is_ascii_digit() => Some(byte - b'0'),
        _ => None,
    };
    Some((digit(major)?, digit(minor)?))
}

/// Maps an `HTTP/x.y` protocol string to the matching [`Version`], if `http` knows it.
pub fn protocol_version(protocol: &str) -> Option<Version> {
    match protocol_from_http(protocol)? {
        (0, 9) => Some(Version::HTTP_09),
        (1, 0) => Some(Version::HTTP_10),
        (1, 1) => Some(Version::HTTP_11),
        (2, 0) => Some(Version::HTTP_2),
        (3, 0) => Some(Version::HTTP_3),
        _ => None,
    }
}

/// Formats a point in time as an IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn http_date(date_time: SystemTime) -> String {
    httpdate::fmt_http_date(date_time)
}
