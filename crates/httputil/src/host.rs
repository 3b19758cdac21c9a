//! Remote or local socket endpoints as seen by a request.

use std::fmt;
use std::net::SocketAddr;

/// An internet address with a port and an optional host name.
///
/// Requests use it for both ends of the connection. Missing parts fall back to
/// `0.0.0.0:80` named `unknown.tld`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Host {
    pub ip: String,
    pub port: u16,
    /// The resolved name, or the address itself when no name was given.
    pub name: String,
}

impl Host {
    pub const DEFAULT_IP: &'static str = "0.0.0.0";
    pub const DEFAULT_PORT: u16 = 80;
    pub const DEFAULT_NAME: &'static str = "unknown.tld";

    /// Creates an endpoint; without a `name` the `ip` doubles as the name.
    pub fn new<S: Into<String>>(ip: S, port: u16, name: Option<String>) -> Self {
        let ip = ip.into();
        let name = name.unwrap_or_else(|| ip.clone());
        Self { ip, port, name }
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new(Self::DEFAULT_IP, Self::DEFAULT_PORT, Some(Self::DEFAULT_NAME.to_string()))
    }
}

impl From<SocketAddr> for Host {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip().to_string(), addr.port(), None)
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_defaults_to_ip() {
        let host = Host::new("127.0.0.1", 8080, None);
        assert_eq!(host.name, "127.0.0.1");
        assert_eq!(host.to_string(), "127.0.0.1:8080");

        let host = Host::new("10.0.0.1", 443, Some("example.com".to_string()));
        assert_eq!(host.name, "example.com");
    }

    #[test]
    fn default_host() {
        let host = Host::default();
        assert_eq!(host.ip, "0.0.0.0");
        assert_eq!(host.port, 80);
        assert_eq!(host.name, "unknown.tld");
    }

    #[test]
    fn from_socket_addr() {
        let addr: SocketAddr = "[::1]:9000".parse().unwrap();
        let host = Host::from(addr);
        assert_eq!(host.ip, "::1");
        assert_eq!(host.port, 9000);
        assert_eq!(host.name, "::1");
    }
}
