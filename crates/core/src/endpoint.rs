//! Publish endpoint resolution.
//!
//! The stream URL is configured as a single string of the form
//! `rtsp://<host>:<port>/<path>`. It is resolved once, when the controller
//! is built, into a [`StreamEndpoint`] that the stream client connects to.

use std::fmt;

use crate::error::{EndpointErrorKind, Result, StreamError};

const SCHEME: &str = "rtsp://";

/// Resolved RTSP server address and stream path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEndpoint {
    /// Server host name or address (bracketed for IPv6).
    pub host: String,
    /// Server RTSP port, never zero.
    pub port: u16,
    /// Stream path on the server, always starting with `/`.
    pub path: String,
}

impl StreamEndpoint {
    /// Parse a stream URL of the form `rtsp://host:port/path`.
    ///
    /// The whole string (after trimming surrounding whitespace) must match;
    /// there is no lenient or partial parsing.
    ///
    /// ## Examples
    ///
    /// ```
    /// use camstream::StreamEndpoint;
    ///
    /// let ep = StreamEndpoint::parse("rtsp://192.168.1.10:1935/live/phone").unwrap();
    /// assert_eq!(ep.host, "192.168.1.10");
    /// assert_eq!(ep.port, 1935);
    /// assert_eq!(ep.path, "/live/phone");
    ///
    /// assert!(StreamEndpoint::parse("rtsp://host:port/live").is_err());
    /// ```
    pub fn parse(uri: &str) -> Result<Self> {
        let malformed = |kind| StreamError::MalformedEndpoint { kind };

        let rest = uri
            .trim()
            .strip_prefix(SCHEME)
            .ok_or(malformed(EndpointErrorKind::MissingScheme))?;

        let (authority, path) = rest
            .split_once('/')
            .ok_or(malformed(EndpointErrorKind::MissingPath))?;

        if path.is_empty() {
            return Err(malformed(EndpointErrorKind::MissingPath));
        }

        let (host, port) = authority
            .rsplit_once(':')
            .ok_or(malformed(EndpointErrorKind::MissingPort))?;

        if host.is_empty() {
            return Err(malformed(EndpointErrorKind::MissingHost));
        }

        Ok(StreamEndpoint {
            host: host.to_string(),
            port: parse_port(port).ok_or(malformed(EndpointErrorKind::InvalidPort))?,
            path: format!("/{path}"),
        })
    }
}

/// Digits only: `u16::from_str` would accept a leading `+`.
fn parse_port(port: &str) -> Option<u16> {
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    port.parse::<u16>().ok().filter(|p| *p != 0)
}

impl fmt::Display for StreamEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}{}:{}{}", self.host, self.port, self.path)
    }
}

/// Publisher credentials presented to the RTSP server.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(uri: &str) -> EndpointErrorKind {
        match StreamEndpoint::parse(uri) {
            Err(StreamError::MalformedEndpoint { kind }) => kind,
            other => panic!("expected MalformedEndpoint for {uri:?}, got {other:?}"),
        }
    }

    #[test]
    fn parse_full_uri() {
        let ep = StreamEndpoint::parse("rtsp://10.0.0.5:8554/live").unwrap();
        assert_eq!(
            ep,
            StreamEndpoint {
                host: "10.0.0.5".to_string(),
                port: 8554,
                path: "/live".to_string(),
            }
        );
    }

    #[test]
    fn parse_multi_segment_path() {
        let ep = StreamEndpoint::parse("rtsp://cam.example.org:1935/app/stream1").unwrap();
        assert_eq!(ep.host, "cam.example.org");
        assert_eq!(ep.path, "/app/stream1");
    }

    #[test]
    fn parse_single_digit_port() {
        assert_eq!(StreamEndpoint::parse("rtsp://h:7/p").unwrap().port, 7);
    }

    #[test]
    fn parse_ipv6_host() {
        let ep = StreamEndpoint::parse("rtsp://[::1]:8554/stream").unwrap();
        assert_eq!(ep.host, "[::1]");
        assert_eq!(ep.port, 8554);
    }

    #[test]
    fn parse_trims_whitespace() {
        let ep = StreamEndpoint::parse("  rtsp://h:554/s\n").unwrap();
        assert_eq!(ep.to_string(), "rtsp://h:554/s");
    }

    #[test]
    fn reject_missing_scheme() {
        assert_eq!(kind_of("10.0.0.5:8554/live"), EndpointErrorKind::MissingScheme);
        assert_eq!(kind_of("http://h:80/live"), EndpointErrorKind::MissingScheme);
    }

    #[test]
    fn reject_missing_path() {
        assert_eq!(kind_of("rtsp://h:8554"), EndpointErrorKind::MissingPath);
        assert_eq!(kind_of("rtsp://h:8554/"), EndpointErrorKind::MissingPath);
    }

    #[test]
    fn reject_missing_port() {
        assert_eq!(kind_of("rtsp://host/live"), EndpointErrorKind::MissingPort);
    }

    #[test]
    fn reject_missing_host() {
        assert_eq!(kind_of("rtsp://:8554/live"), EndpointErrorKind::MissingHost);
    }

    #[test]
    fn reject_bad_ports() {
        for uri in [
            "rtsp://h:abc/live",
            "rtsp://h:/live",
            "rtsp://h:+80/live",
            "rtsp://h:0/live",
            "rtsp://h:65536/live",
        ] {
            assert_eq!(kind_of(uri), EndpointErrorKind::InvalidPort, "{uri}");
        }
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("publisher", "s3cret");
        let shown = format!("{creds:?}");
        assert!(shown.contains("publisher"));
        assert!(!shown.contains("s3cret"));
    }
}
