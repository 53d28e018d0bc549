//! GUI endpoint override parsing.
//!
//! The GUI address override may be a bare `host:port`, a bare socket path, or
//! a URI such as `https://0.0.0.0:8384` or `unix:///run/gui.sock`. This module
//! splits a slash-containing override into its scheme, host and path, and
//! holds the prefix table used to derive the TLS flag from an override.
//!
//! Parsing is syntactic only. Hosts are not resolved or range-checked and
//! ports are not limited to 16 bits: `http://1.2.3.256:70000` is accepted, so
//! the listener reports the real problem.

use std::fmt::{Display, Formatter};

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;

use crate::constants::{IPV4_LOOPBACK, IPV6_LOOPBACK};

const UNIX_SCHEME_PREFIX: &str = "unix";

/// `(scheme family prefix, secure prefix)` pairs, checked in order.
///
/// An override starting with a family prefix enables TLS iff it also starts
/// with the matching secure prefix. Matching is case-sensitive.
const TLS_SCHEME_PREFIXES: &[(&str, &str)] = &[("http", "https:"), ("unix", "unixs:")];

/// Punctuation allowed verbatim in a host.
const HOST_PUNCTUATION: &[u8] = b"-_.~!$&'()*+,;=:[]<>\"";

/// Punctuation allowed in user info, besides alphanumerics.
const USER_INFO_PUNCTUATION: &[u8] = b"-._:~!$&'()*+,;=%@";

/// Bytes escaped when a host is written into a URL; the complement of
/// alphanumerics and [`HOST_PUNCTUATION`].
const HOST_ESCAPE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b':')
    .remove(b'[')
    .remove(b']')
    .remove(b'<')
    .remove(b'>')
    .remove(b'"');

/// Transport family a GUI endpoint listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// TCP over IPv4 or IPv6.
    Tcp,

    /// UNIX domain socket (POSIX systems).
    Unix,
}

impl Network {
    /// Returns the conventional network name, `"tcp"` or `"unix"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Unix => "unix",
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by [`OverrideUri::parse`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    /// ASCII control characters are never allowed.
    #[error("address override must not contain control characters")]
    ControlCharacter,

    /// The input starts with `:`.
    #[error("address override is missing a scheme before ':'")]
    MissingScheme,

    /// A scheme-less reference such as `0.0.0.0:8384/` is ambiguous.
    #[error("first path segment of address override cannot contain a colon")]
    ColonInFirstSegment,

    /// The port after the last `:` of the host is not all digits.
    #[error("address override has an invalid port {0:?}")]
    InvalidPort(String),

    /// An IPv6 literal host is not closed.
    #[error("address override host is missing a closing ']'")]
    MissingBracket,

    /// The host contains a character that is not allowed in a host.
    #[error("address override has an invalid host {0:?}")]
    InvalidHost(String),

    /// The user info contains a character that is not allowed there.
    #[error("address override has invalid user info")]
    InvalidUserInfo,

    /// A `%` is not followed by two hex digits.
    #[error("address override has an invalid percent-escape in {0:?}")]
    InvalidEscape(String),
}

/// A slash-containing address override split into its components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideUri {
    scheme: String,
    host: String,
    path: String,
}

impl OverrideUri {
    /// Parse an address override as an absolute URI or a relative reference.
    ///
    /// ## Accepted formats
    ///
    /// - `http://host:port`, `https://[::]:port`, `http://:port`
    /// - `unix:///path/to/socket`, `unixs:/path/to/socket`
    /// - `unix:tmp/sock` (opaque, empty path)
    /// - `/path/to/socket`, `//host:port` (no scheme)
    ///
    /// Query and fragment are dropped. Host and path are percent-decoded.
    ///
    /// ## Errors
    ///
    /// Returns an [`EndpointError`] if:
    /// - the input contains ASCII control characters,
    /// - the input starts with `:`, or has no scheme and a colon in its first path segment,
    /// - the host has a non-numeric port, an unclosed `[`, or a disallowed character,
    /// - the user info has a disallowed character,
    /// - a `%` is not followed by two hex digits.
    pub fn parse(input: &str) -> Result<Self, EndpointError> {
        if input.bytes().any(|b| b.is_ascii_control()) {
            return Err(EndpointError::ControlCharacter);
        }

        let (input, fragment) = input.split_once('#').unwrap_or((input, ""));
        check_escapes(fragment)?;

        let (scheme, rest) = split_scheme(input)?;

        // The query never contributes to the host or path.
        let rest = rest.split_once('?').map_or(rest, |(before, _query)| before);

        if !rest.starts_with('/') {
            if !scheme.is_empty() {
                // Opaque form, e.g. `unix:tmp/sock`.
                return Ok(Self {
                    scheme,
                    host: String::new(),
                    path: String::new(),
                });
            }

            let first_segment = rest.split_once('/').map_or(rest, |(segment, _)| segment);
            if first_segment.contains(':') {
                return Err(EndpointError::ColonInFirstSegment);
            }
        }

        let (host, path) = match rest.strip_prefix("//") {
            // Without a scheme, `///path` is a path rather than an empty authority.
            Some(hier) if !scheme.is_empty() || !rest.starts_with("///") => {
                let (authority, path) = hier.split_at(hier.find('/').unwrap_or(hier.len()));
                (parse_authority(authority)?, path)
            }
            _ => (String::new(), rest),
        };

        Ok(Self {
            scheme,
            host,
            path: decode(path)?,
        })
    }

    /// Lowercased URI scheme, empty for a relative reference.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Decoded `host[:port]`, without user info.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Decoded path component.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the scheme selects a UNIX domain socket (`unix`, `unixs`, ...).
    pub fn is_unix(&self) -> bool {
        self.scheme.starts_with(UNIX_SCHEME_PREFIX)
    }
}

fn split_scheme(input: &str) -> Result<(String, &str), EndpointError> {
    for (i, c) in input.char_indices() {
        match c {
            'a'..='z' | 'A'..='Z' => {}
            '0'..='9' | '+' | '-' | '.' if i > 0 => {}
            ':' if i == 0 => return Err(EndpointError::MissingScheme),
            ':' => return Ok((input[..i].to_ascii_lowercase(), &input[i + 1..])),
            _ => break,
        }
    }

    Ok((String::new(), input))
}

fn parse_authority(authority: &str) -> Result<String, EndpointError> {
    let host = match authority.rsplit_once('@') {
        Some((user_info, host)) => {
            let valid = user_info
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || USER_INFO_PUNCTUATION.contains(&b));
            if !valid {
                return Err(EndpointError::InvalidUserInfo);
            }
            check_escapes(user_info)?;
            host
        }
        None => authority,
    };

    parse_host(host)
}

fn parse_host(host: &str) -> Result<String, EndpointError> {
    let port = if host.starts_with('[') {
        let end = host.rfind(']').ok_or(EndpointError::MissingBracket)?;
        &host[end + 1..]
    } else {
        host.rfind(':').map_or("", |i| &host[i..])
    };

    let valid_port = port.is_empty()
        || port
            .strip_prefix(':')
            .is_some_and(|digits| digits.bytes().all(|b| b.is_ascii_digit()));
    if !valid_port {
        return Err(EndpointError::InvalidPort(port.to_owned()));
    }

    let invalid_host = || EndpointError::InvalidHost(host.to_owned());
    let bytes = host.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let escape = host
                    .get(i..i + 3)
                    .filter(|e| is_hex_escape(e))
                    .ok_or_else(|| EndpointError::InvalidEscape(host.to_owned()))?;
                // Only `%25` or escapes of non-ASCII bytes may appear in a host.
                if escape != "%25" && escape.as_bytes()[1] < b'8' {
                    return Err(invalid_host());
                }
                i += 3;
            }
            b if b.is_ascii()
                && !b.is_ascii_alphanumeric()
                && !HOST_PUNCTUATION.contains(&b) =>
            {
                return Err(invalid_host());
            }
            _ => i += 1,
        }
    }

    Ok(percent_decode_str(host).decode_utf8_lossy().into_owned())
}

fn is_hex_escape(escape: &str) -> bool {
    let bytes = escape.as_bytes();
    bytes.len() == 3
        && bytes[0] == b'%'
        && bytes[1].is_ascii_hexdigit()
        && bytes[2].is_ascii_hexdigit()
}

fn check_escapes(input: &str) -> Result<(), EndpointError> {
    for (i, _) in input.match_indices('%') {
        if !input.get(i..i + 3).is_some_and(is_hex_escape) {
            return Err(EndpointError::InvalidEscape(input.to_owned()));
        }
    }
    Ok(())
}

fn decode(input: &str) -> Result<String, EndpointError> {
    check_escapes(input)?;
    Ok(percent_decode_str(input).decode_utf8_lossy().into_owned())
}

/// Derives the TLS flag from the scheme prefix of an address override.
///
/// Returns `None` when the override matches no known scheme family, in which
/// case the configured TLS flag applies.
pub fn tls_from_scheme_prefix(input: &str) -> Option<bool> {
    TLS_SCHEME_PREFIXES
        .iter()
        .find(|(family, _)| input.starts_with(family))
        .map(|(_, secure)| input.starts_with(secure))
}

/// Rewrites a bind-all `host:port` into a loopback address a browser can open.
///
/// - `:port` becomes `127.0.0.1:port`
/// - `0.0.0.0:port` becomes `127.0.0.1:port`
/// - `[::]:port` becomes `[::1]:port`
///
/// Any other host is returned unchanged.
pub fn loopback_display_host(host: &str) -> String {
    if host.starts_with(':') {
        format!("{IPV4_LOOPBACK}{host}")
    } else if let Some(port) = host.strip_prefix("0.0.0.0:") {
        format!("{IPV4_LOOPBACK}:{port}")
    } else if let Some(port) = host.strip_prefix("[::]:") {
        format!("{IPV6_LOOPBACK}:{port}")
    } else {
        host.to_owned()
    }
}

/// Percent-escapes `host` for the authority of a URL.
///
/// Alphanumerics, `-._~`, sub-delimiters and `:[]<>"` are kept; `/`, `%`,
/// spaces and non-ASCII bytes are escaped.
pub fn escape_host(host: &str) -> String {
    utf8_percent_encode(host, HOST_ESCAPE_SET).to_string()
}
