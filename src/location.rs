//! SSDP reply inspection
//!
//! Replies are HTTP-like text. Only the status line, the `LOCATION` header and
//! the presence of the service-type token matter here; everything else in a
//! reply is ignored.

use crate::types::ReplyLocation;

const LOCATION_HEADER: &str = "LOCATION";
const HTTP_SCHEME: &str = "http://";
const STATUS_LINE_PREFIX: &str = "HTTP/";
const DOCUMENT_SUFFIX: &str = ".xml";
const DEFAULT_HTTP_PORT: u16 = 80;

/// Whether a datagram is a directed search reply (starts with a status line)
///
/// `NOTIFY` announcements and other control points' `M-SEARCH` requests fail
/// this check.
pub fn is_search_reply(reply: &str) -> bool {
    reply
        .get(..STATUS_LINE_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(STATUS_LINE_PREFIX))
}

/// Whether a reply mentions the expected service type
///
/// Some devices answer every `M-SEARCH` regardless of its `ST`, so the token is
/// checked on our side too. The token must end at a line end, whitespace, a
/// `::` separator (as in `USN`) or the end of the reply, so `...:1` does not
/// accept `...:10`.
pub fn matches_service_type(reply: &str, service_type: &str) -> bool {
    if service_type.is_empty() {
        return false;
    }
    reply.match_indices(service_type).any(|(idx, _)| {
        let after = &reply[idx + service_type.len()..];
        after.is_empty()
            || after.starts_with("::")
            || after.starts_with(|c: char| c.is_ascii_whitespace())
    })
}

/// Parse the `LOCATION: http://host[:port]/path.xml` header of a reply
///
/// Returns `None` when the header is absent or not `http://`, when the host is
/// empty, when the port is not a number in 1..=65535, or when the path has no
/// `.xml` document. A missing port means 80. The path is cut right after the
/// first `.xml`, dropping any query string.
pub fn parse_location(reply: &str) -> Option<ReplyLocation> {
    let value = reply
        .lines()
        .find_map(|line| header_value(line, LOCATION_HEADER))?;

    let scheme = value.get(..HTTP_SCHEME.len())?;
    if !scheme.eq_ignore_ascii_case(HTTP_SCHEME) {
        return None;
    }
    let rest = &value[HTTP_SCHEME.len()..];

    let slash = rest.find('/')?;
    let (host, port) = split_authority(&rest[..slash])?;

    let path = &rest[slash..];
    let end = path.find(DOCUMENT_SUFFIX)? + DOCUMENT_SUFFIX.len();

    Some(ReplyLocation {
        host: host.to_string(),
        port,
        resource_path: path[..end].to_string(),
    })
}

fn header_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let (key, value) = line.split_once(':')?;
    if key.trim().eq_ignore_ascii_case(name) {
        Some(value.trim())
    } else {
        None
    }
}

fn split_authority(authority: &str) -> Option<(&str, u16)> {
    let (host, port) = if let Some(bracketed) = authority.strip_prefix('[') {
        let (host, after) = bracketed.split_once(']')?;
        match after {
            "" => (host, None),
            _ => (host, Some(after.strip_prefix(':')?)),
        }
    } else {
        match authority.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (authority, None),
        }
    };

    if host.is_empty() {
        return None;
    }

    let port = match port {
        None => DEFAULT_HTTP_PORT,
        Some(digits) => parse_port(digits)?,
    };

    Some((host, port))
}

fn parse_port(digits: &str) -> Option<u16> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match digits.parse::<u16>() {
        Ok(0) | Err(_) => None,
        Ok(port) => Some(port),
    }
}
