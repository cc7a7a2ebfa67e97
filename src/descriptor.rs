//! Field extraction from device descriptor documents
//!
//! Descriptors are XML, but only three fixed elements are of interest, so
//! extraction is a tolerant tag search rather than a full parse. Anything
//! outside those elements (HTTP headers in front of the body, namespaces,
//! unrelated markup) is ignored.

use crate::error::{DiscoverError, Result};
use crate::types::Device;

const SERIAL_TAG: &str = "serialNumber";
const MODEL_TAG: &str = "modelNumber";
const PRESENTATION_URL_TAG: &str = "presentationURL";

/// Build a [`Device`] from a descriptor document
///
/// Fails with [`DiscoverError::MissingElement`] when any of `serialNumber`,
/// `modelNumber` or `presentationURL` is absent or empty, and with
/// [`DiscoverError::InvalidPresentationUrl`] when the URL has nothing left
/// after normalization. There is no partially filled device.
pub fn parse_descriptor(text: &str) -> Result<Device> {
    let serial = required_element(text, SERIAL_TAG)?;
    let model = required_element(text, MODEL_TAG)?;
    let raw_url = required_element(text, PRESENTATION_URL_TAG)?;

    let presentation_url = normalize_presentation_url(raw_url);
    if presentation_url.is_empty() {
        return Err(DiscoverError::InvalidPresentationUrl(raw_url.to_string()));
    }

    Ok(Device {
        serial: serial.to_string(),
        model: model.to_string(),
        presentation_url,
    })
}

/// Text strictly between `<tag>` and the next `</tag>` after it
///
/// Returns `None` if either tag is missing.
pub fn extract_element<'a>(text: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);

    let start = text.find(&open)? + open.len();
    let len = text[start..].find(&close)?;

    Some(&text[start..start + len])
}

fn required_element<'a>(text: &'a str, tag: &'static str) -> Result<&'a str> {
    match extract_element(text, tag) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(DiscoverError::MissingElement(tag)),
    }
}

/// Reduce a presentation URL to `host[/path]`
///
/// Strips surrounding whitespace, `scheme://` prefixes, trailing slashes and
/// `:port` suffixes on the host part, repeating until nothing changes.
/// Normalizing twice gives the same result.
pub fn normalize_presentation_url(url: &str) -> String {
    let mut current = url.to_string();
    loop {
        let next = strip_once(&current);
        // Every step only removes text, so this terminates.
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_once(url: &str) -> String {
    let url = url.trim();

    // Only a scheme in front of the first path separator counts.
    let rest = match url.find("://") {
        Some(idx) if !url[..idx].contains('/') => &url[idx + 3..],
        _ => url,
    };

    let rest = rest.trim_end_matches('/').trim_end();

    let (authority, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };

    let host = match authority.rfind(':') {
        Some(idx) if is_port(&authority[idx + 1..]) => &authority[..idx],
        _ => authority,
    };

    format!("{}{}", host, path)
}

fn is_port(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
