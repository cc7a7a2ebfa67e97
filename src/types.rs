use serde::{Deserialize, Serialize};
use std::fmt;

/// Hardware serial number as advertised in the descriptor
pub type Serial = String;

/// Identity of one discovered device
///
/// All fields are non-empty. A `Device` is only built from a complete
/// descriptor, see [`crate::parse_descriptor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub serial: Serial,

    /// Model designation (e.g., "M3045-V")
    pub model: String,

    /// Management URL without scheme, port or trailing slash
    #[serde(rename = "presentationUrl")]
    pub presentation_url: String,
}

impl Device {
    /// Ordering key used by the registry
    pub fn sort_key(&self) -> (&str, &str) {
        (&self.model, &self.serial)
    }

    /// Serialize the device as a single-line JSON object
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<15}  {:<15}  {}",
            self.model, self.serial, self.presentation_url
        )
    }
}

/// Descriptor location parsed from one SSDP reply
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReplyLocation {
    /// Dotted quad, hostname, or IPv6 literal without brackets
    pub host: String,
    pub port: u16,

    /// Absolute path ending in `.xml`
    pub resource_path: String,
}

impl ReplyLocation {
    /// `host:port` form suitable for an HTTP `Host` header
    pub fn authority(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for ReplyLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http://{}{}", self.authority(), self.resource_path)
    }
}
