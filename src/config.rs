use crate::error::{DiscoverError, Result};
use crate::fetcher::{FetchOptions, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_DOCUMENT_SIZE};
use crate::protocol::{AXIS_SERVICE_TYPE, DEFAULT_MX, SSDP_MULTICAST_V4, SSDP_PORT};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Default length of the discovery window
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(1);

/// Default number of descriptor fetches allowed to run at once
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// Settings for one discovery round
///
/// # Example
///
/// ```
/// use axis_discover::DiscoveryConfig;
/// use std::time::Duration;
///
/// let config = DiscoveryConfig::default()
///     .with_target("192.168.1.255")
///     .with_window(Duration::from_secs(3));
/// assert_eq!(config.port, 1900);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Multicast, broadcast or unicast address the query is sent to
    pub target: String,

    pub port: u16,

    /// `ST` of the query; replies not mentioning it are dropped
    pub service_type: String,

    /// How long replies are accepted after the query is sent
    pub window: Duration,

    /// Response-wait hint sent in the query, in seconds
    pub mx: u8,

    pub fetch_timeout: Duration,
    pub max_document_size: usize,
    pub max_concurrent_fetches: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            target: SSDP_MULTICAST_V4.to_string(),
            port: SSDP_PORT,
            service_type: AXIS_SERVICE_TYPE.to_string(),
            window: DEFAULT_WINDOW,
            mx: DEFAULT_MX,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

impl DiscoveryConfig {
    /// Set the address the query is sent to
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_service_type(mut self, service_type: impl Into<String>) -> Self {
        self.service_type = service_type.into();
        self
    }

    /// Set the discovery window
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_max_document_size(mut self, size: usize) -> Self {
        self.max_document_size = size;
        self
    }

    /// Set the number of concurrent descriptor fetches (at least one)
    pub fn with_max_concurrent_fetches(mut self, count: usize) -> Self {
        self.max_concurrent_fetches = count.max(1);
        self
    }

    /// Resolve the target into a socket address
    ///
    /// Fails with [`DiscoverError::InvalidTarget`] unless the target is an IP
    /// address literal.
    pub fn target_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .target
            .trim()
            .parse()
            .map_err(|_| DiscoverError::InvalidTarget(self.target.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Limits applied to each descriptor fetch
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: self.fetch_timeout,
            max_document_size: self.max_document_size,
        }
    }
}
