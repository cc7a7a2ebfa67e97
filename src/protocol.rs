use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// SSDP multicast group for IPv4
pub const SSDP_MULTICAST_V4: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);

/// SSDP link-local multicast group for IPv6
pub const SSDP_MULTICAST_V6: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 0xc);

/// SSDP port
pub const SSDP_PORT: u16 = 1900;

/// Service type advertised by Axis devices
pub const AXIS_SERVICE_TYPE: &str = "urn:axis-com:service:BasicService:1";

/// Default response-wait hint, in seconds
pub const DEFAULT_MX: u8 = 2;

/// `M-SEARCH` discovery request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub service_type: String,
    pub mx: u8,
    pub ipv6: bool,
}

impl SearchRequest {
    /// Create a new request for the given service type
    pub fn new(service_type: impl Into<String>) -> Self {
        Self {
            service_type: service_type.into(),
            mx: DEFAULT_MX,
            ipv6: false,
        }
    }

    /// Set the response-wait hint (at least 1 second)
    pub fn with_mx(mut self, mx: u8) -> Self {
        self.mx = mx.max(1);
        self
    }

    /// Name the IPv6 multicast group in the `HOST` header when the target is IPv6
    pub fn for_target(mut self, target: IpAddr) -> Self {
        self.ipv6 = target.is_ipv6();
        self
    }

    /// `HOST` header value
    ///
    /// Always the multicast group, even when the request is sent to a
    /// broadcast or unicast address.
    pub fn host(&self) -> String {
        if self.ipv6 {
            format!("[{}]:{}", SSDP_MULTICAST_V6, SSDP_PORT)
        } else {
            format!("{}:{}", SSDP_MULTICAST_V4, SSDP_PORT)
        }
    }

    /// Wire form of the request
    pub fn to_message(&self) -> String {
        format!(
            "M-SEARCH * HTTP/1.1\r\n\
             HOST: {}\r\n\
             MAN: \"ssdp:discover\"\r\n\
             MX: {}\r\n\
             ST: {}\r\n\
             \r\n",
            self.host(),
            self.mx,
            self.service_type
        )
    }
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self::new(AXIS_SERVICE_TYPE)
    }
}

/// Minimal `GET` request for a descriptor document
pub fn descriptor_request(resource_path: &str, authority: &str) -> String {
    format!(
        "GET {} HTTP/1.1\r\n\
         Host: {}\r\n\
         Connection: close\r\n\
         \r\n",
        resource_path, authority
    )
}
