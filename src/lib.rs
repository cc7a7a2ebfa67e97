//! Discovery of Axis network devices over SSDP
//!
//! This library finds Axis devices on the local network and identifies them.
//! A discovery round:
//!
//! - Sends one SSDP `M-SEARCH` for `urn:axis-com:service:BasicService:1`
//! - Accepts replies for a bounded window (one second by default)
//! - Fetches each replying device's descriptor document over TCP
//! - Extracts serial number, model and management URL
//! - Collects the devices into a registry sorted by model, then serial
//!
//! # Quick Start
//!
//! ```no_run
//! use axis_discover::{Discovery, DiscoveryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let discovery = Discovery::new(DiscoveryConfig::default());
//!
//!     for device in discovery.run().await?.drain() {
//!         println!("{} {} {}", device.model, device.serial, device.presentation_url);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Streaming
//!
//! Devices can also be consumed as they are identified instead of waiting for
//! the window to close:
//!
//! ```no_run
//! use axis_discover::{Discovery, DiscoveryConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DiscoveryConfig::default()
//!         .with_target("192.168.1.255")
//!         .with_window(Duration::from_secs(3));
//!
//!     let mut devices = Discovery::new(config).start().await?;
//!     while let Some(device) = devices.recv().await {
//!         println!("Found {}", device);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Discovery**: UDP query, reply window and fetch scheduling
//! - **Location**: reply filtering and `LOCATION` header parsing
//! - **Fetcher**: descriptor retrieval over a raw TCP connection
//! - **Descriptor**: field extraction from descriptor documents
//! - **Registry**: ordered, deduplicated device inventory

mod config;
mod descriptor;
mod discovery;
mod error;
mod fetcher;
mod location;
mod protocol;
mod receiver;
mod registry;
mod types;

// Public exports
pub use config::{DiscoveryConfig, DEFAULT_MAX_CONCURRENT_FETCHES, DEFAULT_WINDOW};
pub use descriptor::{extract_element, normalize_presentation_url, parse_descriptor};
pub use discovery::{evaluate_reply, resolve_device, Discovery};
pub use error::{DiscoverError, Result};
pub use fetcher::{fetch_descriptor, FetchOptions, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_DOCUMENT_SIZE};
pub use location::{is_search_reply, matches_service_type, parse_location};
pub use protocol::{SearchRequest, AXIS_SERVICE_TYPE, SSDP_MULTICAST_V4, SSDP_MULTICAST_V6, SSDP_PORT};
pub use receiver::DeviceReceiver;
pub use registry::DeviceRegistry;
pub use types::{Device, ReplyLocation, Serial};
