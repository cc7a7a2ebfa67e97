use crate::config::DiscoveryConfig;
use crate::descriptor::parse_descriptor;
use crate::error::Result;
use crate::fetcher::{fetch_descriptor, FetchOptions};
use crate::location::{is_search_reply, matches_service_type, parse_location};
use crate::protocol::SearchRequest;
use crate::receiver::DeviceReceiver;
use crate::registry::DeviceRegistry;
use crate::types::{Device, ReplyLocation};
use socket2::{Domain, Protocol, Socket, Type};
use std::collections::HashSet;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};

/// Largest datagram accepted as a reply
const MAX_DATAGRAM_SIZE: usize = 8192;

const DEVICE_CHANNEL_CAPACITY: usize = 64;

/// Multicast TTL, enough to cross one router
const MULTICAST_TTL: u32 = 2;

/// One SSDP discovery round
///
/// Sends a single `M-SEARCH`, accepts replies until the window closes, and
/// fetches the descriptor of every matching device concurrently.
///
/// # Example
///
/// ```no_run
/// use axis_discover::{Discovery, DiscoveryConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let discovery = Discovery::new(DiscoveryConfig::default());
///     let registry = discovery.run().await?;
///
///     for device in registry.drain() {
///         println!("{}", device);
///     }
///     Ok(())
/// }
/// ```
pub struct Discovery {
    config: DiscoveryConfig,
}

impl Discovery {
    /// Create a new discovery round
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    /// Get the round's configuration
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Send the query and start collecting replies
    ///
    /// Errors here are fatal: the target is malformed or the socket could not
    /// be set up or used to send. Once this returns, problems with individual
    /// devices only mean those devices are missing from the stream.
    pub async fn start(&self) -> Result<DeviceReceiver> {
        let target = self.config.target_addr()?;
        let socket = bind_socket(target)?;

        let request = SearchRequest::new(self.config.service_type.as_str())
            .with_mx(self.config.mx)
            .for_target(target.ip());
        let message = request.to_message();
        socket.send_to(message.as_bytes(), target).await?;

        tracing::info!(
            "Sent M-SEARCH for {} to {} ({} bytes)",
            self.config.service_type,
            target,
            message.len()
        );

        let deadline = Instant::now() + self.config.window;
        let (tx, rx) = mpsc::channel(DEVICE_CHANNEL_CAPACITY);

        let collector = Collector {
            socket,
            service_type: self.config.service_type.clone(),
            fetch: self.config.fetch_options(),
            limit: Arc::new(Semaphore::new(self.config.max_concurrent_fetches.max(1))),
            tx,
        };
        tokio::spawn(collector.run(deadline));

        Ok(DeviceReceiver::new(rx))
    }

    /// Run a complete round and return the sorted inventory
    pub async fn run(&self) -> Result<DeviceRegistry> {
        let devices = self.start().await?;
        let registry = devices.collect().await;

        tracing::info!("Discovery complete, found {} device(s)", registry.len());
        Ok(registry)
    }
}

/// Evaluate one datagram
///
/// Returns the descriptor location of a search reply that names
/// `service_type`, and `None` for anything else.
pub fn evaluate_reply(reply: &str, service_type: &str) -> Option<ReplyLocation> {
    if !is_search_reply(reply) {
        tracing::trace!("Not a search reply");
        return None;
    }
    if !matches_service_type(reply, service_type) {
        tracing::debug!("Reply does not mention {}", service_type);
        return None;
    }

    let location = parse_location(reply);
    if location.is_none() {
        tracing::debug!("Reply has no usable LOCATION header");
    }
    location
}

/// Fetch and parse the descriptor behind a location
///
/// Any failure is logged and turned into `None`.
pub async fn resolve_device(location: &ReplyLocation, options: &FetchOptions) -> Option<Device> {
    let document = match fetch_descriptor(location, options).await {
        Ok(document) => document,
        Err(e) => {
            tracing::debug!("Failed to fetch descriptor {}: {}", location, e);
            return None;
        }
    };

    match parse_descriptor(&String::from_utf8_lossy(&document)) {
        Ok(device) => Some(device),
        Err(e) => {
            tracing::debug!("Failed to parse descriptor {}: {}", location, e);
            None
        }
    }
}

/// Create the UDP socket the query is sent from
///
/// Binds an ephemeral port on the unspecified address of the target's family.
fn bind_socket(target: SocketAddr) -> Result<UdpSocket> {
    let socket = Socket::new(Domain::for_address(target), Type::DGRAM, Some(Protocol::UDP))?;

    let bind_addr: SocketAddr = match target {
        SocketAddr::V4(_) => {
            socket.set_broadcast(true)?;
            if target.ip().is_multicast() {
                socket.set_multicast_ttl_v4(MULTICAST_TTL)?;
            }
            (Ipv4Addr::UNSPECIFIED, 0).into()
        }
        SocketAddr::V6(_) => {
            if target.ip().is_multicast() {
                socket.set_multicast_hops_v6(MULTICAST_TTL)?;
            }
            (Ipv6Addr::UNSPECIFIED, 0).into()
        }
    };
    socket.bind(&bind_addr.into())?;
    socket.set_nonblocking(true)?;

    let socket: std::net::UdpSocket = socket.into();
    let socket = UdpSocket::from_std(socket)?;

    tracing::debug!("SSDP socket bound to {}", socket.local_addr()?);
    Ok(socket)
}

/// Receive side of a round, owned by a spawned task
struct Collector {
    socket: UdpSocket,
    service_type: String,
    fetch: FetchOptions,
    limit: Arc<Semaphore>,
    tx: mpsc::Sender<Device>,
}

impl Collector {
    async fn run(self, deadline: Instant) {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let mut seen = HashSet::new();
        let mut fetches = JoinSet::new();

        loop {
            if self.tx.is_closed() {
                tracing::debug!("Device receiver dropped, ending discovery early");
                break;
            }

            // All waits share one deadline; it is never re-armed per datagram.
            let (len, from) = match timeout_at(deadline, self.socket.recv_from(&mut buf)).await {
                Err(_) => break,
                Ok(Ok(received)) => received,
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::ConnectionReset => continue,
                Ok(Err(e)) => {
                    tracing::warn!("Socket error during discovery: {}", e);
                    break;
                }
            };

            let reply = String::from_utf8_lossy(&buf[..len]);
            tracing::trace!("Datagram from {} ({} bytes): {}", from, len, reply);

            let Some(location) = evaluate_reply(&reply, &self.service_type) else {
                tracing::trace!("Skipping datagram from {}", from);
                continue;
            };

            if !seen.insert(location.clone()) {
                tracing::debug!("Already fetching {}, skipping repeat reply from {}", location, from);
                continue;
            }

            tracing::debug!("Reply from {} points at {}", from, location);

            let limit = self.limit.clone();
            let tx = self.tx.clone();
            let options = self.fetch;
            fetches.spawn(async move {
                let Ok(_permit) = limit.acquire_owned().await else {
                    return;
                };
                if let Some(device) = resolve_device(&location, &options).await {
                    let _ = tx.send(device).await;
                }
            });
        }

        tracing::debug!("Discovery window closed, waiting for {} fetch(es)", fetches.len());
        while fetches.join_next().await.is_some() {}
    }
}
