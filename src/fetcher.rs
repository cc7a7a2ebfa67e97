use crate::error::{DiscoverError, Result};
use crate::protocol::descriptor_request;
use crate::types::ReplyLocation;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Default bound on one descriptor exchange
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Default cap on the size of a descriptor response
pub const DEFAULT_MAX_DOCUMENT_SIZE: usize = 256 * 1024;

/// Limits applied to a descriptor fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Bound on connect, write and read together
    pub timeout: Duration,

    /// Reading stops once this many bytes have arrived
    pub max_document_size: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_FETCH_TIMEOUT,
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
        }
    }
}

/// Retrieve the descriptor document a reply points at
///
/// Sends a bare `GET`, half-closes the connection and reads until the device
/// closes its side or `max_document_size` bytes have been read. The returned
/// bytes are the raw response, headers included.
pub async fn fetch_descriptor(location: &ReplyLocation, options: &FetchOptions) -> Result<Vec<u8>> {
    if location.host.is_empty() {
        return Err(DiscoverError::EmptyRequest("host"));
    }
    if location.resource_path.is_empty() {
        return Err(DiscoverError::EmptyRequest("resource path"));
    }

    match timeout(options.timeout, exchange(location, options.max_document_size)).await {
        Ok(result) => result,
        Err(_) => Err(DiscoverError::Timeout),
    }
}

async fn exchange(location: &ReplyLocation, max_document_size: usize) -> Result<Vec<u8>> {
    tracing::debug!("Fetching descriptor {}", location);

    let mut stream = TcpStream::connect((location.host.as_str(), location.port)).await?;
    stream.set_nodelay(true)?;

    let request = descriptor_request(&location.resource_path, &location.authority());
    stream.write_all(request.as_bytes()).await?;

    // Half-close so devices that wait for end of request start answering.
    stream.shutdown().await?;

    let mut document = Vec::new();
    (&mut stream)
        .take(max_document_size as u64)
        .read_to_end(&mut document)
        .await?;

    if document.len() >= max_document_size {
        tracing::warn!(
            "Descriptor from {} truncated at {} bytes",
            location,
            max_document_size
        );
    }

    Ok(document)
}
