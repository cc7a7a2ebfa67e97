use crate::registry::DeviceRegistry;
use crate::types::Device;
use tokio::sync::mpsc;

/// Devices reported by a running discovery round
///
/// The stream is finite: it ends once the discovery window has closed and
/// every descriptor fetch started within it has finished. Dropping the
/// receiver stops the round early.
pub struct DeviceReceiver {
    rx: mpsc::Receiver<Device>,
}

impl DeviceReceiver {
    /// Create a new device receiver
    pub(crate) fn new(rx: mpsc::Receiver<Device>) -> Self {
        Self { rx }
    }

    /// Receive the next discovered device
    ///
    /// Returns `None` once the round is over.
    pub async fn recv(&mut self) -> Option<Device> {
        self.rx.recv().await
    }

    /// Drain the round into a registry
    pub async fn collect(mut self) -> DeviceRegistry {
        let mut registry = DeviceRegistry::new();

        while let Some(device) = self.recv().await {
            if registry.insert(device.clone()) {
                tracing::info!(
                    "Discovered {} {} at {}",
                    device.model,
                    device.serial,
                    device.presentation_url
                );
            } else {
                tracing::debug!("Ignoring duplicate device {} {}", device.model, device.serial);
            }
        }

        registry
    }
}
