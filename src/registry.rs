use crate::types::Device;

/// Devices found during one discovery round, ordered by model then serial
///
/// A `(model, serial)` pair appears at most once; the first device reported
/// with a given pair is kept.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
}

impl DeviceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a device at its sorted position
    ///
    /// Returns `false` and leaves the registry unchanged if a device with the
    /// same model and serial is already present.
    pub fn insert(&mut self, device: Device) -> bool {
        match self
            .devices
            .binary_search_by(|probe| probe.sort_key().cmp(&device.sort_key()))
        {
            Ok(_) => false,
            Err(idx) => {
                self.devices.insert(idx, device);
                true
            }
        }
    }

    /// Whether a device with this model and serial has been inserted
    pub fn contains(&self, model: &str, serial: &str) -> bool {
        self.devices
            .binary_search_by(|probe| probe.sort_key().cmp(&(model, serial)))
            .is_ok()
    }

    /// Get the number of devices
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Iterate over the devices in sorted order
    pub fn iter(&self) -> std::slice::Iter<'_, Device> {
        self.devices.iter()
    }

    /// Consume the registry, yielding devices in sorted order
    pub fn drain(self) -> impl Iterator<Item = Device> {
        self.devices.into_iter()
    }
}

impl Extend<Device> for DeviceRegistry {
    fn extend<I: IntoIterator<Item = Device>>(&mut self, iter: I) {
        for device in iter {
            self.insert(device);
        }
    }
}

impl FromIterator<Device> for DeviceRegistry {
    fn from_iter<I: IntoIterator<Item = Device>>(iter: I) -> Self {
        let mut registry = Self::new();
        registry.extend(iter);
        registry
    }
}
