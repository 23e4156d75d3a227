use tracing::{debug, warn};

use crate::audio::{AudioDevice, DeviceId};

/// Known devices, kept sorted by display name with no duplicate identifiers.
#[derive(Debug, Default, Clone)]
pub struct DeviceRegistry {
    devices: Vec<AudioDevice>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a device keeping name order. Returns the position it landed at,
    /// or `None` if a device with the same identifier is already registered.
    ///
    /// The device goes right before the first entry whose name is `>=` its
    /// own, so a device whose name equals an existing one lands ahead of it.
    pub fn insert(&mut self, device: AudioDevice) -> Option<usize> {
        if self.contains(device.id) {
            warn!("Device {} is already registered, ignoring insert", device);
            return None;
        }

        let position = self
            .devices
            .iter()
            .position(|existing| device.name <= existing.name)
            .unwrap_or(self.devices.len());

        debug!("Registering {} at position {}", device, position);
        self.devices.insert(position, device);
        Some(position)
    }

    /// Remove a device by identifier. Returns the position it occupied, or
    /// `None` when it was not registered.
    pub fn remove(&mut self, device: DeviceId) -> Option<usize> {
        match self.position(device) {
            Some(position) => {
                let removed = self.devices.remove(position);
                debug!("Unregistered {} from position {}", removed, position);
                Some(position)
            }
            None => {
                warn!("Device #{} is not registered, nothing to remove", device);
                None
            }
        }
    }

    pub fn position(&self, device: DeviceId) -> Option<usize> {
        self.devices.iter().position(|d| d.id == device)
    }

    pub fn contains(&self, device: DeviceId) -> bool {
        self.position(device).is_some()
    }

    pub fn get(&self, device: DeviceId) -> Option<&AudioDevice> {
        self.devices.iter().find(|d| d.id == device)
    }

    pub fn devices(&self) -> &[AudioDevice] {
        &self.devices
    }

    pub fn ids(&self) -> Vec<DeviceId> {
        self.devices.iter().map(|d| d.id).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.devices.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_name_order() {
        let mut registry = DeviceRegistry::new();
        assert_eq!(registry.insert(AudioDevice::new(1, "Zeta")), Some(0));
        assert_eq!(registry.insert(AudioDevice::new(2, "Alpha")), Some(0));
        assert_eq!(registry.insert(AudioDevice::new(3, "Mid")), Some(1));
        assert_eq!(registry.names(), vec!["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn test_ordering_is_case_sensitive() {
        let mut registry = DeviceRegistry::new();
        registry.insert(AudioDevice::new(1, "alpha"));
        registry.insert(AudioDevice::new(2, "Beta"));
        // Uppercase sorts before lowercase
        assert_eq!(registry.names(), vec!["Beta", "alpha"]);
    }

    #[test]
    fn test_equal_names_insert_before_existing() {
        let mut registry = DeviceRegistry::new();
        registry.insert(AudioDevice::new(1, "Speakers"));
        assert_eq!(registry.insert(AudioDevice::new(2, "Speakers")), Some(0));
        assert_eq!(registry.ids(), vec![2, 1]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = DeviceRegistry::new();
        registry.insert(AudioDevice::new(1, "Speakers"));
        assert_eq!(registry.insert(AudioDevice::new(1, "Other")), None);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names(), vec!["Speakers"]);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut registry = DeviceRegistry::new();
        registry.insert(AudioDevice::new(1, "Speakers"));
        assert_eq!(registry.remove(42), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_insert_then_remove_restores_previous_state() {
        let mut registry = DeviceRegistry::new();
        registry.insert(AudioDevice::new(1, "Alpha"));
        registry.insert(AudioDevice::new(2, "Gamma"));
        let before = registry.devices().to_vec();

        registry.insert(AudioDevice::new(3, "Beta"));
        assert_eq!(registry.remove(3), Some(1));
        assert_eq!(registry.devices(), before.as_slice());
    }
}
