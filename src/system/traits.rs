use anyhow::Result;
use std::path::Path;

use crate::audio::{ClockSourceId, DefaultDeviceRole, DeviceId, Direction, TransportType};
use crate::events::{AudioEvent, PreferenceEvent};
use crate::status_bar::LayoutType;

/// Handle returned when registering a listener, used to unregister it again
pub type ListenerId = u64;

pub type AudioEventCallback = Box<dyn Fn(AudioEvent) + Send + Sync>;
pub type PreferenceEventCallback = Box<dyn Fn(PreferenceEvent) + Send + Sync>;

/// Trait for the audio hardware layer - every device property the menu reads
/// or writes goes through here.
///
/// Setters only request a change. Their effect becomes visible to the menu
/// when the matching notification arrives through a registered listener.
pub trait AudioHardwareInterface {
    /// Identifiers of every device currently present
    fn device_ids(&self) -> Vec<DeviceId>;

    /// Whether a device with this identifier is known to the hardware layer
    fn device_exists(&self, device: DeviceId) -> bool;

    fn name(&self, device: DeviceId) -> Option<String>;

    fn is_alive(&self, device: DeviceId) -> bool;

    fn transport_type(&self, device: DeviceId) -> Option<TransportType>;

    /// Number of channels the device exposes in a direction
    fn channels(&self, device: DeviceId, direction: Direction) -> u32;

    fn nominal_sample_rate(&self, device: DeviceId) -> Option<f64>;

    fn nominal_sample_rates(&self, device: DeviceId) -> Option<Vec<f64>>;

    fn set_nominal_sample_rate(&self, device: DeviceId, rate: f64) -> Result<()>;

    fn clock_source_ids(&self, device: DeviceId, direction: Direction) -> Option<Vec<ClockSourceId>>;

    fn clock_source_id(&self, device: DeviceId, direction: Direction) -> Option<ClockSourceId>;

    /// Human-readable name of one of the device's clock sources
    fn clock_source_name(&self, device: DeviceId, clock_source: ClockSourceId) -> Option<String>;

    fn set_clock_source_id(
        &self,
        device: DeviceId,
        clock_source: ClockSourceId,
        direction: Direction,
    ) -> Result<()>;

    fn can_set_virtual_master_volume(&self, device: DeviceId, direction: Direction) -> bool;

    /// Linear virtual master volume in 0.0..=1.0
    fn virtual_master_volume(&self, device: DeviceId, direction: Direction) -> Option<f32>;

    fn virtual_master_volume_in_decibels(&self, device: DeviceId, direction: Direction) -> Option<f32>;

    fn set_virtual_master_volume(&self, device: DeviceId, volume: f32, direction: Direction) -> Result<()>;

    fn is_muted(&self, device: DeviceId, direction: Direction) -> Option<bool>;

    fn set_mute(&self, device: DeviceId, muted: bool, direction: Direction) -> Result<()>;

    /// Device currently assigned to a system role
    fn default_device(&self, role: DefaultDeviceRole) -> Option<DeviceId>;

    fn set_default_device(&self, device: DeviceId, role: DefaultDeviceRole) -> Result<()>;

    /// Register a callback for hardware and device notifications
    fn add_event_listener(&self, callback: AudioEventCallback) -> ListenerId;

    fn remove_event_listener(&self, listener: ListenerId);
}

/// Trait for the user preference store observed by the menu
pub trait PreferencesInterface {
    fn layout_type(&self) -> LayoutType;

    fn featured_device(&self) -> Option<DeviceId>;

    /// Only written in response to a user action
    fn set_featured_device(&self, device: Option<DeviceId>);

    fn add_preference_listener(&self, callback: PreferenceEventCallback) -> ListenerId;

    fn remove_preference_listener(&self, listener: ListenerId);
}

/// Trait for file system operations - abstracts std::fs for testability
pub trait FileSystemInterface {
    /// Read the entire contents of a configuration file
    fn read_config_file(&self, path: &Path) -> Result<String>;

    /// Write configuration content to a file
    fn write_config_file(&self, path: &Path, content: &str) -> Result<()>;

    /// Check if a configuration file exists
    fn config_file_exists(&self, path: &Path) -> bool;

    /// Create the directory structure for config files
    fn create_config_dir(&self, path: &Path) -> Result<()>;

    /// Get the last modified time of a config file (for watching changes)
    fn get_config_modified_time(&self, path: &Path) -> Result<std::time::SystemTime>;
}
