//! Notifications delivered to the status menu.
//!
//! The hardware layer and the preference store push these through listener
//! callbacks; the service forwards them into a single queue that is drained on
//! the task owning the menu, so handlers never run concurrently.

use crate::audio::{DeviceId, Direction};
use crate::status_bar::LayoutType;

/// Changes to the set of devices or to the system default roles
#[derive(Debug, Clone, PartialEq)]
pub enum HardwareEvent {
    DeviceListChanged {
        added: Vec<DeviceId>,
        removed: Vec<DeviceId>,
    },
    DefaultInputDeviceChanged(Option<DeviceId>),
    DefaultOutputDeviceChanged(Option<DeviceId>),
    DefaultSystemOutputDeviceChanged(Option<DeviceId>),
}

/// Property changes on a single device
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    NominalSampleRateDidChange(DeviceId),
    AvailableNominalSampleRatesDidChange(DeviceId),
    ClockSourceDidChange(DeviceId),
    NameDidChange(DeviceId),
    ListDidChange(DeviceId),
    VolumeDidChange {
        device: DeviceId,
        direction: Direction,
    },
    MuteDidChange {
        device: DeviceId,
        direction: Direction,
    },
}

impl DeviceEvent {
    pub fn device(&self) -> DeviceId {
        match self {
            DeviceEvent::NominalSampleRateDidChange(id)
            | DeviceEvent::AvailableNominalSampleRatesDidChange(id)
            | DeviceEvent::ClockSourceDidChange(id)
            | DeviceEvent::NameDidChange(id)
            | DeviceEvent::ListDidChange(id) => *id,
            DeviceEvent::VolumeDidChange { device, .. }
            | DeviceEvent::MuteDidChange { device, .. } => *device,
        }
    }
}

/// Everything the hardware layer can report
#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    Hardware(HardwareEvent),
    Device(DeviceEvent),
}

impl From<HardwareEvent> for AudioEvent {
    fn from(event: HardwareEvent) -> Self {
        AudioEvent::Hardware(event)
    }
}

impl From<DeviceEvent> for AudioEvent {
    fn from(event: DeviceEvent) -> Self {
        AudioEvent::Device(event)
    }
}

/// Observed preference values, pushed on every write
#[derive(Debug, Clone, PartialEq)]
pub enum PreferenceEvent {
    LayoutTypeChanged(LayoutType),
    FeaturedDeviceChanged(Option<DeviceId>),
}

/// Single message type consumed by the menu's event queue
#[derive(Debug, Clone, PartialEq)]
pub enum MenuEvent {
    Audio(AudioEvent),
    Preference(PreferenceEvent),
}

impl From<AudioEvent> for MenuEvent {
    fn from(event: AudioEvent) -> Self {
        MenuEvent::Audio(event)
    }
}

impl From<HardwareEvent> for MenuEvent {
    fn from(event: HardwareEvent) -> Self {
        MenuEvent::Audio(AudioEvent::Hardware(event))
    }
}

impl From<DeviceEvent> for MenuEvent {
    fn from(event: DeviceEvent) -> Self {
        MenuEvent::Audio(AudioEvent::Device(event))
    }
}

impl From<PreferenceEvent> for MenuEvent {
    fn from(event: PreferenceEvent) -> Self {
        MenuEvent::Preference(event)
    }
}
