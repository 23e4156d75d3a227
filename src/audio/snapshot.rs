use super::device::{ClockSourceId, DefaultDeviceRole, DeviceId, Direction, TransportType};
use crate::system::AudioHardwareInterface;

#[derive(Debug, Clone, PartialEq)]
pub struct ClockSource {
    pub id: ClockSourceId,
    pub name: String,
}

/// Virtual master volume state for one direction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeState {
    pub can_set: bool,
    pub volume: Option<f32>,
    pub decibels: Option<f32>,
    pub muted: Option<bool>,
}

impl VolumeState {
    pub fn capture<H: AudioHardwareInterface + ?Sized>(
        hardware: &H,
        device: DeviceId,
        direction: Direction,
    ) -> Self {
        Self {
            can_set: hardware.can_set_virtual_master_volume(device, direction),
            volume: hardware.virtual_master_volume(device, direction),
            decibels: hardware.virtual_master_volume_in_decibels(device, direction),
            muted: hardware.is_muted(device, direction),
        }
    }
}

/// Every property of a device the menu and the status bar display, read in
/// one pass so that building a submenu is a function of plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSnapshot {
    pub id: DeviceId,
    pub name: String,
    pub is_alive: bool,
    pub transport_type: Option<TransportType>,
    pub input_channels: u32,
    pub output_channels: u32,
    pub nominal_sample_rate: Option<f64>,
    pub nominal_sample_rates: Vec<f64>,
    /// `None` when the device exposes no clock source list at all
    pub clock_sources: Option<Vec<ClockSource>>,
    pub clock_source_id: Option<ClockSourceId>,
    pub clock_source_name: Option<String>,
    pub input_volume: VolumeState,
    pub output_volume: VolumeState,
}

impl DeviceSnapshot {
    /// Read the current properties of `device`. Returns `None` when the
    /// hardware layer no longer knows the device.
    pub fn capture<H: AudioHardwareInterface + ?Sized>(hardware: &H, device: DeviceId) -> Option<Self> {
        if !hardware.device_exists(device) {
            return None;
        }

        // Clock sources are queried on the output scope, master element
        let clock_sources = hardware
            .clock_source_ids(device, Direction::Output)
            .map(|ids| {
                ids.into_iter()
                    .filter_map(|id| {
                        hardware
                            .clock_source_name(device, id)
                            .map(|name| ClockSource { id, name })
                    })
                    .collect::<Vec<_>>()
            });
        let clock_source_id = hardware.clock_source_id(device, Direction::Output);
        let clock_source_name = clock_source_id.and_then(|id| hardware.clock_source_name(device, id));

        Some(Self {
            id: device,
            name: hardware.name(device).unwrap_or_default(),
            is_alive: hardware.is_alive(device),
            transport_type: hardware.transport_type(device),
            input_channels: hardware.channels(device, Direction::Input),
            output_channels: hardware.channels(device, Direction::Output),
            nominal_sample_rate: hardware.nominal_sample_rate(device),
            nominal_sample_rates: hardware.nominal_sample_rates(device).unwrap_or_default(),
            clock_sources,
            clock_source_id,
            clock_source_name,
            input_volume: VolumeState::capture(hardware, device, Direction::Input),
            output_volume: VolumeState::capture(hardware, device, Direction::Output),
        })
    }

    pub fn channels(&self, direction: Direction) -> u32 {
        match direction {
            Direction::Input => self.input_channels,
            Direction::Output => self.output_channels,
        }
    }

    pub fn volume(&self, direction: Direction) -> &VolumeState {
        match direction {
            Direction::Input => &self.input_volume,
            Direction::Output => &self.output_volume,
        }
    }
}

/// Devices currently holding each system role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultDevices {
    pub output: Option<DeviceId>,
    pub system_output: Option<DeviceId>,
    pub input: Option<DeviceId>,
}

impl DefaultDevices {
    pub fn capture<H: AudioHardwareInterface + ?Sized>(hardware: &H) -> Self {
        Self {
            output: hardware.default_device(DefaultDeviceRole::Output),
            system_output: hardware.default_device(DefaultDeviceRole::SystemOutput),
            input: hardware.default_device(DefaultDeviceRole::Input),
        }
    }

    pub fn get(&self, role: DefaultDeviceRole) -> Option<DeviceId> {
        match role {
            DefaultDeviceRole::Output => self.output,
            DefaultDeviceRole::SystemOutput => self.system_output,
            DefaultDeviceRole::Input => self.input,
        }
    }
}
