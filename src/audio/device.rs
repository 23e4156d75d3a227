use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier assigned to a device by the hardware layer
pub type DeviceId = u32;

/// Identifier of a clock source, scoped to its device
pub type ClockSourceId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Input, Direction::Output];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

/// How a device is attached to the machine. Only used to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportType {
    BuiltIn,
    Aggregate,
    Virtual,
    Pci,
    Usb,
    FireWire,
    Bluetooth,
    BluetoothLe,
    Hdmi,
    DisplayPort,
    AirPlay,
    Avb,
    Thunderbolt,
    Unknown,
}

/// System-wide roles a device can be assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultDeviceRole {
    Output,
    SystemOutput,
    Input,
}

impl fmt::Display for DefaultDeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultDeviceRole::Output => write!(f, "default output"),
            DefaultDeviceRole::SystemOutput => write!(f, "default system output"),
            DefaultDeviceRole::Input => write!(f, "default input"),
        }
    }
}

/// A device as known to the registry: its identifier and the display name
/// it had when it was last (re)inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    pub id: DeviceId,
    pub name: String,
}

impl AudioDevice {
    pub fn new(id: DeviceId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl fmt::Display for AudioDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.name, self.id)
    }
}

/// Format a nominal sample rate in kHz, e.g. `44.1 kHz` or `48 kHz`.
pub fn format_sample_rate(rate: f64) -> String {
    let khz = (rate / 100.0).round() / 10.0;
    if khz.fract() == 0.0 {
        format!("{:.0} kHz", khz)
    } else {
        format!("{:.1} kHz", khz)
    }
}
