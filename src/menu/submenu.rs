use std::fmt;
use tracing::debug;

use super::item::{ActionIcon, ActionItem, DeviceMenuItem, MenuAction, MenuItem};
use super::volume_control::VolumeControlView;
use crate::audio::{
    DefaultDeviceRole, DefaultDevices, DeviceId, DeviceSnapshot, Direction, TransportType,
    VolumeState, format_sample_rate,
};

pub const INTERNAL_CLOCK: &str = "Internal Clock";
pub const UNSUPPORTED: &str = "Unsupported";
pub const SET_SAMPLE_RATE: &str = "Set sample rate";
pub const SET_CLOCK_SOURCE: &str = "Set clock source";
pub const USE_FOR_SOUND_OUTPUT: &str = "Use this device for sound output";
pub const USE_FOR_SYSTEM_OUTPUT: &str = "Play alerts and sound effects through this device";
pub const USE_FOR_SOUND_INPUT: &str = "Use this device for sound input";
pub const SET_FEATURED: &str = "Set as featured device";
pub const STOP_FEATURED: &str = "Stop being the featured device";
pub const CONFIGURE_ACTIONS: &str = "Configure device actions…";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportIcon {
    Speaker,
    Microphone,
    BuiltIn,
    Aggregate,
    Virtual,
    Pci,
    Usb,
    FireWire,
    Bluetooth,
    Hdmi,
    DisplayPort,
    AirPlay,
    Avb,
    Thunderbolt,
    Unknown,
}

impl TransportIcon {
    pub fn for_device(snapshot: &DeviceSnapshot) -> Self {
        let Some(transport) = snapshot.transport_type else {
            return TransportIcon::Unknown;
        };

        match transport {
            TransportType::BuiltIn => {
                if snapshot.output_channels > 0 && snapshot.input_channels == 0 {
                    TransportIcon::Speaker
                } else if snapshot.input_channels > 0 && snapshot.output_channels == 0 {
                    TransportIcon::Microphone
                } else {
                    TransportIcon::BuiltIn
                }
            }
            TransportType::Aggregate => TransportIcon::Aggregate,
            TransportType::Virtual => TransportIcon::Virtual,
            TransportType::Pci => TransportIcon::Pci,
            TransportType::Usb => TransportIcon::Usb,
            TransportType::FireWire => TransportIcon::FireWire,
            TransportType::Bluetooth | TransportType::BluetoothLe => TransportIcon::Bluetooth,
            TransportType::Hdmi => TransportIcon::Hdmi,
            TransportType::DisplayPort => TransportIcon::DisplayPort,
            TransportType::AirPlay => TransportIcon::AirPlay,
            TransportType::Avb => TransportIcon::Avb,
            TransportType::Thunderbolt => TransportIcon::Thunderbolt,
            TransportType::Unknown => TransportIcon::Unknown,
        }
    }
}

impl fmt::Display for TransportIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportIcon::Speaker => "speaker",
            TransportIcon::Microphone => "microphone",
            TransportIcon::BuiltIn => "built-in",
            TransportIcon::Aggregate => "aggregate",
            TransportIcon::Virtual => "virtual",
            TransportIcon::Pci => "pci",
            TransportIcon::Usb => "usb",
            TransportIcon::FireWire => "firewire",
            TransportIcon::Bluetooth => "bluetooth",
            TransportIcon::Hdmi => "hdmi",
            TransportIcon::DisplayPort => "displayport",
            TransportIcon::AirPlay => "airplay",
            TransportIcon::Avb => "avb",
            TransportIcon::Thunderbolt => "thunderbolt",
            TransportIcon::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Second and third line under the device name
pub fn detail_lines(snapshot: &DeviceSnapshot) -> Vec<String> {
    let sample_rate = snapshot
        .nominal_sample_rate
        .map(format_sample_rate)
        .unwrap_or_else(|| "N/A".to_string());
    let clock_source = snapshot
        .clock_source_name
        .clone()
        .unwrap_or_else(|| INTERNAL_CLOCK.to_string());

    let ins = snapshot.input_channels;
    let outs = snapshot.output_channels;
    let inputs = if ins == 1 {
        format!("{} in", ins)
    } else {
        format!("{} ins", ins)
    };
    let outputs = if outs == 1 {
        format!("{} out", outs)
    } else {
        format!("{} outs", outs)
    };

    vec![
        format!("{} / {}", sample_rate, clock_source),
        format!("{}/ {}", inputs, outputs),
    ]
}

fn sample_rate_items(snapshot: &DeviceSnapshot) -> Vec<MenuItem> {
    if snapshot.nominal_sample_rates.is_empty() {
        return vec![ActionItem::placeholder(UNSUPPORTED).into()];
    }

    snapshot
        .nominal_sample_rates
        .iter()
        .map(|&rate| {
            let item = ActionItem::new(
                format_sample_rate(rate),
                MenuAction::SetSampleRate {
                    device: snapshot.id,
                    rate,
                },
            );
            if snapshot.nominal_sample_rate == Some(rate) {
                item.current().into()
            } else {
                item.into()
            }
        })
        .collect()
}

fn clock_source_items(snapshot: &DeviceSnapshot) -> Vec<MenuItem> {
    let sources = match &snapshot.clock_sources {
        Some(sources) if !sources.is_empty() => sources,
        _ => return vec![ActionItem::placeholder(INTERNAL_CLOCK).into()],
    };

    sources
        .iter()
        .map(|source| {
            let item = ActionItem::new(
                source.name.clone(),
                MenuAction::SetClockSource {
                    device: snapshot.id,
                    clock_source: source.id,
                },
            );
            if snapshot.clock_source_id == Some(source.id) {
                item.current().into()
            } else {
                item.into()
            }
        })
        .collect()
}

fn default_device_item(
    title: &str,
    icon: ActionIcon,
    device: DeviceId,
    role: DefaultDeviceRole,
    defaults: &DefaultDevices,
) -> MenuItem {
    let item = ActionItem::new(title, MenuAction::SetDefaultDevice { device, role }).with_icon(icon);
    if defaults.get(role) == Some(device) {
        item.current().into()
    } else {
        item.into()
    }
}

fn default_device_items(snapshot: &DeviceSnapshot, defaults: &DefaultDevices) -> Vec<MenuItem> {
    if snapshot.output_channels > 0 {
        vec![
            default_device_item(
                USE_FOR_SOUND_OUTPUT,
                ActionIcon::DefaultOutput,
                snapshot.id,
                DefaultDeviceRole::Output,
                defaults,
            ),
            default_device_item(
                USE_FOR_SYSTEM_OUTPUT,
                ActionIcon::SystemOutput,
                snapshot.id,
                DefaultDeviceRole::SystemOutput,
                defaults,
            ),
        ]
    } else if snapshot.input_channels > 0 {
        vec![default_device_item(
            USE_FOR_SOUND_INPUT,
            ActionIcon::DefaultInput,
            snapshot.id,
            DefaultDeviceRole::Input,
            defaults,
        )]
    } else {
        Vec::new()
    }
}

fn featured_device_item(snapshot: &DeviceSnapshot, featured: Option<DeviceId>) -> MenuItem {
    if featured == Some(snapshot.id) {
        ActionItem::new(STOP_FEATURED, MenuAction::ClearFeaturedDevice(snapshot.id)).into()
    } else {
        ActionItem::new(SET_FEATURED, MenuAction::SetFeaturedDevice(snapshot.id)).into()
    }
}

/// Build the submenu entries for a device. Volume controls appear as slots;
/// their views live on the [`DeviceMenuItem`].
pub fn build_submenu(
    snapshot: &DeviceSnapshot,
    defaults: &DefaultDevices,
    featured: Option<DeviceId>,
) -> Vec<MenuItem> {
    let mut items = vec![
        MenuItem::submenu(SET_SAMPLE_RATE, sample_rate_items(snapshot)),
        MenuItem::submenu(SET_CLOCK_SOURCE, clock_source_items(snapshot)),
        MenuItem::Separator,
    ];

    let mut has_volume_control = false;
    for direction in Direction::ALL {
        if snapshot.volume(direction).can_set {
            items.push(MenuItem::VolumeControl(direction));
            has_volume_control = true;
        }
    }
    if has_volume_control {
        items.push(MenuItem::Separator);
    }

    items.push(MenuItem::Separator);
    items.extend(default_device_items(snapshot, defaults));
    items.push(MenuItem::Separator);
    items.push(featured_device_item(snapshot, featured));
    items.push(MenuItem::Separator);
    items.push(ActionItem::new(CONFIGURE_ACTIONS, MenuAction::ShowDeviceActions(snapshot.id)).into());

    items
}

impl DeviceMenuItem {
    pub fn new(snapshot: &DeviceSnapshot, defaults: &DefaultDevices, featured: Option<DeviceId>) -> Self {
        let mut item = Self {
            device: snapshot.id,
            title: String::new(),
            detail: Vec::new(),
            icon: TransportIcon::Unknown,
            submenu: Vec::new(),
            input_volume: None,
            output_volume: None,
        };
        item.rebuild(snapshot, defaults, featured);
        item
    }

    /// Rebuild title, icon and submenu from scratch. Existing volume control
    /// views are kept and reconfigured, then refreshed with live values.
    pub fn rebuild(&mut self, snapshot: &DeviceSnapshot, defaults: &DefaultDevices, featured: Option<DeviceId>) {
        debug!("Rebuilding menu item for {} (#{})", snapshot.name, snapshot.id);

        self.title = snapshot.name.clone();
        self.detail = detail_lines(snapshot);
        self.icon = TransportIcon::for_device(snapshot);
        self.submenu = build_submenu(snapshot, defaults, featured);

        for direction in Direction::ALL {
            let state = snapshot.volume(direction);
            let slot = match direction {
                Direction::Input => &mut self.input_volume,
                Direction::Output => &mut self.output_volume,
            };

            if state.can_set {
                slot.get_or_insert_with(|| VolumeControlView::new(snapshot.id, direction))
                    .configure(state);
            } else {
                *slot = None;
            }
        }

        self.update_master_volume(Direction::Input, &snapshot.input_volume);
        self.update_master_volume(Direction::Output, &snapshot.output_volume);
    }

    /// Refresh one direction's volume control with live values
    pub fn update_master_volume(&mut self, direction: Direction, state: &VolumeState) {
        if let Some(view) = self.volume_control_mut(direction) {
            view.refresh(state);
        }
    }
}
