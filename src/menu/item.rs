use serde::{Deserialize, Serialize};
use std::fmt;

use super::submenu::TransportIcon;
use super::volume_control::VolumeControlView;
use crate::audio::{ClockSourceId, DefaultDeviceRole, DeviceId, Direction};

/// What selecting a menu entry (or moving one of its controls) asks for.
/// Every device-scoped action names its device explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuAction {
    SetSampleRate {
        device: DeviceId,
        rate: f64,
    },
    SetClockSource {
        device: DeviceId,
        clock_source: ClockSourceId,
    },
    SetVolume {
        device: DeviceId,
        direction: Direction,
        volume: f32,
    },
    SetMute {
        device: DeviceId,
        direction: Direction,
        muted: bool,
    },
    SetDefaultDevice {
        device: DeviceId,
        role: DefaultDeviceRole,
    },
    SetFeaturedDevice(DeviceId),
    /// Applies only while the named device is still featured
    ClearFeaturedDevice(DeviceId),
    ShowDeviceActions(DeviceId),
    ShowPreferences,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionIcon {
    DefaultOutput,
    SystemOutput,
    DefaultInput,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionItem {
    pub title: String,
    pub enabled: bool,
    pub checked: bool,
    pub action: Option<MenuAction>,
    pub key_equivalent: Option<char>,
    pub icon: Option<ActionIcon>,
}

impl ActionItem {
    pub fn new(title: impl Into<String>, action: MenuAction) -> Self {
        Self {
            title: title.into(),
            enabled: true,
            checked: false,
            action: Some(action),
            key_equivalent: None,
            icon: None,
        }
    }

    /// Disabled entry without an action, e.g. "Unsupported"
    pub fn placeholder(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            enabled: false,
            checked: false,
            action: None,
            key_equivalent: None,
            icon: None,
        }
    }

    /// Shown as the current choice: checked and not selectable
    pub fn current(mut self) -> Self {
        self.enabled = false;
        self.checked = true;
        self
    }

    pub fn with_key(mut self, key: char) -> Self {
        self.key_equivalent = Some(key);
        self
    }

    pub fn with_icon(mut self, icon: ActionIcon) -> Self {
        self.icon = Some(icon);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MenuItem {
    Separator,
    Action(ActionItem),
    Submenu { title: String, items: Vec<MenuItem> },
    /// Slot for the device's retained volume control view
    VolumeControl(Direction),
}

impl MenuItem {
    pub fn submenu(title: impl Into<String>, items: Vec<MenuItem>) -> Self {
        MenuItem::Submenu {
            title: title.into(),
            items,
        }
    }

    pub fn as_action(&self) -> Option<&ActionItem> {
        match self {
            MenuItem::Action(item) => Some(item),
            _ => None,
        }
    }

    pub fn submenu_items(&self) -> Option<&[MenuItem]> {
        match self {
            MenuItem::Submenu { items, .. } => Some(items),
            _ => None,
        }
    }
}

impl From<ActionItem> for MenuItem {
    fn from(item: ActionItem) -> Self {
        MenuItem::Action(item)
    }
}

/// Top-level entry for one registered device
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceMenuItem {
    pub device: DeviceId,
    pub title: String,
    pub detail: Vec<String>,
    pub icon: TransportIcon,
    pub submenu: Vec<MenuItem>,
    pub input_volume: Option<VolumeControlView>,
    pub output_volume: Option<VolumeControlView>,
}

impl DeviceMenuItem {
    pub fn volume_control(&self, direction: Direction) -> Option<&VolumeControlView> {
        match direction {
            Direction::Input => self.input_volume.as_ref(),
            Direction::Output => self.output_volume.as_ref(),
        }
    }

    pub fn volume_control_mut(&mut self, direction: Direction) -> Option<&mut VolumeControlView> {
        match direction {
            Direction::Input => self.input_volume.as_mut(),
            Direction::Output => self.output_volume.as_mut(),
        }
    }

    /// Find a submenu entry (searching nested submenus) by title
    pub fn find_item(&self, title: &str) -> Option<&ActionItem> {
        find_in(&self.submenu, &|item: &ActionItem| item.title == title)
    }

    /// Whether the submenu currently offers `action` as a selectable entry
    pub fn offers(&self, action: &MenuAction) -> bool {
        match action {
            MenuAction::SetVolume { direction, .. } => self
                .volume_control(*direction)
                .is_some_and(|view| view.slider.enabled),
            MenuAction::SetMute { direction, .. } => self
                .volume_control(*direction)
                .is_some_and(|view| view.mute_checkbox.enabled),
            _ => find_in(&self.submenu, &|item: &ActionItem| {
                item.enabled && item.action.as_ref() == Some(action)
            })
            .is_some(),
        }
    }
}

fn find_in<'a>(items: &'a [MenuItem], predicate: &dyn Fn(&ActionItem) -> bool) -> Option<&'a ActionItem> {
    items.iter().find_map(|item| match item {
        MenuItem::Action(action) if predicate(action) => Some(action),
        MenuItem::Submenu { items, .. } => find_in(items, predicate),
        _ => None,
    })
}

/// The status-bar menu: device entries in registry order followed by a
/// fixed footer.
#[derive(Debug, Clone)]
pub struct StatusMenu {
    devices: Vec<DeviceMenuItem>,
    footer: Vec<MenuItem>,
    highlighted: bool,
    update_count: u64,
}

impl StatusMenu {
    pub fn new(app_name: &str) -> Self {
        let footer = vec![
            MenuItem::Separator,
            ActionItem::new("Preferences…", MenuAction::ShowPreferences)
                .with_key(',')
                .into(),
            MenuItem::Separator,
            ActionItem::new(format!("Quit {}", app_name), MenuAction::Quit)
                .with_key('q')
                .into(),
        ];

        Self {
            devices: Vec::new(),
            footer,
            highlighted: false,
            update_count: 0,
        }
    }

    pub fn insert_device(&mut self, position: usize, item: DeviceMenuItem) {
        let position = position.min(self.devices.len());
        self.devices.insert(position, item);
    }

    /// Remove a device entry, located by identifier
    pub fn remove_device(&mut self, device: DeviceId) -> Option<DeviceMenuItem> {
        let position = self.devices.iter().position(|item| item.device == device)?;
        Some(self.devices.remove(position))
    }

    pub fn device_item(&self, device: DeviceId) -> Option<&DeviceMenuItem> {
        self.devices.iter().find(|item| item.device == device)
    }

    pub fn device_item_mut(&mut self, device: DeviceId) -> Option<&mut DeviceMenuItem> {
        self.devices.iter_mut().find(|item| item.device == device)
    }

    pub fn device_items(&self) -> &[DeviceMenuItem] {
        &self.devices
    }

    pub fn device_items_mut(&mut self) -> impl Iterator<Item = &mut DeviceMenuItem> {
        self.devices.iter_mut()
    }

    pub fn device_order(&self) -> Vec<DeviceId> {
        self.devices.iter().map(|item| item.device).collect()
    }

    pub fn footer(&self) -> &[MenuItem] {
        &self.footer
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    /// Recompute the menu layout. Called when a deferred update fires.
    pub fn update(&mut self) {
        self.update_count += 1;
    }

    /// Number of layout recomputes performed so far
    pub fn update_count(&self) -> u64 {
        self.update_count
    }
}

impl fmt::Display for StatusMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.devices {
            writeln!(f, "{} [{}]", item.title, item.icon)?;
            for line in &item.detail {
                writeln!(f, "    {}", line)?;
            }
            write_items(f, item, &item.submenu, 1)?;
        }
        for entry in &self.footer {
            write_item(f, None, entry, 0)?;
        }
        Ok(())
    }
}

fn write_items(
    f: &mut fmt::Formatter<'_>,
    owner: &DeviceMenuItem,
    items: &[MenuItem],
    depth: usize,
) -> fmt::Result {
    for item in items {
        write_item(f, Some(owner), item, depth)?;
    }
    Ok(())
}

fn write_item(
    f: &mut fmt::Formatter<'_>,
    owner: Option<&DeviceMenuItem>,
    item: &MenuItem,
    depth: usize,
) -> fmt::Result {
    let indent = "  ".repeat(depth);
    match item {
        MenuItem::Separator => writeln!(f, "{}------", indent),
        MenuItem::Action(action) => writeln!(
            f,
            "{}{}{}{}",
            indent,
            if action.checked { "✓ " } else { "  " },
            action.title,
            if action.enabled { "" } else { " (disabled)" }
        ),
        MenuItem::Submenu { title, items } => {
            writeln!(f, "{}> {}", indent, title)?;
            match owner {
                Some(owner) => write_items(f, owner, items, depth + 1),
                None => Ok(()),
            }
        }
        MenuItem::VolumeControl(direction) => {
            match owner.and_then(|owner| owner.volume_control(*direction)) {
                Some(view) => writeln!(
                    f,
                    "{}  {} | volume {:.2}{} | mute [{}]{}",
                    indent,
                    if view.label.is_empty() { "Volume" } else { view.label.as_str() },
                    view.slider.value,
                    if view.slider.enabled { "" } else { " (disabled)" },
                    if view.mute_checkbox.checked { "x" } else { " " },
                    if view.mute_checkbox.enabled { "" } else { " (disabled)" }
                ),
                None => Ok(()),
            }
        }
    }
}
