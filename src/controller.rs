//! Keeps the status menu and the summary view consistent with the hardware
//! layer and the preference store.
//!
//! Every mutation happens through `&mut self`, so the controller is driven by
//! exactly one owner (see [`crate::service::MenuService`]). User actions are
//! forwarded to the hardware layer and never touch the menu directly: the menu
//! changes when the matching notification comes back.

use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::audio::{AudioDevice, DefaultDevices, DeviceId, DeviceSnapshot, Direction, VolumeState};
use crate::config::Config;
use crate::events::{AudioEvent, DeviceEvent, HardwareEvent, MenuEvent, PreferenceEvent};
use crate::menu::{DeviceMenuItem, DeviceRegistry, Debouncer, MenuAction, StatusMenu};
use crate::status_bar::{LayoutType, StatusBar, StatusBarUpdate};
use crate::system::{AudioHardwareInterface, PreferencesInterface};

pub type ResizeListener = Box<dyn FnMut(f64) + Send>;

/// What the host has to do after a user action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Forwarded to the hardware layer or the preference store
    Dispatched,
    /// Dropped: stale device, unavailable entry or failed accessor call
    Ignored,
    ShowPreferences,
    Quit,
}

pub struct StatusMenuController<H: AudioHardwareInterface, P: PreferencesInterface> {
    hardware: H,
    preferences: P,
    registry: DeviceRegistry,
    menu: StatusMenu,
    status_bar: StatusBar,
    menu_update: Debouncer,
    resize_listener: Option<ResizeListener>,
    reported_length: Option<f64>,
}

impl<H: AudioHardwareInterface, P: PreferencesInterface> StatusMenuController<H, P> {
    pub fn new(hardware: H, preferences: P, config: &Config) -> Self {
        Self {
            hardware,
            preferences,
            registry: DeviceRegistry::new(),
            menu: StatusMenu::new(&config.menu.app_name),
            status_bar: StatusBar::new(config.status_bar.padding),
            menu_update: Debouncer::new(config.menu.update_delay()),
            resize_listener: None,
            reported_length: None,
        }
    }

    /// Register the callback receiving the status item's new length
    pub fn on_resize(&mut self, listener: ResizeListener) {
        self.resize_listener = Some(listener);
    }

    /// Insert every device the hardware layer currently reports, then
    /// evaluate the summary view once
    pub fn populate(&mut self) {
        let ids = self.hardware.device_ids();
        info!("Populating status menu with {} devices", ids.len());
        for id in ids {
            self.add_device(id);
        }
        self.update_status_bar();
    }

    pub fn handle_event(&mut self, event: MenuEvent) {
        match event {
            MenuEvent::Audio(AudioEvent::Device(event)) => self.handle_device_event(event),
            MenuEvent::Audio(AudioEvent::Hardware(event)) => self.handle_hardware_event(event),
            MenuEvent::Preference(event) => self.handle_preference_event(event),
        }
    }

    fn handle_device_event(&mut self, event: DeviceEvent) {
        debug!("Device event: {:?}", event);
        let device = event.device();

        match event {
            DeviceEvent::NominalSampleRateDidChange(_) | DeviceEvent::ClockSourceDidChange(_) => {
                self.update_device_menu_item(device);
                if self.is_featured(device) {
                    self.update_status_bar();
                }
            }
            DeviceEvent::AvailableNominalSampleRatesDidChange(_) | DeviceEvent::ListDidChange(_) => {
                self.update_device_menu_item(device);
            }
            DeviceEvent::NameDidChange(_) => {
                // Re-inserting is what re-establishes the order. Both steps run
                // in this one handler, so a deferred recompute never sees the
                // device missing.
                if self.registry.contains(device) {
                    self.remove_device(device);
                    self.add_device(device);
                }
                if self.is_featured(device) {
                    self.update_status_bar();
                }
            }
            DeviceEvent::VolumeDidChange { direction, .. } | DeviceEvent::MuteDidChange { direction, .. } => {
                self.update_master_volume(device, direction);
                if self.is_featured(device) {
                    self.update_status_bar();
                }
            }
        }
    }

    fn handle_hardware_event(&mut self, event: HardwareEvent) {
        debug!("Hardware event: {:?}", event);

        match event {
            HardwareEvent::DeviceListChanged { added, removed } => {
                for device in removed {
                    self.remove_device(device);
                    self.update_status_bar();
                }
                for device in added {
                    self.add_device(device);
                    if self.is_featured(device) {
                        self.update_status_bar();
                    }
                }
            }
            HardwareEvent::DefaultInputDeviceChanged(_)
            | HardwareEvent::DefaultOutputDeviceChanged(_)
            | HardwareEvent::DefaultSystemOutputDeviceChanged(_) => {
                self.update_device_menu_items();
            }
        }
    }

    fn handle_preference_event(&mut self, event: PreferenceEvent) {
        debug!("Preference event: {:?}", event);

        match event {
            PreferenceEvent::LayoutTypeChanged(_) => {
                self.update_status_bar();
            }
            PreferenceEvent::FeaturedDeviceChanged(_) => {
                self.update_status_bar();
                self.update_device_menu_items();
            }
        }
    }

    /// Forward a user action to the hardware layer or the preference store.
    /// Nothing in the menu changes until the resulting notification arrives.
    pub fn handle_action(&mut self, action: MenuAction) -> ActionOutcome {
        debug!("User action: {:?}", action);

        let result = match &action {
            MenuAction::ShowPreferences => return ActionOutcome::ShowPreferences,
            MenuAction::Quit => return ActionOutcome::Quit,
            MenuAction::ShowDeviceActions(device) => {
                debug!("Device actions for #{} are not implemented", device);
                return ActionOutcome::Ignored;
            }
            MenuAction::SetFeaturedDevice(device) => {
                if !self.can_dispatch(*device, &action) {
                    return ActionOutcome::Ignored;
                }
                self.preferences.set_featured_device(Some(*device));
                return ActionOutcome::Dispatched;
            }
            MenuAction::ClearFeaturedDevice(device) => {
                if !self.is_featured(*device) {
                    debug!("Ignoring {:?}: device #{} is not featured", action, device);
                    return ActionOutcome::Ignored;
                }
                if !self.can_dispatch(*device, &action) {
                    return ActionOutcome::Ignored;
                }
                self.preferences.set_featured_device(None);
                return ActionOutcome::Dispatched;
            }
            MenuAction::SetSampleRate { device, rate } => {
                if !self.can_dispatch(*device, &action) {
                    return ActionOutcome::Ignored;
                }
                self.hardware.set_nominal_sample_rate(*device, *rate)
            }
            MenuAction::SetClockSource {
                device,
                clock_source,
            } => {
                if !self.can_dispatch(*device, &action) {
                    return ActionOutcome::Ignored;
                }
                self.hardware
                    .set_clock_source_id(*device, *clock_source, Direction::Output)
            }
            MenuAction::SetVolume {
                device,
                direction,
                volume,
            } => {
                if !self.can_dispatch(*device, &action) {
                    return ActionOutcome::Ignored;
                }
                self.hardware
                    .set_virtual_master_volume(*device, *volume, *direction)
            }
            MenuAction::SetMute {
                device,
                direction,
                muted,
            } => {
                if !self.can_dispatch(*device, &action) {
                    return ActionOutcome::Ignored;
                }
                self.hardware.set_mute(*device, *muted, *direction)
            }
            MenuAction::SetDefaultDevice { device, role } => {
                if !self.can_dispatch(*device, &action) {
                    return ActionOutcome::Ignored;
                }
                self.hardware.set_default_device(*device, *role)
            }
        };

        match result {
            Ok(()) => ActionOutcome::Dispatched,
            Err(e) => {
                error!("Failed to apply {:?}: {:#}", action, e);
                ActionOutcome::Ignored
            }
        }
    }

    /// Drag a device's volume slider to `value` and dispatch the result
    pub fn slide_volume(&mut self, device: DeviceId, direction: Direction, value: f32) -> ActionOutcome {
        let action = self
            .menu
            .device_item_mut(device)
            .and_then(|item| item.volume_control_mut(direction))
            .and_then(|view| view.slide_to(value));
        match action {
            Some(action) => self.handle_action(action),
            None => ActionOutcome::Ignored,
        }
    }

    /// Click a device's mute checkbox and dispatch the result
    pub fn toggle_mute(&mut self, device: DeviceId, direction: Direction) -> ActionOutcome {
        let action = self
            .menu
            .device_item_mut(device)
            .and_then(|item| item.volume_control_mut(direction))
            .and_then(|view| view.toggle_mute());
        match action {
            Some(action) => self.handle_action(action),
            None => ActionOutcome::Ignored,
        }
    }

    /// The device is still registered, still known to the hardware layer, and
    /// its submenu currently offers the action
    fn can_dispatch(&self, device: DeviceId, action: &MenuAction) -> bool {
        let Some(item) = self.menu.device_item(device) else {
            debug!("Ignoring {:?}: device #{} is not in the menu", action, device);
            return false;
        };
        if !self.hardware.device_exists(device) {
            debug!("Ignoring {:?}: device #{} no longer exists", action, device);
            return false;
        }
        if !item.offers(action) {
            debug!("Ignoring {:?}: not offered by the menu", action);
            return false;
        }
        true
    }

    /// Register a device and insert its menu entry at the sorted position
    pub fn add_device(&mut self, device: DeviceId) {
        let Some(snapshot) = DeviceSnapshot::capture(&self.hardware, device) else {
            warn!("Cannot add device #{}: unknown to the hardware layer", device);
            return;
        };
        debug!("Adding {} (#{}) to menu", snapshot.name, device);

        let Some(position) = self
            .registry
            .insert(AudioDevice::new(device, snapshot.name.clone()))
        else {
            return;
        };

        let defaults = DefaultDevices::capture(&self.hardware);
        let item = DeviceMenuItem::new(&snapshot, &defaults, self.preferences.featured_device());
        self.menu.insert_device(position, item);

        if self.menu_update.schedule(Instant::now()) {
            debug!("Menu update scheduled in {:?}", self.menu_update.delay());
        }
    }

    /// Remove a device and its menu entry, both located by identifier
    pub fn remove_device(&mut self, device: DeviceId) {
        debug!("Removing #{} from menu", device);
        if self.registry.remove(device).is_some() {
            self.menu.remove_device(device);
        }
    }

    /// Rebuild one device's entry from a fresh snapshot
    pub fn update_device_menu_item(&mut self, device: DeviceId) {
        if !self.registry.contains(device) {
            debug!("No menu item for #{}", device);
            return;
        }
        let Some(snapshot) = DeviceSnapshot::capture(&self.hardware, device) else {
            debug!("Device #{} vanished before its menu item was rebuilt", device);
            return;
        };
        let defaults = DefaultDevices::capture(&self.hardware);
        let featured = self.preferences.featured_device();

        if let Some(item) = self.menu.device_item_mut(device) {
            item.rebuild(&snapshot, &defaults, featured);
        }
    }

    pub fn update_device_menu_items(&mut self) {
        for device in self.registry.ids() {
            self.update_device_menu_item(device);
        }
    }

    /// Refresh one direction's volume control without rebuilding the submenu
    pub fn update_master_volume(&mut self, device: DeviceId, direction: Direction) {
        let Some(item) = self.menu.device_item_mut(device) else {
            return;
        };
        if !self.hardware.device_exists(device) {
            return;
        }
        let state = VolumeState::capture(&self.hardware, device, direction);
        item.update_master_volume(direction, &state);
    }

    /// Evaluate the summary view selector against the current preferences
    pub fn update_status_bar(&mut self) -> StatusBarUpdate {
        let featured = self
            .preferences
            .featured_device()
            .and_then(|device| DeviceSnapshot::capture(&self.hardware, device));
        let update = self
            .status_bar
            .update(self.preferences.layout_type(), featured.as_ref());

        match update.length {
            Some(length) => self.report_length(length),
            // Hidden behind the app icon, so the next visible width is reported again
            None if update.layout == LayoutType::None => self.reported_length = None,
            None => {}
        }
        update
    }

    fn report_length(&mut self, length: f64) {
        if self.reported_length == Some(length) {
            return;
        }
        debug!("Status item length is now {}", length);
        self.reported_length = Some(length);
        if let Some(listener) = self.resize_listener.as_mut() {
            listener(length);
        }
    }

    pub fn menu_will_open(&mut self) {
        self.menu.set_highlighted(true);
        self.status_bar.set_highlighted(true);
    }

    pub fn menu_did_close(&mut self) {
        self.menu.set_highlighted(false);
        self.status_bar.set_highlighted(false);
    }

    pub fn status_item_button_pressed(&mut self, enabled: bool) {
        self.status_bar.set_enabled(enabled);
    }

    /// Run the deferred menu recompute if it is due. Returns `true` if it ran.
    pub fn flush_menu_update(&mut self, now: Instant) -> bool {
        if !self.menu_update.poll(now) {
            return false;
        }
        debug!("Recomputing menu layout");
        self.menu.update();
        true
    }

    /// Deadline of the pending menu recompute, if any
    pub fn pending_menu_update(&self) -> Option<Instant> {
        self.menu_update.deadline()
    }

    pub fn set_update_delay(&mut self, delay: Duration) {
        self.menu_update.set_delay(delay);
    }

    /// Change the status item padding and report the resulting length
    pub fn set_padding(&mut self, padding: f64) {
        self.status_bar.set_padding(padding);
        if let Some(length) = self.status_bar.relayout() {
            self.report_length(length);
        }
    }

    fn is_featured(&self, device: DeviceId) -> bool {
        self.preferences.featured_device() == Some(device)
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn menu(&self) -> &StatusMenu {
        &self.menu
    }

    pub fn status_bar(&self) -> &StatusBar {
        &self.status_bar
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn preferences(&self) -> &P {
        &self.preferences
    }

    /// Last length reported to the resize listener
    pub fn reported_length(&self) -> Option<f64> {
        self.reported_length
    }

    /// Text rendering of the status item followed by its menu
    pub fn render(&self) -> String {
        format!("{}\n{}", self.status_bar, self.menu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::{DeviceSpec, InMemoryPreferences, SimulatedAudioHardware, VolumeSpec};

    fn device(id: DeviceId, name: &str) -> DeviceSpec {
        DeviceSpec {
            output_channels: 2,
            sample_rate: Some(48_000.0),
            sample_rates: vec![44_100.0, 48_000.0],
            output_volume: Some(VolumeSpec::new(1.0)),
            ..DeviceSpec::new(id, name)
        }
    }

    fn controller(
        devices: Vec<DeviceSpec>,
    ) -> StatusMenuController<SimulatedAudioHardware, InMemoryPreferences> {
        let mut controller = StatusMenuController::new(
            SimulatedAudioHardware::with_devices(devices),
            InMemoryPreferences::new(LayoutType::SampleRate, None),
            &Config::default(),
        );
        controller.populate();
        controller
    }

    #[test]
    fn test_populate_sorts_devices() {
        let controller = controller(vec![device(1, "Zeta"), device(2, "Alpha")]);
        assert_eq!(controller.registry().names(), vec!["Alpha", "Zeta"]);
        assert_eq!(controller.menu().device_order(), vec![2, 1]);
    }

    #[test]
    fn test_add_schedules_one_menu_update() {
        let mut controller = controller(vec![device(1, "Zeta"), device(2, "Alpha")]);
        let deadline = controller.pending_menu_update().unwrap();

        assert!(!controller.flush_menu_update(deadline - Duration::from_millis(1)));
        assert!(controller.flush_menu_update(deadline));
        assert_eq!(controller.menu().update_count(), 1);
        assert!(controller.pending_menu_update().is_none());
    }

    #[test]
    fn test_actions_do_not_change_the_menu() {
        let mut controller = controller(vec![device(1, "Speakers")]);
        let before = controller.menu().device_item(1).unwrap().clone();

        let outcome = controller.handle_action(MenuAction::SetSampleRate {
            device: 1,
            rate: 44_100.0,
        });

        assert_eq!(outcome, ActionOutcome::Dispatched);
        assert_eq!(controller.hardware().nominal_sample_rate(1), Some(44_100.0));
        assert_eq!(controller.menu().device_item(1).unwrap(), &before);
    }

    #[test]
    fn test_current_choice_is_not_dispatched() {
        let mut controller = controller(vec![device(1, "Speakers")]);
        let outcome = controller.handle_action(MenuAction::SetSampleRate {
            device: 1,
            rate: 48_000.0,
        });
        assert_eq!(outcome, ActionOutcome::Ignored);
        assert!(controller.hardware().calls().is_empty());
    }

    #[test]
    fn test_footer_actions_go_to_the_host() {
        let mut controller = controller(Vec::new());
        assert_eq!(
            controller.handle_action(MenuAction::ShowPreferences),
            ActionOutcome::ShowPreferences
        );
        assert_eq!(controller.handle_action(MenuAction::Quit), ActionOutcome::Quit);
    }

    #[test]
    fn test_menu_highlight_follows_menu_tracking() {
        let mut controller = controller(vec![device(1, "Speakers")]);
        controller.preferences().set_featured_device(Some(1));
        controller.handle_event(PreferenceEvent::FeaturedDeviceChanged(Some(1)).into());

        controller.menu_will_open();
        assert!(controller.menu().is_highlighted());
        assert!(controller.status_bar().subview().unwrap().is_highlighted());

        controller.menu_did_close();
        assert!(!controller.status_bar().subview().unwrap().is_highlighted());
    }

    #[test]
    fn test_view_rebuilt_while_menu_open_stays_highlighted() {
        let mut controller = controller(vec![device(1, "Speakers")]);
        controller.menu_will_open();

        controller.preferences().set_featured_device(Some(1));
        controller.handle_event(PreferenceEvent::FeaturedDeviceChanged(Some(1)).into());
        assert!(controller.status_bar().subview().unwrap().is_highlighted());

        controller.preferences().set_layout_type(LayoutType::MasterVolumePercent);
        controller.handle_event(PreferenceEvent::LayoutTypeChanged(LayoutType::MasterVolumePercent).into());
        assert!(controller.status_bar().subview().unwrap().is_highlighted());

        controller.menu_did_close();
        controller.preferences().set_layout_type(LayoutType::SampleRate);
        controller.handle_event(PreferenceEvent::LayoutTypeChanged(LayoutType::SampleRate).into());
        assert!(!controller.status_bar().subview().unwrap().is_highlighted());
    }
}
