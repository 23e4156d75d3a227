use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

use crate::audio::{ClockSourceId, DefaultDeviceRole, DeviceId, Direction, TransportType};
use crate::events::{AudioEvent, DeviceEvent, HardwareEvent};
use crate::system::traits::{AudioEventCallback, AudioHardwareInterface, ListenerId};

const SILENCE_DB: f32 = -96.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockSourceSpec {
    pub id: ClockSourceId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeSpec {
    /// Whether the virtual master volume can be set in this direction
    #[serde(default = "default_true")]
    pub settable: bool,
    /// Linear volume; `None` when it cannot be read
    #[serde(default)]
    pub volume: Option<f32>,
    #[serde(default)]
    pub muted: bool,
}

impl VolumeSpec {
    pub fn new(volume: f32) -> Self {
        Self {
            settable: true,
            volume: Some(volume),
            muted: false,
        }
    }

    fn decibels(&self) -> Option<f32> {
        self.volume.map(|volume| {
            if volume <= 0.0 {
                SILENCE_DB
            } else {
                (20.0 * volume.log10()).max(SILENCE_DB)
            }
        })
    }
}

/// Description of a simulated device, as written in scenario files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSpec {
    pub id: DeviceId,
    pub name: String,
    #[serde(default)]
    pub transport: Option<TransportType>,
    #[serde(default)]
    pub input_channels: u32,
    #[serde(default)]
    pub output_channels: u32,
    #[serde(default)]
    pub sample_rate: Option<f64>,
    #[serde(default)]
    pub sample_rates: Vec<f64>,
    #[serde(default)]
    pub clock_sources: Option<Vec<ClockSourceSpec>>,
    #[serde(default)]
    pub clock_source: Option<ClockSourceId>,
    #[serde(default)]
    pub input_volume: Option<VolumeSpec>,
    #[serde(default)]
    pub output_volume: Option<VolumeSpec>,
    #[serde(default = "default_true")]
    pub alive: bool,
}

fn default_true() -> bool {
    true
}

impl DeviceSpec {
    pub fn new(id: DeviceId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            transport: None,
            input_channels: 0,
            output_channels: 0,
            sample_rate: None,
            sample_rates: Vec::new(),
            clock_sources: None,
            clock_source: None,
            input_volume: None,
            output_volume: None,
            alive: true,
        }
    }

    fn volume(&self, direction: Direction) -> Option<&VolumeSpec> {
        match direction {
            Direction::Input => self.input_volume.as_ref(),
            Direction::Output => self.output_volume.as_ref(),
        }
    }

    fn volume_mut(&mut self, direction: Direction) -> Option<&mut VolumeSpec> {
        match direction {
            Direction::Input => self.input_volume.as_mut(),
            Direction::Output => self.output_volume.as_mut(),
        }
    }
}

/// Accessor calls made against the simulated hardware
#[derive(Debug, Clone, PartialEq)]
pub enum HardwareCall {
    SetNominalSampleRate {
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
}

type SharedCallback = Arc<dyn Fn(AudioEvent) + Send + Sync>;

#[derive(Default)]
struct SimulatedState {
    devices: BTreeMap<DeviceId, DeviceSpec>,
    defaults: HashMap<DefaultDeviceRole, DeviceId>,
    listeners: Vec<(ListenerId, SharedCallback)>,
    next_listener: ListenerId,
    calls: Vec<HardwareCall>,
    fail_setters: bool,
}

/// In-memory audio hardware layer.
///
/// Setters change the stored state and then notify listeners, the same way
/// the real hardware layer reports a change some time after it was asked
/// for. Cloning shares the underlying state.
#[derive(Clone, Default)]
pub struct SimulatedAudioHardware {
    state: Arc<Mutex<SimulatedState>>,
}

impl SimulatedAudioHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_devices(devices: impl IntoIterator<Item = DeviceSpec>) -> Self {
        let hardware = Self::new();
        {
            let mut state = hardware.state();
            for device in devices {
                state.devices.insert(device.id, device);
            }
        }
        hardware
    }

    fn state(&self) -> MutexGuard<'_, SimulatedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, events: Vec<AudioEvent>) {
        if events.is_empty() {
            return;
        }
        let listeners: Vec<SharedCallback> = self
            .state()
            .listeners
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();

        for event in events {
            debug!("Simulated hardware emits {:?}", event);
            for listener in &listeners {
                listener(event.clone());
            }
        }
    }

    /// Plug in a device
    pub fn add_device(&self, device: DeviceSpec) {
        let id = device.id;
        info!("Simulated device added: {} (#{})", device.name, id);
        self.state().devices.insert(id, device);
        self.emit(vec![
            HardwareEvent::DeviceListChanged {
                added: vec![id],
                removed: Vec::new(),
            }
            .into(),
        ]);
    }

    /// Unplug a device. Roles it held are cleared.
    pub fn remove_device(&self, device: DeviceId) -> bool {
        let mut events = Vec::new();
        {
            let mut state = self.state();
            if state.devices.remove(&device).is_none() {
                return false;
            }
            events.push(
                HardwareEvent::DeviceListChanged {
                    added: Vec::new(),
                    removed: vec![device],
                }
                .into(),
            );

            let held: Vec<DefaultDeviceRole> = state
                .defaults
                .iter()
                .filter(|(_, holder)| **holder == device)
                .map(|(role, _)| *role)
                .collect();
            for role in held {
                state.defaults.remove(&role);
                events.push(default_changed(role, None));
            }
        }
        info!("Simulated device removed: #{}", device);
        self.emit(events);
        true
    }

    pub fn rename_device(&self, device: DeviceId, name: impl Into<String>) -> bool {
        let renamed = match self.state().devices.get_mut(&device) {
            Some(spec) => {
                spec.name = name.into();
                true
            }
            None => false,
        };
        if renamed {
            self.emit(vec![DeviceEvent::NameDidChange(device).into()]);
        }
        renamed
    }

    /// Liveness has no notification of its own
    pub fn set_alive(&self, device: DeviceId, alive: bool) {
        if let Some(spec) = self.state().devices.get_mut(&device) {
            spec.alive = alive;
        }
    }

    pub fn set_available_sample_rates(&self, device: DeviceId, rates: Vec<f64>) {
        let changed = match self.state().devices.get_mut(&device) {
            Some(spec) => {
                spec.sample_rates = rates;
                true
            }
            None => false,
        };
        if changed {
            self.emit(vec![DeviceEvent::AvailableNominalSampleRatesDidChange(device).into()]);
        }
    }

    /// Assign a role without recording an accessor call, as another
    /// application would
    pub fn assign_default(&self, role: DefaultDeviceRole, device: Option<DeviceId>) {
        {
            let mut state = self.state();
            match device {
                Some(id) => state.defaults.insert(role, id),
                None => state.defaults.remove(&role),
            };
        }
        self.emit(vec![default_changed(role, device)]);
    }

    /// Make every setter fail
    pub fn set_setter_failure(&self, should_fail: bool) {
        self.state().fail_setters = should_fail;
    }

    pub fn calls(&self) -> Vec<HardwareCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.state().listeners.len()
    }

    pub fn device_spec(&self, device: DeviceId) -> Option<DeviceSpec> {
        self.state().devices.get(&device).cloned()
    }

    /// Record a setter call and apply `change` to the device when allowed.
    /// `change` returns the events to emit.
    fn apply(
        &self,
        call: HardwareCall,
        device: DeviceId,
        change: impl FnOnce(&mut DeviceSpec) -> Result<Vec<AudioEvent>>,
    ) -> Result<()> {
        let events = {
            let mut state = self.state();
            state.calls.push(call);
            if state.fail_setters {
                return Err(anyhow!("Simulated setter failure"));
            }
            let spec = state
                .devices
                .get_mut(&device)
                .ok_or_else(|| anyhow!("Device #{} not found", device))?;
            change(spec)?
        };
        self.emit(events);
        Ok(())
    }

    fn read<T>(&self, device: DeviceId, read: impl FnOnce(&DeviceSpec) -> T) -> Option<T> {
        self.state().devices.get(&device).map(read)
    }
}

fn default_changed(role: DefaultDeviceRole, device: Option<DeviceId>) -> AudioEvent {
    match role {
        DefaultDeviceRole::Output => HardwareEvent::DefaultOutputDeviceChanged(device),
        DefaultDeviceRole::SystemOutput => HardwareEvent::DefaultSystemOutputDeviceChanged(device),
        DefaultDeviceRole::Input => HardwareEvent::DefaultInputDeviceChanged(device),
    }
    .into()
}

impl AudioHardwareInterface for SimulatedAudioHardware {
    fn device_ids(&self) -> Vec<DeviceId> {
        self.state().devices.keys().copied().collect()
    }

    fn device_exists(&self, device: DeviceId) -> bool {
        self.state().devices.contains_key(&device)
    }

    fn name(&self, device: DeviceId) -> Option<String> {
        self.read(device, |spec| spec.name.clone())
    }

    fn is_alive(&self, device: DeviceId) -> bool {
        self.read(device, |spec| spec.alive).unwrap_or(false)
    }

    fn transport_type(&self, device: DeviceId) -> Option<TransportType> {
        self.read(device, |spec| spec.transport).flatten()
    }

    fn channels(&self, device: DeviceId, direction: Direction) -> u32 {
        self.read(device, |spec| match direction {
            Direction::Input => spec.input_channels,
            Direction::Output => spec.output_channels,
        })
        .unwrap_or(0)
    }

    fn nominal_sample_rate(&self, device: DeviceId) -> Option<f64> {
        self.read(device, |spec| spec.sample_rate).flatten()
    }

    fn nominal_sample_rates(&self, device: DeviceId) -> Option<Vec<f64>> {
        self.read(device, |spec| spec.sample_rates.clone())
    }

    fn set_nominal_sample_rate(&self, device: DeviceId, rate: f64) -> Result<()> {
        self.apply(
            HardwareCall::SetNominalSampleRate { device, rate },
            device,
            |spec| {
                if !spec.sample_rates.contains(&rate) {
                    return Err(anyhow!("{} does not support {} Hz", spec.name, rate));
                }
                if spec.sample_rate == Some(rate) {
                    return Ok(Vec::new());
                }
                spec.sample_rate = Some(rate);
                Ok(vec![DeviceEvent::NominalSampleRateDidChange(device).into()])
            },
        )
    }

    fn clock_source_ids(&self, device: DeviceId, _direction: Direction) -> Option<Vec<ClockSourceId>> {
        self.read(device, |spec| {
            spec.clock_sources
                .as_ref()
                .map(|sources| sources.iter().map(|source| source.id).collect())
        })
        .flatten()
    }

    fn clock_source_id(&self, device: DeviceId, _direction: Direction) -> Option<ClockSourceId> {
        self.read(device, |spec| spec.clock_source).flatten()
    }

    fn clock_source_name(&self, device: DeviceId, clock_source: ClockSourceId) -> Option<String> {
        self.read(device, |spec| {
            spec.clock_sources.as_ref().and_then(|sources| {
                sources
                    .iter()
                    .find(|source| source.id == clock_source)
                    .map(|source| source.name.clone())
            })
        })
        .flatten()
    }

    fn set_clock_source_id(
        &self,
        device: DeviceId,
        clock_source: ClockSourceId,
        _direction: Direction,
    ) -> Result<()> {
        self.apply(
            HardwareCall::SetClockSource {
                device,
                clock_source,
            },
            device,
            |spec| {
                let known = spec
                    .clock_sources
                    .as_ref()
                    .is_some_and(|sources| sources.iter().any(|source| source.id == clock_source));
                if !known {
                    return Err(anyhow!("{} has no clock source {}", spec.name, clock_source));
                }
                if spec.clock_source == Some(clock_source) {
                    return Ok(Vec::new());
                }
                spec.clock_source = Some(clock_source);
                Ok(vec![DeviceEvent::ClockSourceDidChange(device).into()])
            },
        )
    }

    fn can_set_virtual_master_volume(&self, device: DeviceId, direction: Direction) -> bool {
        self.read(device, |spec| spec.volume(direction).is_some_and(|v| v.settable))
            .unwrap_or(false)
    }

    fn virtual_master_volume(&self, device: DeviceId, direction: Direction) -> Option<f32> {
        self.read(device, |spec| spec.volume(direction).and_then(|v| v.volume))
            .flatten()
    }

    fn virtual_master_volume_in_decibels(&self, device: DeviceId, direction: Direction) -> Option<f32> {
        self.read(device, |spec| spec.volume(direction).and_then(|v| v.decibels()))
            .flatten()
    }

    fn set_virtual_master_volume(&self, device: DeviceId, volume: f32, direction: Direction) -> Result<()> {
        self.apply(
            HardwareCall::SetVolume {
                device,
                direction,
                volume,
            },
            device,
            |spec| {
                let name = spec.name.clone();
                let state = spec
                    .volume_mut(direction)
                    .filter(|v| v.settable)
                    .ok_or_else(|| anyhow!("{} has no settable {} volume", name, direction))?;
                let volume = volume.clamp(0.0, 1.0);
                if state.volume == Some(volume) {
                    return Ok(Vec::new());
                }
                state.volume = Some(volume);
                Ok(vec![DeviceEvent::VolumeDidChange { device, direction }.into()])
            },
        )
    }

    fn is_muted(&self, device: DeviceId, direction: Direction) -> Option<bool> {
        self.read(device, |spec| spec.volume(direction).map(|v| v.muted))
            .flatten()
    }

    fn set_mute(&self, device: DeviceId, muted: bool, direction: Direction) -> Result<()> {
        self.apply(
            HardwareCall::SetMute {
                device,
                direction,
                muted,
            },
            device,
            |spec| {
                let name = spec.name.clone();
                let state = spec
                    .volume_mut(direction)
                    .ok_or_else(|| anyhow!("{} has no {} mute control", name, direction))?;
                if state.muted == muted {
                    return Ok(Vec::new());
                }
                state.muted = muted;
                Ok(vec![DeviceEvent::MuteDidChange { device, direction }.into()])
            },
        )
    }

    fn default_device(&self, role: DefaultDeviceRole) -> Option<DeviceId> {
        self.state().defaults.get(&role).copied()
    }

    fn set_default_device(&self, device: DeviceId, role: DefaultDeviceRole) -> Result<()> {
        let events = {
            let mut state = self.state();
            state.calls.push(HardwareCall::SetDefaultDevice { device, role });
            if state.fail_setters {
                return Err(anyhow!("Simulated setter failure"));
            }
            let spec = state
                .devices
                .get(&device)
                .ok_or_else(|| anyhow!("Device #{} not found", device))?;
            let direction = match role {
                DefaultDeviceRole::Input => Direction::Input,
                DefaultDeviceRole::Output | DefaultDeviceRole::SystemOutput => Direction::Output,
            };
            let channels = match direction {
                Direction::Input => spec.input_channels,
                Direction::Output => spec.output_channels,
            };
            if channels == 0 {
                return Err(anyhow!("{} has no {} channels", spec.name, direction));
            }
            if state.defaults.insert(role, device) == Some(device) {
                Vec::new()
            } else {
                vec![default_changed(role, Some(device))]
            }
        };
        self.emit(events);
        Ok(())
    }

    fn add_event_listener(&self, callback: AudioEventCallback) -> ListenerId {
        let mut state = self.state();
        state.next_listener += 1;
        let id = state.next_listener;
        state.listeners.push((id, Arc::from(callback)));
        id
    }

    fn remove_event_listener(&self, listener: ListenerId) {
        self.state().listeners.retain(|(id, _)| *id != listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    fn recorder(hardware: &SimulatedAudioHardware) -> Arc<StdMutex<Vec<AudioEvent>>> {
        let events = Arc::new(StdMutex::new(Vec::new()));
        let sink = events.clone();
        hardware.add_event_listener(Box::new(move |event| sink.lock().unwrap().push(event)));
        events
    }

    fn speakers() -> DeviceSpec {
        DeviceSpec {
            output_channels: 2,
            sample_rate: Some(44_100.0),
            sample_rates: vec![44_100.0, 48_000.0],
            output_volume: Some(VolumeSpec::new(0.5)),
            ..DeviceSpec::new(1, "Speakers")
        }
    }

    #[test]
    fn test_setter_emits_change_notification() {
        let hardware = SimulatedAudioHardware::with_devices([speakers()]);
        let events = recorder(&hardware);

        hardware.set_nominal_sample_rate(1, 48_000.0).unwrap();

        assert_eq!(hardware.nominal_sample_rate(1), Some(48_000.0));
        assert_eq!(
            *events.lock().unwrap(),
            vec![AudioEvent::Device(DeviceEvent::NominalSampleRateDidChange(1))]
        );
    }

    #[test]
    fn test_unchanged_value_emits_nothing() {
        let hardware = SimulatedAudioHardware::with_devices([speakers()]);
        let events = recorder(&hardware);

        hardware.set_nominal_sample_rate(1, 44_100.0).unwrap();
        hardware.set_mute(1, false, Direction::Output).unwrap();

        assert!(events.lock().unwrap().is_empty());
        assert_eq!(hardware.calls().len(), 2);
    }

    #[test]
    fn test_setter_failure_is_reported() {
        let hardware = SimulatedAudioHardware::with_devices([speakers()]);
        hardware.set_setter_failure(true);

        assert!(hardware.set_mute(1, true, Direction::Output).is_err());
        assert_eq!(hardware.is_muted(1, Direction::Output), Some(false));
    }

    #[test]
    fn test_remove_clears_roles() {
        let hardware = SimulatedAudioHardware::with_devices([speakers()]);
        hardware.set_default_device(1, DefaultDeviceRole::Output).unwrap();
        let events = recorder(&hardware);

        assert!(hardware.remove_device(1));

        assert_eq!(hardware.default_device(DefaultDeviceRole::Output), None);
        assert!(!hardware.is_alive(1));
        assert_eq!(events.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_decibels_follow_volume() {
        let hardware = SimulatedAudioHardware::with_devices([speakers()]);
        let db = hardware
            .virtual_master_volume_in_decibels(1, Direction::Output)
            .unwrap();
        assert!((db - -6.0206).abs() < 0.01);
    }

    #[test]
    fn test_removed_listener_is_not_called() {
        let hardware = SimulatedAudioHardware::with_devices([speakers()]);
        let events = Arc::new(StdMutex::new(Vec::new()));
        let sink = events.clone();
        let id = hardware.add_event_listener(Box::new(move |event| sink.lock().unwrap().push(event)));
        hardware.remove_event_listener(id);

        hardware.rename_device(1, "Desk Speakers");
        assert!(events.lock().unwrap().is_empty());
        assert_eq!(hardware.listener_count(), 0);
    }
}
