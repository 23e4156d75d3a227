//! Scenario files: a starting set of devices plus a list of steps replayed
//! against the simulated hardware layer and the preference store.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::audio::{ClockSourceId, DefaultDeviceRole, DeviceId, Direction};
use crate::config::PreferencesConfig;
use crate::controller::{ActionOutcome, StatusMenuController};
use crate::menu::MenuAction;
use crate::status_bar::LayoutType;
use crate::system::{
    AudioHardwareInterface, DeviceSpec, FileSystemInterface, InMemoryPreferences,
    PreferencesInterface, SimulatedAudioHardware,
};

pub type SimulatedController = StatusMenuController<SimulatedAudioHardware, InMemoryPreferences>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsSpec {
    pub output: Option<DeviceId>,
    pub system_output: Option<DeviceId>,
    pub input: Option<DeviceId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub devices: Vec<DeviceSpec>,
    #[serde(default)]
    pub defaults: DefaultsSpec,
    /// Overrides the `[preferences]` section of the configuration
    #[serde(default)]
    pub preferences: Option<PreferencesConfig>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One scripted change. Hardware steps go through the simulated hardware
/// layer as if another application made them; `select` clicks a menu entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    AddDevice {
        device: DeviceSpec,
    },
    RemoveDevice {
        id: DeviceId,
    },
    RenameDevice {
        id: DeviceId,
        name: String,
    },
    SetAlive {
        id: DeviceId,
        alive: bool,
    },
    SetSampleRate {
        id: DeviceId,
        rate: f64,
    },
    SetClockSource {
        id: DeviceId,
        clock_source: ClockSourceId,
    },
    SetVolume {
        id: DeviceId,
        direction: Direction,
        volume: f32,
    },
    SetMute {
        id: DeviceId,
        direction: Direction,
        muted: bool,
    },
    SetDefault {
        role: DefaultDeviceRole,
        #[serde(default)]
        id: Option<DeviceId>,
    },
    SetLayout {
        layout: LayoutType,
    },
    SetFeatured {
        #[serde(default)]
        id: Option<DeviceId>,
    },
    Select {
        action: MenuAction,
    },
}

impl Scenario {
    pub fn from_toml(content: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(content).context("Failed to parse scenario")?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load<F: FileSystemInterface>(file_system: &F, path: &Path) -> Result<Self> {
        let content = file_system
            .read_config_file(path)
            .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid scenario: {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for device in &self.devices {
            if !seen.insert(device.id) {
                bail!("Device id {} is listed more than once", device.id);
            }
        }
        for (role, id) in [
            (DefaultDeviceRole::Output, self.defaults.output),
            (DefaultDeviceRole::SystemOutput, self.defaults.system_output),
            (DefaultDeviceRole::Input, self.defaults.input),
        ] {
            if let Some(id) = id {
                if !seen.contains(&id) {
                    bail!("Default {} device {} is not listed in devices", role, id);
                }
            }
        }
        Ok(())
    }

    /// Simulated hardware holding the initial devices and role assignments
    pub fn hardware(&self) -> SimulatedAudioHardware {
        let hardware = SimulatedAudioHardware::with_devices(self.devices.iter().cloned());
        for (role, id) in [
            (DefaultDeviceRole::Output, self.defaults.output),
            (DefaultDeviceRole::SystemOutput, self.defaults.system_output),
            (DefaultDeviceRole::Input, self.defaults.input),
        ] {
            if id.is_some() {
                hardware.assign_default(role, id);
            }
        }
        hardware
    }

    /// Preference store seeded from the scenario, falling back to the
    /// configuration's values
    pub fn preferences(&self, config: &PreferencesConfig) -> InMemoryPreferences {
        let seed = self.preferences.as_ref().unwrap_or(config);
        InMemoryPreferences::new(seed.layout_type, seed.featured_device)
    }
}

impl Step {
    /// Apply the step. Notifications it causes are queued, not handled.
    pub fn apply(&self, controller: &mut SimulatedController) -> Result<()> {
        let hardware = controller.hardware().clone();
        let preferences = controller.preferences().clone();

        match self {
            Step::AddDevice { device } => {
                if hardware.device_exists(device.id) {
                    bail!("Device {} already exists", device.id);
                }
                hardware.add_device(device.clone());
            }
            Step::RemoveDevice { id } => {
                if !hardware.remove_device(*id) {
                    bail!("Device {} does not exist", id);
                }
            }
            Step::RenameDevice { id, name } => {
                if !hardware.rename_device(*id, name.clone()) {
                    bail!("Device {} does not exist", id);
                }
            }
            Step::SetAlive { id, alive } => {
                if !hardware.device_exists(*id) {
                    bail!("Device {} does not exist", id);
                }
                hardware.set_alive(*id, *alive);
            }
            Step::SetSampleRate { id, rate } => hardware
                .set_nominal_sample_rate(*id, *rate)
                .context("set_sample_rate step failed")?,
            Step::SetClockSource { id, clock_source } => hardware
                .set_clock_source_id(*id, *clock_source, Direction::Output)
                .context("set_clock_source step failed")?,
            Step::SetVolume {
                id,
                direction,
                volume,
            } => hardware
                .set_virtual_master_volume(*id, *volume, *direction)
                .context("set_volume step failed")?,
            Step::SetMute {
                id,
                direction,
                muted,
            } => hardware
                .set_mute(*id, *muted, *direction)
                .context("set_mute step failed")?,
            Step::SetDefault { role, id } => {
                if let Some(id) = id {
                    if !hardware.device_exists(*id) {
                        bail!("Device {} does not exist", id);
                    }
                }
                hardware.assign_default(*role, *id);
            }
            Step::SetLayout { layout } => preferences.set_layout_type(*layout),
            Step::SetFeatured { id } => preferences.set_featured_device(*id),
            Step::Select { action } => {
                let outcome = controller.handle_action(action.clone());
                if outcome == ActionOutcome::Ignored {
                    tracing::info!("Menu ignored {:?}", action);
                }
            }
        }
        Ok(())
    }
}

fn or_none(id: &Option<DeviceId>) -> String {
    id.map_or_else(|| "none".to_string(), |id| format!("#{}", id))
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::AddDevice { device } => write!(f, "add {} (#{})", device.name, device.id),
            Step::RemoveDevice { id } => write!(f, "remove #{}", id),
            Step::RenameDevice { id, name } => write!(f, "rename #{} to {}", id, name),
            Step::SetAlive { id, alive } => write!(f, "set #{} alive={}", id, alive),
            Step::SetSampleRate { id, rate } => write!(f, "set #{} sample rate to {}", id, rate),
            Step::SetClockSource { id, clock_source } => {
                write!(f, "set #{} clock source to {}", id, clock_source)
            }
            Step::SetVolume {
                id,
                direction,
                volume,
            } => write!(f, "set #{} {} volume to {:.2}", id, direction, volume),
            Step::SetMute {
                id,
                direction,
                muted,
            } => write!(f, "set #{} {} mute={}", id, direction, muted),
            Step::SetDefault { role, id } => write!(f, "set default {} to {}", role, or_none(id)),
            Step::SetLayout { layout } => write!(f, "set layout to {}", layout),
            Step::SetFeatured { id } => write!(f, "set featured device to {}", or_none(id)),
            Step::Select { action } => write!(f, "select {:?}", action),
        }
    }
}
