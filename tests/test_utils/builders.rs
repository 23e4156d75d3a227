//! Test utility builders for simulated devices and a ready-to-use menu service
//!
//! Individual methods may not be used by all tests, so dead code warnings are suppressed.

#![allow(dead_code)]

use audio_status_menu::audio::{ClockSourceId, DeviceId, Direction, TransportType};
use audio_status_menu::config::{Config, ConfigLoader};
use audio_status_menu::service::MenuService;
use audio_status_menu::status_bar::LayoutType;
use audio_status_menu::system::{
    ClockSourceSpec, DeviceSpec, InMemoryPreferences, MockFileSystem, SimulatedAudioHardware,
    VolumeSpec,
};
use std::path::PathBuf;

pub type TestService = MenuService<SimulatedAudioHardware, InMemoryPreferences, MockFileSystem>;

/// Builder for creating simulated devices
pub struct DeviceSpecBuilder {
    spec: DeviceSpec,
}

impl DeviceSpecBuilder {
    pub fn new(id: DeviceId, name: &str) -> Self {
        Self {
            spec: DeviceSpec::new(id, name),
        }
    }

    pub fn transport(mut self, transport: TransportType) -> Self {
        self.spec.transport = Some(transport);
        self
    }

    pub fn output_channels(mut self, channels: u32) -> Self {
        self.spec.output_channels = channels;
        self
    }

    pub fn input_channels(mut self, channels: u32) -> Self {
        self.spec.input_channels = channels;
        self
    }

    pub fn sample_rate(mut self, rate: f64) -> Self {
        self.spec.sample_rate = Some(rate);
        self
    }

    pub fn sample_rates(mut self, rates: &[f64]) -> Self {
        self.spec.sample_rates = rates.to_vec();
        self
    }

    pub fn clock_sources(mut self, sources: &[(ClockSourceId, &str)]) -> Self {
        self.spec.clock_sources = Some(
            sources
                .iter()
                .map(|(id, name)| ClockSourceSpec {
                    id: *id,
                    name: name.to_string(),
                })
                .collect(),
        );
        self
    }

    pub fn clock_source(mut self, id: ClockSourceId) -> Self {
        self.spec.clock_source = Some(id);
        self
    }

    pub fn volume(mut self, direction: Direction, volume: f32) -> Self {
        *self.slot(direction) = Some(VolumeSpec::new(volume));
        self
    }

    /// Settable volume whose value cannot be read
    pub fn unreadable_volume(mut self, direction: Direction) -> Self {
        *self.slot(direction) = Some(VolumeSpec {
            settable: true,
            volume: None,
            muted: false,
        });
        self
    }

    pub fn muted(mut self, direction: Direction) -> Self {
        if let Some(volume) = self.slot(direction).as_mut() {
            volume.muted = true;
        }
        self
    }

    pub fn dead(mut self) -> Self {
        self.spec.alive = false;
        self
    }

    fn slot(&mut self, direction: Direction) -> &mut Option<VolumeSpec> {
        match direction {
            Direction::Input => &mut self.spec.input_volume,
            Direction::Output => &mut self.spec.output_volume,
        }
    }

    pub fn build(self) -> DeviceSpec {
        self.spec
    }
}

/// Stereo output device at 48 kHz with a readable output volume
pub fn output_device(id: DeviceId, name: &str) -> DeviceSpec {
    DeviceSpecBuilder::new(id, name)
        .transport(TransportType::Usb)
        .output_channels(2)
        .sample_rate(48_000.0)
        .sample_rates(&[44_100.0, 48_000.0, 96_000.0])
        .volume(Direction::Output, 0.5)
        .build()
}

/// Mono input-only device
pub fn input_device(id: DeviceId, name: &str) -> DeviceSpec {
    DeviceSpecBuilder::new(id, name)
        .transport(TransportType::BuiltIn)
        .input_channels(1)
        .sample_rate(44_100.0)
        .sample_rates(&[44_100.0])
        .volume(Direction::Input, 0.8)
        .build()
}

/// A started service over simulated hardware and an in-memory preference store
pub fn start_service(
    devices: Vec<DeviceSpec>,
    layout: LayoutType,
    featured: Option<DeviceId>,
) -> (TestService, SimulatedAudioHardware, InMemoryPreferences) {
    start_service_with_config(devices, layout, featured, Config::default())
}

pub fn start_service_with_config(
    devices: Vec<DeviceSpec>,
    layout: LayoutType,
    featured: Option<DeviceId>,
    config: Config,
) -> (TestService, SimulatedAudioHardware, InMemoryPreferences) {
    let hardware = SimulatedAudioHardware::with_devices(devices);
    let preferences = InMemoryPreferences::new(layout, featured);
    let loader = ConfigLoader::new(MockFileSystem::new(), PathBuf::from("/test/config.toml"));

    let mut service = MenuService::new(hardware.clone(), preferences.clone(), loader, config);
    service.start();
    service.drain_pending();
    (service, hardware, preferences)
}
