pub mod device;
pub mod snapshot;

pub use device::{
    AudioDevice, ClockSourceId, DefaultDeviceRole, DeviceId, Direction, TransportType,
    format_sample_rate,
};
pub use snapshot::{ClockSource, DefaultDevices, DeviceSnapshot, VolumeState};
