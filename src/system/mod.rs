pub mod adapters;
pub mod simulated;
pub mod traits;

// Mock implementations for testing
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

// Re-export traits and adapters for easy access
pub use adapters::*;
pub use simulated::{ClockSourceSpec, DeviceSpec, HardwareCall, SimulatedAudioHardware, VolumeSpec};
pub use traits::*;

// Re-export mocks when testing
#[cfg(any(test, feature = "test-mocks"))]
pub use mocks::*;
