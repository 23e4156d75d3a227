use anyhow::{Context, Result};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::audio::DeviceId;
use crate::events::PreferenceEvent;
use crate::status_bar::LayoutType;
use crate::system::traits::{FileSystemInterface, ListenerId, PreferenceEventCallback, PreferencesInterface};

/// Production implementation of FileSystemInterface using std::fs
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFileSystem;

impl FileSystemInterface for StandardFileSystem {
    fn read_config_file(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))
    }

    fn write_config_file(&self, path: &Path, content: &str) -> Result<()> {
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    fn config_file_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_config_dir(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create config directory: {}", path.display()))
    }

    fn get_config_modified_time(&self, path: &Path) -> Result<std::time::SystemTime> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to get file metadata: {}", path.display()))?;
        metadata.modified().context("Failed to get modified time")
    }
}

type SharedPreferenceCallback = Arc<dyn Fn(PreferenceEvent) + Send + Sync>;

struct PreferenceState {
    layout_type: LayoutType,
    featured_device: Option<DeviceId>,
    listeners: Vec<(ListenerId, SharedPreferenceCallback)>,
    next_listener: ListenerId,
    #[cfg(any(test, feature = "test-mocks"))]
    featured_writes: Vec<Option<DeviceId>>,
}

/// Preference store kept in memory, seeded from the configuration file.
/// Every write notifies observers, including writes of an unchanged value.
#[derive(Clone)]
pub struct InMemoryPreferences {
    state: Arc<Mutex<PreferenceState>>,
}

impl InMemoryPreferences {
    pub fn new(layout_type: LayoutType, featured_device: Option<DeviceId>) -> Self {
        Self {
            state: Arc::new(Mutex::new(PreferenceState {
                layout_type,
                featured_device,
                listeners: Vec::new(),
                next_listener: 0,
                #[cfg(any(test, feature = "test-mocks"))]
                featured_writes: Vec::new(),
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, PreferenceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, event: PreferenceEvent) {
        let listeners: Vec<SharedPreferenceCallback> = self
            .state()
            .listeners
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();
        debug!("Preference changed: {:?}", event);
        for listener in listeners {
            listener(event.clone());
        }
    }

    /// Change the summary layout, as the preferences window would
    pub fn set_layout_type(&self, layout_type: LayoutType) {
        self.state().layout_type = layout_type;
        self.notify(PreferenceEvent::LayoutTypeChanged(layout_type));
    }

    /// Every featured-device write made through [`PreferencesInterface`]
    #[cfg(any(test, feature = "test-mocks"))]
    pub fn featured_writes(&self) -> Vec<Option<DeviceId>> {
        self.state().featured_writes.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.state().listeners.len()
    }
}

impl Default for InMemoryPreferences {
    fn default() -> Self {
        Self::new(LayoutType::default(), None)
    }
}

impl PreferencesInterface for InMemoryPreferences {
    fn layout_type(&self) -> LayoutType {
        self.state().layout_type
    }

    fn featured_device(&self) -> Option<DeviceId> {
        self.state().featured_device
    }

    fn set_featured_device(&self, device: Option<DeviceId>) {
        {
            let mut state = self.state();
            state.featured_device = device;
            #[cfg(any(test, feature = "test-mocks"))]
            state.featured_writes.push(device);
        }
        self.notify(PreferenceEvent::FeaturedDeviceChanged(device));
    }

    fn add_preference_listener(&self, callback: PreferenceEventCallback) -> ListenerId {
        let mut state = self.state();
        state.next_listener += 1;
        let id = state.next_listener;
        state.listeners.push((id, Arc::from(callback)));
        id
    }

    fn remove_preference_listener(&self, listener: ListenerId) {
        self.state().listeners.retain(|(id, _)| *id != listener);
    }
}
