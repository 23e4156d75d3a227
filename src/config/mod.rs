mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{Config, GeneralConfig, MenuConfig, PreferencesConfig, StatusBarConfig};
