use audio_status_menu::config::{Config, ConfigLoader};
use audio_status_menu::status_bar::LayoutType;
use audio_status_menu::system::MockFileSystem;
use std::path::PathBuf;

/// Integration tests for ConfigLoader over the mock file system

fn config_path() -> PathBuf {
    PathBuf::from("/test/audio-status-menu/config.toml")
}

#[test]
fn test_config_loading_with_mock_filesystem() {
    let file_system = MockFileSystem::new();
    let config_content = r#"
[general]
log_level = "debug"
file_logging = true
log_retention_days = 3

[menu]
update_delay_ms = 250
app_name = "Studio Menu"

[status_bar]
padding = 6.0

[preferences]
layout_type = "master_volume_percent"
featured_device = 12
"#;
    file_system.add_file(config_path(), config_content.to_string());

    let config_loader = ConfigLoader::new(file_system.clone(), config_path());
    let config = config_loader.load_config().unwrap();

    assert_eq!(config.general.log_level, "debug");
    assert!(config.general.file_logging);
    assert!(!config.general.json_logs);
    assert_eq!(config.general.log_retention_days, 3);
    assert_eq!(config.menu.update_delay_ms, 250);
    assert_eq!(config.menu.app_name, "Studio Menu");
    assert_eq!(config.status_bar.padding, 6.0);
    assert_eq!(config.preferences.layout_type, LayoutType::MasterVolumePercent);
    assert_eq!(config.preferences.featured_device, Some(12));

    assert_eq!(file_system.get_read_calls(), vec![config_path()]);
}

#[test]
fn test_missing_file_creates_default_config() {
    let file_system = MockFileSystem::new();
    let config_loader = ConfigLoader::new(file_system.clone(), config_path());

    let config = config_loader.load_config().unwrap();

    assert_eq!(config, Config::default());
    assert!(file_system.file_exists(config_path()));
    assert!(
        file_system
            .get_directory_creation_calls()
            .contains(&PathBuf::from("/test/audio-status-menu"))
    );

    // The written defaults load back unchanged
    assert_eq!(config_loader.load_config().unwrap(), config);
}

#[test]
fn test_default_config_survives_write_failure() {
    let file_system = MockFileSystem::new();
    file_system.set_write_failure(true);
    let config_loader = ConfigLoader::new(file_system.clone(), config_path());

    let config = config_loader.load_config().unwrap();

    assert_eq!(config, Config::default());
    assert!(!file_system.file_exists(config_path()));
}

#[test]
fn test_invalid_values_are_rejected() {
    let file_system = MockFileSystem::new();
    file_system.add_file(
        config_path(),
        "[menu]\nupdate_delay_ms = 0\n".to_string(),
    );
    let config_loader = ConfigLoader::new(file_system, config_path());

    let error = config_loader.load_config().unwrap_err();
    assert!(format!("{:#}", error).contains("update_delay_ms"));
}

#[test]
fn test_malformed_file_reports_path() {
    let file_system = MockFileSystem::new();
    file_system.add_file(config_path(), "[menu\napp_name = ".to_string());
    let config_loader = ConfigLoader::new(file_system, config_path());

    let error = config_loader.load_config().unwrap_err();
    assert!(error.to_string().contains("config.toml"));
}

#[test]
fn test_unknown_layout_name_is_rejected() {
    let file_system = MockFileSystem::new();
    file_system.add_file(
        config_path(),
        "[preferences]\nlayout_type = \"spectrum\"\n".to_string(),
    );
    let config_loader = ConfigLoader::new(file_system, config_path());

    assert!(config_loader.load_config().is_err());
}

#[test]
fn test_read_failure_propagates() {
    let file_system = MockFileSystem::new();
    file_system.add_file(config_path(), String::new());
    file_system.set_read_failure(true);
    let config_loader = ConfigLoader::new(file_system, config_path());

    let error = config_loader.load_config().unwrap_err();
    assert!(format!("{:#}", error).contains("Mock read failure"));
}

#[test]
fn test_save_then_reload() {
    let file_system = MockFileSystem::new();
    let config_loader = ConfigLoader::new(file_system.clone(), config_path());

    let mut config = Config::default();
    config.status_bar.padding = 2.5;
    config.preferences.layout_type = LayoutType::SampleRate;
    config_loader.save_config(&config).unwrap();

    let writes = file_system.get_write_calls();
    assert_eq!(writes.len(), 1);
    assert!(writes[0].1.contains("padding = 2.5"));
    assert!(writes[0].1.contains("layout_type = \"sample_rate\""));

    assert_eq!(config_loader.reload_config().unwrap(), config);
}

#[test]
fn test_config_modification_detection() {
    let file_system = MockFileSystem::new();
    file_system.add_file(config_path(), "[menu]\napp_name = \"One\"\n".to_string());
    let config_loader = ConfigLoader::new(file_system.clone(), config_path());

    let loaded_at = config_loader.config_modified_time().unwrap();
    assert!(!config_loader.is_config_modified(loaded_at).unwrap());

    file_system.add_file(config_path(), "[menu]\napp_name = \"Two\"\n".to_string());
    assert!(config_loader.is_config_modified(loaded_at).unwrap());
    assert_eq!(config_loader.reload_config().unwrap().menu.app_name, "Two");
}

#[test]
fn test_missing_file_is_never_modified() {
    let config_loader = ConfigLoader::new(MockFileSystem::new(), config_path());

    assert!(!config_loader.config_exists());
    assert!(config_loader.config_modified_time().is_none());
    assert!(
        !config_loader
            .is_config_modified(std::time::SystemTime::UNIX_EPOCH)
            .unwrap()
    );
}
