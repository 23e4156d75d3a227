use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{Level, info, warn};

use audio_status_menu::config::{Config, ConfigLoader};
use audio_status_menu::logging::{LoggingConfig, cleanup_old_logs, initialize_logging};
use audio_status_menu::scenario::Scenario;
use audio_status_menu::service::MenuService;
use audio_status_menu::system::{InMemoryPreferences, SimulatedAudioHardware, StandardFileSystem};

type SimulatedService = MenuService<SimulatedAudioHardware, InMemoryPreferences, StandardFileSystem>;

#[derive(Parser)]
#[command(name = "audio-status-menu")]
#[command(about = "Status-bar audio device menu kept in sync with hardware changes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the menu from a scenario's initial devices and print it
    Render {
        scenario: PathBuf,
    },
    /// Apply a scenario's steps and print the resulting menu
    Replay {
        scenario: PathBuf,
        /// Print the menu after every step
        #[arg(long)]
        each_step: bool,
    },
    /// Replay a scenario, then keep the menu running until interrupted
    Watch {
        scenario: PathBuf,
    },
    /// Validate configuration file
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_loader = match cli.config {
        Some(path) => ConfigLoader::new_production(path),
        None => ConfigLoader::new_with_default_path()?,
    };
    let config = config_loader.load_config()?;

    let mut logging = LoggingConfig::from_general(&config.general);
    if cli.verbose {
        logging = logging.with_level(Level::DEBUG);
    }
    let (_guard, log_dir) = initialize_logging(logging)?;
    if let Some(dir) = log_dir {
        info!("Logging to {}", dir.display());
        if let Err(e) = cleanup_old_logs(&dir, config.general.log_retention_days.into()) {
            warn!("Failed to clean up old logs: {:#}", e);
        }
    }

    match cli.command {
        Commands::Render { scenario } => {
            let (service, _) = start_service(&scenario, config_loader, config)?;
            println!("{}", service.controller().render());
        }
        Commands::Replay {
            scenario,
            each_step,
        } => {
            let (mut service, scenario) = start_service(&scenario, config_loader, config)?;
            replay(&mut service, &scenario, each_step)?;
            println!("{}", service.controller().render());
        }
        Commands::Watch { scenario } => {
            let (mut service, scenario) = start_service(&scenario, config_loader, config)?;
            replay(&mut service, &scenario, false)?;
            println!("{}", service.controller().render());
            println!("Watching; press Ctrl+C to stop, send SIGHUP to reload configuration");
            service.run().await?;
            println!("{}", service.controller().render());
        }
        Commands::CheckConfig => {
            check_config(&config_loader, &config)?;
        }
    }

    Ok(())
}

fn start_service(
    path: &Path,
    config_loader: ConfigLoader<StandardFileSystem>,
    config: Config,
) -> Result<(SimulatedService, Scenario)> {
    let scenario = Scenario::load(&StandardFileSystem, path)?;
    info!(
        "Loaded scenario {} with {} devices and {} steps",
        path.display(),
        scenario.devices.len(),
        scenario.steps.len()
    );

    let hardware = scenario.hardware();
    let preferences = scenario.preferences(&config.preferences);
    let mut service = MenuService::new(hardware, preferences, config_loader, config);
    service.start();
    service.drain_pending();
    Ok((service, scenario))
}

fn replay(service: &mut SimulatedService, scenario: &Scenario, each_step: bool) -> Result<()> {
    for (index, step) in scenario.steps.iter().enumerate() {
        step.apply(service.controller_mut())?;
        service.drain_pending();

        if each_step {
            println!("== step {}: {}", index + 1, step);
            println!("{}", service.controller().render());
        }
    }

    // Run a recompute still waiting on its delay
    if let Some(deadline) = service.controller().pending_menu_update() {
        service.controller_mut().flush_menu_update(deadline);
    }
    Ok(())
}

fn check_config(config_loader: &ConfigLoader<StandardFileSystem>, config: &Config) -> Result<()> {
    info!("Validating configuration");
    config.validate()?;

    println!("Configuration validation:");
    println!("  ✓ {} parsed successfully", config_loader.get_config_path().display());
    println!("  ✓ Log level: {}", config.general.log_level);
    println!("  ✓ Menu update delay: {}ms", config.menu.update_delay_ms);
    println!("  ✓ App name: {}", config.menu.app_name);
    println!("  ✓ Status bar padding: {}", config.status_bar.padding);
    println!("  ✓ Layout: {}", config.preferences.layout_type);
    match config.preferences.featured_device {
        Some(device) => println!("  ✓ Featured device: #{}", device),
        None => println!("  ✓ Featured device: none"),
    }

    Ok(())
}
