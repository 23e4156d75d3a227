use anyhow::Result;
use std::time::{Duration, Instant, SystemTime};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::signals::{SignalHandler, SignalType};
use crate::config::{Config, ConfigLoader};
use crate::controller::{ActionOutcome, StatusMenuController};
use crate::events::MenuEvent;
use crate::menu::MenuAction;
use crate::system::{AudioHardwareInterface, FileSystemInterface, ListenerId, PreferencesInterface};

const CONFIG_CHECK_INTERVAL: Duration = Duration::from_secs(2);

/// Owns the controller and feeds it from a single event queue.
///
/// Hardware and preference listeners only push into the queue; the queue is
/// drained on the task that owns the service, so event handlers never run
/// concurrently with each other or with the deferred menu recompute.
pub struct MenuService<H, P, F>
where
    H: AudioHardwareInterface,
    P: PreferencesInterface,
    F: FileSystemInterface,
{
    controller: StatusMenuController<H, P>,
    config_loader: ConfigLoader<F>,
    config: Config,
    events_tx: mpsc::UnboundedSender<MenuEvent>,
    events_rx: mpsc::UnboundedReceiver<MenuEvent>,
    audio_listener: Option<ListenerId>,
    preference_listener: Option<ListenerId>,
    last_config_modified: Option<SystemTime>,
}

impl<H, P, F> MenuService<H, P, F>
where
    H: AudioHardwareInterface,
    P: PreferencesInterface,
    F: FileSystemInterface,
{
    pub fn new(hardware: H, preferences: P, config_loader: ConfigLoader<F>, config: Config) -> Self {
        let controller = StatusMenuController::new(hardware, preferences, &config);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let last_config_modified = config_loader.config_modified_time();

        Self {
            controller,
            config_loader,
            config,
            events_tx,
            events_rx,
            audio_listener: None,
            preference_listener: None,
            last_config_modified,
        }
    }

    /// Subscribe to both collaborators and populate the menu
    pub fn start(&mut self) {
        if self.audio_listener.is_some() {
            warn!("Menu service already started");
            return;
        }
        info!("Starting menu service");

        let tx = self.events_tx.clone();
        self.audio_listener = Some(self.controller.hardware().add_event_listener(Box::new(
            move |event| {
                let _ = tx.send(event.into());
            },
        )));

        let tx = self.events_tx.clone();
        self.preference_listener = Some(self.controller.preferences().add_preference_listener(
            Box::new(move |event| {
                let _ = tx.send(event.into());
            }),
        ));

        self.controller.populate();
    }

    /// Unregister from both collaborators. Queued events are dropped.
    pub fn stop(&mut self) {
        if let Some(listener) = self.audio_listener.take() {
            self.controller.hardware().remove_event_listener(listener);
        }
        if let Some(listener) = self.preference_listener.take() {
            self.controller.preferences().remove_preference_listener(listener);
        }
        while self.events_rx.try_recv().is_ok() {}
        info!("Menu service stopped");
    }

    /// Handle every queued event. Returns how many were handled.
    pub fn drain_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.controller.handle_event(event);
            handled += 1;
        }
        if handled > 0 {
            debug!("Handled {} queued events", handled);
        }
        handled
    }

    /// Perform a user action, then handle whatever it caused
    pub fn select(&mut self, action: MenuAction) -> ActionOutcome {
        let outcome = self.controller.handle_action(action);
        self.drain_pending();
        outcome
    }

    /// Sender feeding the service's queue
    pub fn event_sender(&self) -> mpsc::UnboundedSender<MenuEvent> {
        self.events_tx.clone()
    }

    /// Run until SIGTERM/SIGINT
    pub async fn run(&mut self) -> Result<()> {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel::<SignalType>();
        let signal_handler = SignalHandler::with_sender(signal_tx);

        tokio::spawn(async move {
            if let Err(e) = signal_handler.listen_for_signals().await {
                error!("Signal handler error: {}", e);
            }
        });

        self.run_until(signal_rx).await
    }

    /// Event loop: queued events, the deferred menu recompute, config file
    /// changes and signals. Returns on [`SignalType::Shutdown`] or when the
    /// signal channel closes.
    pub async fn run_until(&mut self, mut signals: mpsc::UnboundedReceiver<SignalType>) -> Result<()> {
        if self.audio_listener.is_none() {
            self.start();
        }
        info!("Menu service running");

        let mut config_check = tokio::time::interval(CONFIG_CHECK_INTERVAL);
        config_check.tick().await;

        loop {
            let deadline = self.controller.pending_menu_update();

            tokio::select! {
                event = self.events_rx.recv() => {
                    match event {
                        Some(event) => self.controller.handle_event(event),
                        None => {
                            warn!("Event channel closed");
                            break;
                        }
                    }
                }
                _ = wait_until(deadline) => {
                    self.controller.flush_menu_update(Instant::now());
                }
                _ = config_check.tick() => {
                    if let Err(e) = self.check_config_reload() {
                        error!("Error checking config reload: {:#}", e);
                    }
                }
                signal = signals.recv() => {
                    match signal {
                        Some(SignalType::Reload) => {
                            if let Err(e) = self.reload_config() {
                                error!("Failed to reload configuration: {:#}", e);
                            }
                        }
                        Some(SignalType::Shutdown) => {
                            info!("Shutdown signal received, stopping menu service");
                            break;
                        }
                        None => {
                            warn!("Signal channel closed");
                            break;
                        }
                    }
                }
            }
        }

        self.stop();
        Ok(())
    }

    fn check_config_reload(&mut self) -> Result<()> {
        if let Some(last_modified) = self.last_config_modified {
            if self.config_loader.is_config_modified(last_modified)? {
                info!("Configuration file changed, reloading");
                self.reload_config()?;
            }
        }
        Ok(())
    }

    /// Re-read the configuration and apply the menu delay and padding.
    /// On error the current configuration stays in effect.
    pub fn reload_config(&mut self) -> Result<()> {
        let config = self.config_loader.reload_config()?;

        self.controller.set_update_delay(config.menu.update_delay());
        self.controller.set_padding(config.status_bar.padding);
        self.config = config;
        self.last_config_modified = self.config_loader.config_modified_time();

        info!(
            "Configuration reloaded: update delay {}ms, padding {}",
            self.config.menu.update_delay_ms, self.config.status_bar.padding
        );
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn controller(&self) -> &StatusMenuController<H, P> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut StatusMenuController<H, P> {
        &mut self.controller
    }

    pub fn is_started(&self) -> bool {
        self.audio_listener.is_some()
    }
}

impl<H, P, F> Drop for MenuService<H, P, F>
where
    H: AudioHardwareInterface,
    P: PreferencesInterface,
    F: FileSystemInterface,
{
    fn drop(&mut self) {
        if self.is_started() {
            self.stop();
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
