use anyhow::{Context, Result};
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

/// What the menu service does with a process signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalType {
    /// SIGTERM or SIGINT: unsubscribe and leave the event loop
    Shutdown,
    /// SIGHUP: re-read the configuration file
    Reload,
}

impl SignalType {
    pub fn from_signal(signal: i32) -> Option<Self> {
        match signal {
            SIGTERM | SIGINT => Some(SignalType::Shutdown),
            SIGHUP => Some(SignalType::Reload),
            _ => None,
        }
    }
}

/// Forwards process signals into the menu service's signal channel
pub struct SignalHandler {
    signal_sender: mpsc::UnboundedSender<SignalType>,
}

impl SignalHandler {
    pub fn with_sender(signal_sender: mpsc::UnboundedSender<SignalType>) -> Self {
        Self { signal_sender }
    }

    /// Forward signals until a shutdown is requested or the service goes away
    pub async fn listen_for_signals(&self) -> Result<()> {
        let mut signals =
            Signals::new([SIGTERM, SIGINT, SIGHUP]).context("Failed to register signal handlers")?;
        let handle = signals.handle();
        debug!("Listening for SIGTERM, SIGINT and SIGHUP");

        while let Some(signal) = signals.next().await {
            let Some(signal_type) = SignalType::from_signal(signal) else {
                warn!("Ignoring unexpected signal {}", signal);
                continue;
            };
            info!("Received signal {} ({:?})", signal, signal_type);

            if self.signal_sender.send(signal_type).is_err() {
                warn!("Menu service is gone, no longer forwarding signals");
                break;
            }
            if signal_type == SignalType::Shutdown {
                break;
            }
        }

        handle.close();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_mapping() {
        assert_eq!(SignalType::from_signal(SIGTERM), Some(SignalType::Shutdown));
        assert_eq!(SignalType::from_signal(SIGINT), Some(SignalType::Shutdown));
        assert_eq!(SignalType::from_signal(SIGHUP), Some(SignalType::Reload));
        assert_eq!(SignalType::from_signal(signal_hook::consts::signal::SIGUSR1), None);
    }
}
