pub mod audio;
pub mod config;
pub mod controller;
pub mod events;
pub mod logging;
pub mod menu;
pub mod scenario;
pub mod service;
pub mod status_bar;
pub mod system;

pub use config::Config;
pub use controller::{ActionOutcome, StatusMenuController};
pub use scenario::Scenario;
pub use service::MenuService;
