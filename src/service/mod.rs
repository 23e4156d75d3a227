pub mod menu_service;
pub mod signals;

pub use menu_service::MenuService;
pub use signals::{SignalHandler, SignalType};
