pub mod debounce;
pub mod item;
pub mod registry;
pub mod submenu;
pub mod volume_control;

use std::sync::atomic::{AtomicU64, Ordering};

pub use debounce::Debouncer;
pub use item::{ActionIcon, ActionItem, DeviceMenuItem, MenuAction, MenuItem, StatusMenu};
pub use registry::DeviceRegistry;
pub use submenu::{TransportIcon, build_submenu};
pub use volume_control::{VolumeControlLayout, VolumeControlView};

/// Identity of a constructed view, used to tell a refreshed view from a
/// rebuilt one
pub type ViewId = u64;

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_view_id() -> ViewId {
    NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed)
}
