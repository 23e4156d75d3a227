use super::item::MenuAction;
use super::{ViewId, next_view_id};
use crate::audio::{DeviceId, Direction, VolumeState};

const SIDE_MARGIN: f32 = 21.0;
const LABEL_HEIGHT: f32 = 17.0;
const LABEL_TO_CHECKBOX: f32 = 4.0;
const SLIDER_TO_CHECKBOX: f32 = 8.0;
const SLIDER_HEIGHT: f32 = 21.0;
const CHECKBOX_SIZE: (f32, f32) = (52.0, 18.0);

#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    pub min: f32,
    pub max: f32,
    pub value: f32,
    pub enabled: bool,
    pub continuous: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Checkbox {
    pub checked: bool,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    pub fn mid_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// Frames of the three subviews, top-left origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeControlLayout {
    pub label: Rect,
    pub slider: Rect,
    pub mute_checkbox: Rect,
    pub height: f32,
}

/// Master volume row embedded in a device submenu: a label with the dB
/// value, a volume slider and a mute checkbox. Both controls carry the
/// device and direction they act on.
///
/// Views outlive submenu rebuilds so a slider being dragged is not replaced
/// underneath the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeControlView {
    id: ViewId,
    device: DeviceId,
    direction: Direction,
    pub label: String,
    pub slider: Slider,
    pub mute_checkbox: Checkbox,
}

impl VolumeControlView {
    pub fn new(device: DeviceId, direction: Direction) -> Self {
        Self {
            id: next_view_id(),
            device,
            direction,
            label: String::new(),
            slider: Slider {
                min: 0.0,
                max: 1.0,
                value: 1.0,
                enabled: false,
                continuous: true,
            },
            mute_checkbox: Checkbox {
                checked: false,
                enabled: false,
            },
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn device(&self) -> DeviceId {
        self.device
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Enable or disable the controls depending on whether the volume can
    /// be read at all.
    pub fn configure(&mut self, state: &VolumeState) {
        self.slider.min = 0.0;
        self.slider.max = 1.0;

        match state.volume {
            Some(volume) => {
                self.slider.enabled = true;
                self.slider.continuous = true;
                self.slider.value = volume;
                self.mute_checkbox.enabled = true;
                self.mute_checkbox.checked = state.muted.unwrap_or(false);
            }
            None => {
                self.slider.enabled = false;
                self.slider.value = 1.0;
                self.mute_checkbox.enabled = false;
                self.mute_checkbox.checked = false;
            }
        }
    }

    /// Push the latest live values into the existing controls. Leaves the
    /// view untouched when the volume cannot be read.
    pub fn refresh(&mut self, state: &VolumeState) {
        let Some(volume) = state.volume else {
            return;
        };

        let decibels = state.decibels.unwrap_or(0.0);
        self.label = volume_label(self.direction, decibels);
        self.slider.value = volume;
        self.mute_checkbox.checked = state.muted.unwrap_or(false);
    }

    /// Move the slider as the user would; returns the action to perform
    pub fn slide_to(&mut self, value: f32) -> Option<MenuAction> {
        if !self.slider.enabled {
            return None;
        }
        self.slider.value = value.clamp(self.slider.min, self.slider.max);
        Some(MenuAction::SetVolume {
            device: self.device,
            direction: self.direction,
            volume: self.slider.value,
        })
    }

    /// Flip the mute checkbox as the user would; returns the action to perform
    pub fn toggle_mute(&mut self) -> Option<MenuAction> {
        if !self.mute_checkbox.enabled {
            return None;
        }
        self.mute_checkbox.checked = !self.mute_checkbox.checked;
        Some(MenuAction::SetMute {
            device: self.device,
            direction: self.direction,
            muted: self.mute_checkbox.checked,
        })
    }

    /// Lay out label, slider and checkbox inside a row of the given width.
    ///
    /// The label spans the row at the top; the checkbox sits under it on the
    /// right and keeps its intrinsic size; the slider takes whatever is left
    /// and is centred vertically on the checkbox.
    pub fn layout(&self, width: f32) -> VolumeControlLayout {
        let label = Rect {
            x: SIDE_MARGIN,
            y: 0.0,
            width: (width - 2.0 * SIDE_MARGIN).max(0.0),
            height: LABEL_HEIGHT,
        };

        let (checkbox_width, checkbox_height) = CHECKBOX_SIZE;
        let mute_checkbox = Rect {
            x: (width - SIDE_MARGIN - checkbox_width).max(SIDE_MARGIN),
            y: label.max_y() + LABEL_TO_CHECKBOX,
            width: checkbox_width,
            height: checkbox_height,
        };

        let slider = Rect {
            x: SIDE_MARGIN,
            y: mute_checkbox.mid_y() - SLIDER_HEIGHT / 2.0,
            width: (mute_checkbox.x - SLIDER_TO_CHECKBOX - SIDE_MARGIN).max(0.0),
            height: SLIDER_HEIGHT,
        };

        let height = label.max_y().max(mute_checkbox.max_y()).max(slider.max_y());

        VolumeControlLayout {
            label,
            slider,
            mute_checkbox,
            height,
        }
    }
}

pub fn volume_label(direction: Direction, decibels: f32) -> String {
    match direction {
        Direction::Input => format!("Master Input Volume is {:.1}dBFS", decibels),
        Direction::Output => format!("Master Output Volume is {:.1}dBFS", decibels),
    }
}
