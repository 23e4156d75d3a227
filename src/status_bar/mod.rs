//! Status-bar summary view and the selector deciding which layout it shows.

pub mod view;

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::audio::DeviceSnapshot;

pub use view::{SummaryContent, SummaryView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutType {
    #[default]
    None,
    SampleRate,
    SampleRateAndClockSource,
    MasterVolumeDecibels,
    MasterVolumePercent,
    MasterVolumeGraphic,
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayoutType::None => "none",
            LayoutType::SampleRate => "sample rate",
            LayoutType::SampleRateAndClockSource => "sample rate and clock source",
            LayoutType::MasterVolumeDecibels => "master volume (dB)",
            LayoutType::MasterVolumePercent => "master volume (%)",
            LayoutType::MasterVolumeGraphic => "master volume (graphic)",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of a selector evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusBarUpdate {
    pub layout: LayoutType,
    /// A new subview was constructed (or the old one discarded)
    pub rebuilt: bool,
    /// New status item length, reported while the summary view is visible
    pub length: Option<f64>,
}

/// Summary view host. Tracks the effective layout, which degrades to
/// [`LayoutType::None`] whenever there is no live featured device.
#[derive(Debug, Clone)]
pub struct StatusBar {
    effective_layout: LayoutType,
    subview: Option<SummaryView>,
    hidden: bool,
    shows_fallback_icon: bool,
    tooltip: Option<String>,
    enabled: bool,
    highlighted: bool,
    padding: f64,
    length: f64,
}

impl StatusBar {
    pub fn new(padding: f64) -> Self {
        Self {
            effective_layout: LayoutType::None,
            subview: None,
            hidden: true,
            shows_fallback_icon: true,
            tooltip: None,
            enabled: true,
            highlighted: false,
            padding,
            length: 0.0,
        }
    }

    /// Layout that should be materialised for a stored preference and the
    /// current featured device
    pub fn target_layout(preferred: LayoutType, featured: Option<&DeviceSnapshot>) -> LayoutType {
        match featured {
            Some(device) if device.is_alive => preferred,
            _ => LayoutType::None,
        }
    }

    /// Evaluate the selector. Rebuilds the subview only when the target
    /// layout differs from the effective one; otherwise refreshes its data.
    pub fn update(&mut self, preferred: LayoutType, featured: Option<&DeviceSnapshot>) -> StatusBarUpdate {
        let layout = Self::target_layout(preferred, featured);

        if layout != LayoutType::None {
            self.hidden = false;
            self.shows_fallback_icon = false;
        }

        let rebuilt = layout != self.effective_layout;
        if rebuilt {
            debug!(
                "Status bar layout changes from {} to {}",
                self.effective_layout, layout
            );
            self.subview = SummaryView::new(layout);
            if let Some(subview) = self.subview.as_mut() {
                subview.set_highlighted(self.highlighted);
            }
            if layout == LayoutType::None {
                self.hidden = true;
                self.shows_fallback_icon = true;
            }
            self.effective_layout = layout;
        }

        if layout == LayoutType::None {
            self.tooltip = None;
        } else {
            if let Some(subview) = self.subview.as_mut() {
                subview.set_represented_device(featured);
            }
            self.tooltip = featured
                .map(|device| format!("{} is the device currently being displayed", device.name));
        }

        StatusBarUpdate {
            layout,
            rebuilt,
            length: self.relayout(),
        }
    }

    /// Recompute the preferred width. Returns it while the view is visible.
    pub fn relayout(&mut self) -> Option<f64> {
        if self.hidden {
            return None;
        }
        let fitting = self.subview.as_ref().map_or(0.0, |view| view.fitting_width());
        self.length = (fitting + self.padding).round();
        Some(self.length)
    }

    pub fn effective_layout(&self) -> LayoutType {
        self.effective_layout
    }

    pub fn subview(&self) -> Option<&SummaryView> {
        self.subview.as_ref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Whether the static app icon is shown in place of the summary view
    pub fn shows_fallback_icon(&self) -> bool {
        self.shows_fallback_icon
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    pub fn set_padding(&mut self, padding: f64) {
        self.padding = padding;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Highlight the current subview. Subviews built later inherit the state.
    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
        if let Some(subview) = self.subview.as_mut() {
            subview.set_highlighted(highlighted);
        }
    }
}

impl fmt::Display for StatusBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hidden {
            return write!(f, "[app icon]");
        }
        match self.subview.as_ref().map(|view| view.content()) {
            Some(SummaryContent::SampleRate { sample_rate }) => write!(f, "[{}]", sample_rate)?,
            Some(SummaryContent::SampleRateAndClockSource {
                sample_rate,
                clock_source,
            }) => write!(f, "[{} | {}]", sample_rate, clock_source)?,
            Some(SummaryContent::MasterVolumeDecibels { decibels, muted }) => {
                write!(f, "[{}{}]", decibels, if *muted { " muted" } else { "" })?
            }
            Some(SummaryContent::MasterVolumePercent { percent, muted }) => {
                write!(f, "[{}{}]", percent, if *muted { " muted" } else { "" })?
            }
            Some(SummaryContent::MasterVolumeGraphic { level, muted }) => {
                let bars = level.map_or(0, |level| (level * 10.0).round() as usize);
                write!(
                    f,
                    "[{:<10}{}]",
                    "|".repeat(bars),
                    if *muted { " muted" } else { "" }
                )?
            }
            None => write!(f, "[]")?,
        }
        if let Some(tooltip) = &self.tooltip {
            write!(f, " ({})", tooltip)?;
        }
        write!(f, " width={}", self.length)
    }
}
