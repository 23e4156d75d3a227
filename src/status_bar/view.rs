use super::LayoutType;
use crate::audio::{DeviceId, DeviceSnapshot, format_sample_rate};
use crate::menu::submenu::INTERNAL_CLOCK;
use crate::menu::{ViewId, next_view_id};

// Rough glyph advances of the status bar fonts, in points
const LARGE_GLYPH_WIDTH: f64 = 7.0;
const SMALL_GLYPH_WIDTH: f64 = 5.5;
const GRAPHIC_WIDTH: f64 = 26.0;

const NOT_AVAILABLE: &str = "N/A";

/// Data shown by the summary view, one variant per visible layout
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryContent {
    SampleRate {
        sample_rate: String,
    },
    SampleRateAndClockSource {
        sample_rate: String,
        clock_source: String,
    },
    MasterVolumeDecibels {
        decibels: String,
        muted: bool,
    },
    MasterVolumePercent {
        percent: String,
        muted: bool,
    },
    MasterVolumeGraphic {
        level: Option<f32>,
        muted: bool,
    },
}

impl SummaryContent {
    /// Empty content for a layout; `None` for [`LayoutType::None`]
    pub fn placeholder(layout: LayoutType) -> Option<Self> {
        let content = match layout {
            LayoutType::None => return None,
            LayoutType::SampleRate => SummaryContent::SampleRate {
                sample_rate: NOT_AVAILABLE.to_string(),
            },
            LayoutType::SampleRateAndClockSource => SummaryContent::SampleRateAndClockSource {
                sample_rate: NOT_AVAILABLE.to_string(),
                clock_source: INTERNAL_CLOCK.to_string(),
            },
            LayoutType::MasterVolumeDecibels => SummaryContent::MasterVolumeDecibels {
                decibels: NOT_AVAILABLE.to_string(),
                muted: false,
            },
            LayoutType::MasterVolumePercent => SummaryContent::MasterVolumePercent {
                percent: NOT_AVAILABLE.to_string(),
                muted: false,
            },
            LayoutType::MasterVolumeGraphic => SummaryContent::MasterVolumeGraphic {
                level: None,
                muted: false,
            },
        };
        Some(content)
    }

    pub fn layout(&self) -> LayoutType {
        match self {
            SummaryContent::SampleRate { .. } => LayoutType::SampleRate,
            SummaryContent::SampleRateAndClockSource { .. } => LayoutType::SampleRateAndClockSource,
            SummaryContent::MasterVolumeDecibels { .. } => LayoutType::MasterVolumeDecibels,
            SummaryContent::MasterVolumePercent { .. } => LayoutType::MasterVolumePercent,
            SummaryContent::MasterVolumeGraphic { .. } => LayoutType::MasterVolumeGraphic,
        }
    }

    /// Re-read the displayed values from a device. Missing values fall back
    /// to placeholders.
    fn refresh(&mut self, device: Option<&DeviceSnapshot>) {
        let sample_rate = || {
            device
                .and_then(|d| d.nominal_sample_rate)
                .map(format_sample_rate)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };
        let output = device.map(|d| &d.output_volume);
        let muted = output.and_then(|v| v.muted).unwrap_or(false);

        match self {
            SummaryContent::SampleRate { sample_rate: text } => *text = sample_rate(),
            SummaryContent::SampleRateAndClockSource {
                sample_rate: rate_text,
                clock_source,
            } => {
                *rate_text = sample_rate();
                *clock_source = device
                    .and_then(|d| d.clock_source_name.clone())
                    .unwrap_or_else(|| INTERNAL_CLOCK.to_string());
            }
            SummaryContent::MasterVolumeDecibels { decibels, muted: m } => {
                *decibels = output
                    .and_then(|v| v.decibels)
                    .map(|db| format!("{:.1}dBFS", db))
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string());
                *m = muted;
            }
            SummaryContent::MasterVolumePercent { percent, muted: m } => {
                *percent = output
                    .and_then(|v| v.volume)
                    .map(|volume| format!("{:.0}%", volume * 100.0))
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string());
                *m = muted;
            }
            SummaryContent::MasterVolumeGraphic { level, muted: m } => {
                *level = output.and_then(|v| v.volume);
                *m = muted;
            }
        }
    }

    fn fitting_width(&self) -> f64 {
        let text_width = |text: &str, glyph: f64| text.chars().count() as f64 * glyph;
        match self {
            SummaryContent::SampleRate { sample_rate } => text_width(sample_rate, LARGE_GLYPH_WIDTH),
            SummaryContent::SampleRateAndClockSource {
                sample_rate,
                clock_source,
            } => text_width(sample_rate, SMALL_GLYPH_WIDTH)
                .max(text_width(clock_source, SMALL_GLYPH_WIDTH)),
            SummaryContent::MasterVolumeDecibels { decibels, .. } => {
                text_width(decibels, LARGE_GLYPH_WIDTH)
            }
            SummaryContent::MasterVolumePercent { percent, .. } => {
                text_width(percent, LARGE_GLYPH_WIDTH)
            }
            SummaryContent::MasterVolumeGraphic { .. } => GRAPHIC_WIDTH,
        }
    }
}

/// The subview currently materialised in the status bar
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryView {
    id: ViewId,
    content: SummaryContent,
    represented_device: Option<DeviceId>,
    highlighted: bool,
}

impl SummaryView {
    pub fn new(layout: LayoutType) -> Option<Self> {
        Some(Self {
            id: next_view_id(),
            content: SummaryContent::placeholder(layout)?,
            represented_device: None,
            highlighted: false,
        })
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn layout(&self) -> LayoutType {
        self.content.layout()
    }

    pub fn content(&self) -> &SummaryContent {
        &self.content
    }

    pub fn represented_device(&self) -> Option<DeviceId> {
        self.represented_device
    }

    /// Point the view at a device and refresh its displayed data
    pub fn set_represented_device(&mut self, device: Option<&DeviceSnapshot>) {
        self.represented_device = device.map(|d| d.id);
        self.content.refresh(device);
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    pub fn fitting_width(&self) -> f64 {
        self.content.fitting_width()
    }
}
