//! Level meter widget
//!
//! Audio-thread meters jump block to block; the display eases toward them so
//! the bars stay readable at ~60 fps.

use dustbox::{dsp::level::gain_to_db, engine::MeterBank};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Gauge},
    Frame,
};

/// Fraction of the gap to the new reading closed each frame.
pub const METER_SMOOTHING: f32 = 0.35;
/// Frames the clip light stays on after the last clipped block.
pub const CLIP_HOLD_FRAMES: u32 = 20;
/// Channels drawn per meter.
pub const DISPLAY_CHANNELS: usize = 2;

const DISPLAY_FLOOR_DB: f32 = -60.0;
const DISPLAY_AMPLITUDE_RANGE: (f32, f32) = (1.0e-5, 8.0);
const HOT_PROPORTION: f64 = 0.9;

/// Map a linear amplitude onto 0..1 across a -60 dB to 0 dB scale.
pub fn display_proportion(amplitude: f32) -> f32 {
    let clamped = amplitude.clamp(DISPLAY_AMPLITUDE_RANGE.0, DISPLAY_AMPLITUDE_RANGE.1);
    let db = gain_to_db(clamped, DISPLAY_FLOOR_DB);
    ((db - DISPLAY_FLOOR_DB) / -DISPLAY_FLOOR_DB).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelDisplay {
    pub peak: f32,
    pub rms: f32,
}

/// Smoothed view of one [`MeterBank`].
#[derive(Debug, Clone, Default)]
pub struct MeterDisplay {
    channels: [ChannelDisplay; DISPLAY_CHANNELS],
    active: usize,
    clip_hold: u32,
}

impl MeterDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pull the latest readings from `bank`. Call once per frame.
    pub fn update(&mut self, bank: &MeterBank) {
        self.active = bank.channel_count().min(DISPLAY_CHANNELS);
        let mut clipped = false;

        for (ch, display) in self.channels.iter_mut().enumerate() {
            if ch < self.active {
                let reading = bank.reading(ch);
                let peak = display_proportion(reading.peak);
                let rms = display_proportion(reading.rms);
                display.peak += METER_SMOOTHING * (peak - display.peak);
                display.rms += METER_SMOOTHING * (rms - display.rms);
                clipped |= reading.clip;
            } else {
                display.peak *= 0.5;
                display.rms *= 0.5;
            }
        }

        if clipped {
            self.clip_hold = CLIP_HOLD_FRAMES;
        } else {
            self.clip_hold = self.clip_hold.saturating_sub(1);
        }
    }

    pub fn channel(&self, ch: usize) -> ChannelDisplay {
        self.channels.get(ch).copied().unwrap_or_default()
    }

    pub fn active_channels(&self) -> usize {
        self.active
    }

    pub fn is_clip_lit(&self) -> bool {
        self.clip_hold > 0
    }
}

fn proportion_to_db(proportion: f32) -> f32 {
    DISPLAY_FLOOR_DB + proportion * -DISPLAY_FLOOR_DB
}

/// Render one meter group: a gauge per channel showing peak, labelled with
/// peak and rms in dBFS.
pub fn render_meters(frame: &mut Frame, area: Rect, title: &str, display: &MeterDisplay) {
    let title = if display.is_clip_lit() {
        format!(" {title} CLIP ")
    } else {
        format!(" {title} ")
    };
    let border_color = if display.is_clip_lit() {
        Color::Red
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1); DISPLAY_CHANNELS])
        .split(inner);

    for (ch, row) in rows.iter().enumerate() {
        let levels = display.channel(ch);
        let ratio = (levels.peak as f64).clamp(0.0, 1.0);
        let color = if display.is_clip_lit() {
            Color::Red
        } else if ratio >= HOT_PROPORTION {
            Color::Yellow
        } else {
            Color::Green
        };
        let label = if ch < display.active_channels() {
            format!(
                "{:>6.1} pk {:>6.1} rms",
                proportion_to_db(levels.peak),
                proportion_to_db(levels.rms)
            )
        } else {
            String::from("--")
        };

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(color).bg(Color::Black))
            .ratio(ratio)
            .label(label);
        frame.render_widget(gauge, *row);
    }
}
