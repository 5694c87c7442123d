//! TUI for live mode
//!
//! Shows input/output meters and the output spectrum, and turns key presses
//! into parameter changes the audio thread picks up on its next block.

mod meters;
mod spectrum;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use dustbox::{
    engine::ScopeReader, params::OUTPUT_GAIN_RANGE_DB, LevelMeters, SharedParameters,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use std::{sync::Arc, time::Duration};

use meters::{render_meters, MeterDisplay};
use spectrum::{render_spectrum, SpectrumAnalyzer};

/// Samples fed to the spectrum each frame
const FFT_LEN: usize = 2048;
const WET_STEP: f32 = 0.05;
const GAIN_STEP_DB: f32 = 0.5;

/// Fixed facts about the running session.
pub struct SessionInfo {
    pub preset: String,
    pub sample_rate: f32,
    pub channels: usize,
    pub bpm: f64,
}

pub struct LiveUi {
    info: SessionInfo,
    params: Arc<SharedParameters>,
    meters: Arc<LevelMeters>,
    scope: ScopeReader,
    scope_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    input_display: MeterDisplay,
    output_display: MeterDisplay,
    should_quit: bool,
}

impl LiveUi {
    pub fn new(
        info: SessionInfo,
        params: Arc<SharedParameters>,
        meters: Arc<LevelMeters>,
        scope: ScopeReader,
    ) -> Self {
        let spectrum = SpectrumAnalyzer::new(FFT_LEN, info.sample_rate);
        Self {
            info,
            params,
            meters,
            scope,
            scope_buffer: Vec::with_capacity(FFT_LEN * 2),
            spectrum,
            input_display: MeterDisplay::new(),
            output_display: MeterDisplay::new(),
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();

            terminal.draw(|frame| self.render(frame))?;

            // ~60 fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }
        Ok(())
    }

    fn poll_audio(&mut self) {
        self.scope.drain_into(&mut self.scope_buffer, self.spectrum.fft_len());
        self.spectrum.update(&self.scope_buffer);
        self.input_display.update(&self.meters.input);
        self.output_display.update(&self.meters.output);
    }

    fn handle_key(&mut self, key: KeyCode) {
        let global = self.params.snapshot().global;
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('b') | KeyCode::Char(' ') => {
                self.params.set_bypass(!global.bypass);
            }
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => {
                self.params
                    .set_wet_mix((global.wet_mix + WET_STEP).min(1.0));
            }
            KeyCode::Char('-') | KeyCode::Left => {
                self.params
                    .set_wet_mix((global.wet_mix - WET_STEP).max(0.0));
            }
            KeyCode::Up => {
                self.params.set_output_gain_db(
                    (global.output_gain_db + GAIN_STEP_DB).min(OUTPUT_GAIN_RANGE_DB.1),
                );
            }
            KeyCode::Down => {
                self.params.set_output_gain_db(
                    (global.output_gain_db - GAIN_STEP_DB).max(OUTPUT_GAIN_RANGE_DB.0),
                );
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status
                Constraint::Length(4), // Meters
                Constraint::Min(8),    // Spectrum
                Constraint::Length(1), // Help
            ])
            .split(frame.area());

        self.render_status(frame, chunks[0]);

        let meter_row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);
        render_meters(frame, meter_row[0], "Input", &self.input_display);
        render_meters(frame, meter_row[1], "Output", &self.output_display);

        render_spectrum(frame, chunks[2], self.spectrum.data());

        let help = Paragraph::new(
            " [Q] Quit  [B] Bypass  [+/-] Wet mix  [Up/Down] Output gain",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let params = self.params.snapshot();
        let global = params.global;

        let block = Block::default().title(" dustbox ").borders(Borders::ALL);

        let (bypass_text, bypass_color) = if global.bypass {
            ("BYPASS", Color::Yellow)
        } else {
            ("ACTIVE", Color::Green)
        };

        let line = Line::from(vec![
            Span::styled(
                format!(" {}  ", self.info.preset),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(format!("{bypass_text}  "), Style::default().fg(bypass_color)),
            Span::styled(
                format!("Wet {:>3.0}%  ", global.wet_mix * 100.0),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                format!("Gain {:+.1} dB  ", global.output_gain_db),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                format!(
                    "Pump {} @ {:.0} BPM  ",
                    params.pump.division.label(),
                    self.info.bpm
                ),
                Style::default().fg(Color::Magenta),
            ),
            Span::styled(
                format!(
                    "{:.1}kHz {}ch",
                    self.info.sample_rate / 1000.0,
                    self.info.channels
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]);

        frame.render_widget(Paragraph::new(line).block(block), area);
    }
}
