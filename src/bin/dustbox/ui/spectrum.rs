//! Output spectrum widget
//!
//! Hann-windowed FFT read at log-spaced frequencies, plotted on a log axis
//! with a slow fall so transients linger long enough to see.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Points drawn across the spectrum
pub const SPECTRUM_BINS: usize = 48;

const MIN_FREQ_HZ: f64 = 20.0;
const MAX_FREQ_HZ: f64 = 20_000.0;
const FLOOR_DB: f64 = -100.0;
const CEILING_DB: f64 = 0.0;
/// Peaks sink at most this far per update
const FALL_DB_PER_UPDATE: f64 = 3.0;

pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    /// FFT bin read for each display point
    bin_indices: Vec<usize>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (log10 frequency, level in dB) per display point
    points: Vec<(f64, f64)>,
    /// Sum of the window, used to normalise a full-scale sine to 0 dB
    window_gain: f32,
}

impl SpectrumAnalyzer {
    pub fn new(fft_len: usize, sample_rate: f32) -> Self {
        let fft_len = fft_len.max(2);
        let fft = FftPlanner::new().plan_fft_forward(fft_len);

        let denom = (fft_len - 1) as f32;
        let window: Vec<f32> = (0..fft_len)
            .map(|i| 0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos()))
            .collect();
        let window_gain = window.iter().sum::<f32>().max(f32::EPSILON);

        let nyquist = (sample_rate as f64 / 2.0).max(MIN_FREQ_HZ + 1.0);
        let max_freq = MAX_FREQ_HZ.min(nyquist);
        let ratio = max_freq / MIN_FREQ_HZ;
        let last_bin = fft_len / 2 - 1;

        let mut bin_indices = Vec::with_capacity(SPECTRUM_BINS);
        let mut points = Vec::with_capacity(SPECTRUM_BINS);
        for i in 0..SPECTRUM_BINS {
            let t = i as f64 / (SPECTRUM_BINS - 1) as f64;
            let freq = MIN_FREQ_HZ * ratio.powf(t);
            let index = (freq * fft_len as f64 / sample_rate as f64).round() as usize;
            bin_indices.push(index.clamp(1, last_bin.max(1)));
            points.push((freq.log10(), FLOOR_DB));
        }

        Self {
            window,
            bin_indices,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_len],
            points,
            window_gain,
        }
    }

    pub fn fft_len(&self) -> usize {
        self.window.len()
    }

    /// Analyse the newest `fft_len` samples of `buffer`. Shorter buffers are
    /// ignored.
    pub fn update(&mut self, buffer: &[f32]) {
        let len = self.window.len();
        if buffer.len() < len {
            return;
        }
        let recent = &buffer[buffer.len() - len..];

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(recent).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        // Amplitude of a windowed sine lands at half the window sum
        let norm = 2.0 / self.window_gain;
        for (point, &index) in self.points.iter_mut().zip(&self.bin_indices) {
            let magnitude = (self.scratch[index].norm() * norm).max(1e-9) as f64;
            let db = (20.0 * magnitude.log10()).clamp(FLOOR_DB, CEILING_DB);
            point.1 = db.max(point.1 - FALL_DB_PER_UPDATE);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.points
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default()
        .title(" Output spectrum ")
        .borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([MIN_FREQ_HZ.log10(), MAX_FREQ_HZ.log10()])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, CEILING_DB])
                .labels(vec!["-100", "-50", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
