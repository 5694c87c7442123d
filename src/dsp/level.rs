//! Gain conversion and level measurement.

/*
Decibels
========

Hearing is logarithmic: we perceive loudness ratios, not differences. Audio
engineers therefore state gain in decibels.

    dB   = 20 × log₁₀(amplitude_ratio)
    gain = 10^(dB / 20)

Common reference points:
    ×1.0    =    0 dB  (unity, no change)
    ×0.5    ≈   -6 dB
    ×0.1    =  -20 dB
    ×0.001  =  -60 dB  (faint hiss)

Measuring a Block
-----------------

  peak    Largest absolute sample. Tells you whether anything clipped.

  rms     Root of the mean of the squares. Tracks perceived loudness far
          better than peak:

              rms = sqrt( Σ x² / N )

          A full-scale sine has peak 1.0 and rms 1/√2 ≈ 0.707.
*/

/// Convert decibels to a linear gain. 0 dB is exactly 1.0.
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    if db == 0.0 {
        return 1.0;
    }
    10.0f32.powf(db / 20.0)
}

/// Convert a linear gain to decibels, floored at `floor_db`.
#[inline]
pub fn gain_to_db(gain: f32, floor_db: f32) -> f32 {
    if gain <= 0.0 {
        return floor_db;
    }
    (20.0 * gain.log10()).max(floor_db)
}

/// Largest absolute sample.
pub fn peak(buffer: &[f32]) -> f32 {
    buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

/// Root-mean-square level. Empty buffers measure 0.
pub fn rms(buffer: &[f32]) -> f32 {
    if buffer.is_empty() {
        return 0.0;
    }
    let sum: f32 = buffer.iter().map(|&x| x * x).sum();
    (sum / buffer.len() as f32).sqrt()
}
