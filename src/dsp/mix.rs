//! Signal mixing and crossfading primitives.

/*
Signal Mixing
=============

Mixing combines two signals by ADDING them together with weights. Effects use
it to blend the untouched input (dry) with the processed signal (wet).

Vocabulary
----------

  crossfade     Transitioning between two signals using complementary weights.
                As one fades out, the other fades in.

  wet/dry       dry = original signal (unprocessed)
                wet = effect signal (processed)
                A "30% wet" mix means mix = 0.3.

  summing       Adding signals at equal levels (no weighting), e.g. injecting
                hiss. Can exceed [-1.0, +1.0].


Linear vs Equal-Power Crossfade
-------------------------------

LINEAR:

    weight_dry = 1.0 - mix
    weight_wet = mix

    Perceived loudness DIPS in the middle. Two uncorrelated signals at 50%
    each don't sound as loud as one at 100%: power adds, not amplitude.

    We still use linear blends where the two sides are strongly correlated
    (reverb return, bypass crossfade) or where the ramp is only a few
    milliseconds long.

EQUAL-POWER (the main wet/dry control):

    weight_dry = cos(mix × π/2)
    weight_wet = sin(mix × π/2)

    weight_dry² + weight_wet² = 1 for every mix, so the summed POWER of two
    uncorrelated signals stays constant through the blend.

    At mix = 0.5 both weights are √2/2 ≈ 0.7071 (-3 dB each).

    Level
      1.0 ──────╮          ╭──────
                  ╲  ╱╲  ╱
      0.707        ╳    ╳   ← -3 dB crosspoint
                  ╱  ╲╱  ╲
      0.0 ──────╯          ╰──────
          0.0     0.5     1.0
                  mix

The endpoints are pinned: mix = 0 gives exactly (1, 0) and mix = 1 gives
exactly (0, 1), so a fully wet or fully dry setting is bit-exact rather than
off by the rounding error of cos(π/2).
*/

use std::f32::consts::FRAC_PI_2;

/// Dry and wet weights for one mix position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixGains {
    pub dry: f32,
    pub wet: f32,
}

/// Equal-power (sine/cosine law) weights for `mix` in [0, 1].
#[inline]
pub fn equal_power_gains(mix: f32) -> MixGains {
    if mix <= 0.0 {
        return MixGains { dry: 1.0, wet: 0.0 };
    }
    if mix >= 1.0 {
        return MixGains { dry: 0.0, wet: 1.0 };
    }

    let angle = mix * FRAC_PI_2;
    MixGains {
        dry: angle.cos(),
        wet: angle.sin(),
    }
}

/// Blend dry and wet samples using linear crossfade (single sample version).
///
/// output = (dry × (1-mix)) + (wet × mix)
#[inline]
pub fn blend_dry_wet(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}

/// Add signal B into signal A in-place (summing).
///
/// ⚠️ WARNING: Can exceed [-1.0, +1.0] range!
#[inline]
pub fn sum_in_place(a: &mut [f32], b: &[f32]) {
    debug_assert!(b.len() >= a.len());

    for (sa, &sb) in a.iter_mut().zip(b.iter()) {
        *sa += sb;
    }
}
