/*
Pump Envelope Shape
===================

"Pumping" is the breathing gain curve of a sidechain compressor keyed from a
kick drum: the level ducks hard on every beat and swells back before the next
one. We draw that curve directly as a function of cycle phase instead of
running a compressor.

Vocabulary
----------

  phase       Position inside one tempo-synced cycle, in [0, 1).

  min gain    The deepest point of the duck. Derived from the pump amount:
                  min_gain = 1 - 0.9 * amount²
              Squaring keeps small amounts subtle.

  decay       First 28% of the cycle: the fall from 1.0 down to min gain.

  release     Remaining 72%: the swell from min gain back to 1.0.


The Shape
---------

  gain
   1.0 ┐╲                              ___──
       │ ╲                        __──
       │  ╲                   _──
       │   ╲              _─
   min │    ╲___________──
       └────┬──────────────────────────────┬──→ phase
           0.28                           1.0
          decay           release

Decay uses an ease-out quadratic (fast initial drop):

    t    = phase / 0.28
    gain = 1 - (1 - min) * t * (2 - t)

Release uses smoothstep (gentle at both ends):

    t    = (phase - 0.28) / 0.72
    gain = min + (1 - min) * t² * (3 - 2t)

Both segments meet at min gain, and the curve starts and ends at 1.0, so the
envelope is continuous across the cycle wrap.

With amount = 0, min gain is exactly 1.0 and every phase yields exactly 1.0.
*/

/// Fraction of the cycle spent falling.
pub const PUMP_DECAY_PORTION: f32 = 0.28;

/// Deepest duck reachable at full amount.
pub const PUMP_MAX_DEPTH: f32 = 0.9;

/// Minimum gain of the pump envelope for a given amount in [0, 1].
#[inline]
pub fn pump_min_gain(amount: f32) -> f32 {
    let amount = amount.clamp(0.0, 1.0);
    1.0 - PUMP_MAX_DEPTH * amount * amount
}

/// Envelope gain at `phase` (wrapped into [0, 1)) for a given minimum gain.
#[inline]
pub fn pump_gain(phase: f32, min_gain: f32) -> f32 {
    let depth = 1.0 - min_gain;
    if depth <= 0.0 {
        return 1.0;
    }

    let phase = phase - phase.floor();

    if phase < PUMP_DECAY_PORTION {
        let t = phase / PUMP_DECAY_PORTION;
        1.0 - depth * t * (2.0 - t)
    } else {
        let t = (phase - PUMP_DECAY_PORTION) / (1.0 - PUMP_DECAY_PORTION);
        min_gain + depth * t * t * (3.0 - 2.0 * t)
    }
}
