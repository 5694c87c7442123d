//! Linear parameter smoothing.

/*
Parameter Smoothing
===================

Parameters arrive once per block but audio runs once per sample. Jumping a
gain from 0.2 to 0.9 between two samples puts a step in the waveform, which
we hear as a click ("zipper noise" when it happens repeatedly).

A smoother walks the value from where it is to where it should be over a
fixed ramp time, in equal increments:

    value
     0.9 ┤            ________________ target
         │          ╱
         │        ╱
         │      ╱
     0.2 ┤_____╱
         └────┬──────┬───────────────→ samples
            set    ramp ends
          target   (current = target exactly)

Vocabulary
----------

  target      Where the value is heading.

  current     Where the value is now. Returned by next().

  ramp        Number of samples the transition takes:
                  ramp = round(seconds * sample_rate)

  snap        Jump straight to a value with no ramp. Used on reset so a
              freshly prepared processor starts at its configured setting.

When the ramp finishes, current is set to target exactly rather than left at
the accumulated sum of increments. Downstream checks like "is the wet level
zero?" can then use exact comparisons.

Setting a new target mid-ramp restarts the ramp from the current value.
Setting the same target again is a no-op.
*/

#[derive(Debug, Clone, Copy, Default)]
pub struct SmoothedValue {
    current: f32,
    target: f32,
    step: f32,
    remaining: u32,
    ramp_samples: u32,
}

impl SmoothedValue {
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            ..Self::default()
        }
    }

    /// Set the ramp length. Any ramp in progress is finished immediately.
    pub fn reset(&mut self, sample_rate: f32, ramp_seconds: f32) {
        self.ramp_samples = (ramp_seconds * sample_rate).round().max(0.0) as u32;
        self.snap(self.target);
    }

    pub fn set_target(&mut self, target: f32) {
        if target == self.target {
            return;
        }

        self.target = target;

        if self.ramp_samples == 0 {
            self.current = target;
            self.remaining = 0;
            return;
        }

        self.remaining = self.ramp_samples;
        self.step = (self.target - self.current) / self.ramp_samples as f32;
    }

    /// Jump to `value` with no ramp.
    pub fn snap(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.remaining = 0;
    }

    #[inline]
    pub fn next(&mut self) -> f32 {
        if self.remaining == 0 {
            return self.current;
        }

        self.remaining -= 1;
        if self.remaining == 0 {
            self.current = self.target;
        } else {
            self.current += self.step;
        }
        self.current
    }

    /// Advance `samples` steps at once.
    pub fn skip(&mut self, samples: usize) {
        if samples as u64 >= self.remaining as u64 {
            self.current = self.target;
            self.remaining = 0;
        } else {
            self.remaining -= samples as u32;
            self.current += self.step * samples as f32;
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_smoothing(&self) -> bool {
        self.remaining > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaches_target_exactly() {
        let mut value = SmoothedValue::new(0.0);
        value.reset(1_000.0, 0.01); // 10 samples
        value.set_target(0.7);

        for _ in 0..9 {
            value.next();
            assert!(value.is_smoothing());
        }
        assert_eq!(value.next(), 0.7);
        assert!(!value.is_smoothing());
        assert_eq!(value.next(), 0.7);
    }

    #[test]
    fn ramps_monotonically() {
        let mut value = SmoothedValue::new(0.0);
        value.reset(48_000.0, 0.03);
        value.set_target(1.0);

        let mut last = 0.0;
        while value.is_smoothing() {
            let v = value.next();
            assert!(v >= last);
            last = v;
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn zero_ramp_jumps() {
        let mut value = SmoothedValue::new(0.2);
        value.reset(48_000.0, 0.0);
        value.set_target(0.9);
        assert!(!value.is_smoothing());
        assert_eq!(value.current(), 0.9);
    }

    #[test]
    fn same_target_does_not_restart() {
        let mut value = SmoothedValue::new(0.0);
        value.reset(1_000.0, 0.01);
        value.set_target(1.0);
        for _ in 0..5 {
            value.next();
        }
        let midway = value.current();
        value.set_target(1.0);
        assert_eq!(value.current(), midway);
        for _ in 0..5 {
            value.next();
        }
        assert_eq!(value.current(), 1.0);
    }

    #[test]
    fn snap_cancels_ramp() {
        let mut value = SmoothedValue::new(0.0);
        value.reset(1_000.0, 0.01);
        value.set_target(1.0);
        value.next();
        value.snap(0.25);
        assert!(!value.is_smoothing());
        assert_eq!(value.next(), 0.25);
        assert_eq!(value.target(), 0.25);
    }

    #[test]
    fn skip_matches_stepping() {
        let mut stepped = SmoothedValue::new(0.0);
        let mut skipped = SmoothedValue::new(0.0);
        stepped.reset(1_000.0, 0.1);
        skipped.reset(1_000.0, 0.1);
        stepped.set_target(1.0);
        skipped.set_target(1.0);

        for _ in 0..40 {
            stepped.next();
        }
        skipped.skip(40);
        assert!((stepped.current() - skipped.current()).abs() < 1e-5);

        skipped.skip(1_000);
        assert_eq!(skipped.current(), 1.0);
        assert!(!skipped.is_smoothing());
    }
}
