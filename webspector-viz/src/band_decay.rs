use crate::error::ConfigError;
use crate::types::{BandArray, BandHeights, BAND_COUNT};

/// How far a falling band moves towards its new value each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum DecayMode {
    /// Fall by a fixed amount per frame.
    Linear { step: f32 },
    /// Fall by `ratio` of the remaining distance, but at least `min_step`.
    Proportional { ratio: f32, min_step: f32 },
}

impl DecayMode {
    fn step(&self, old: f32, new: f32) -> f32 {
        match *self {
            DecayMode::Linear { step } => step,
            DecayMode::Proportional { ratio, min_step } => ((old - new) * ratio).max(min_step),
        }
    }
}

/// What a band did on the last frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum BandPhase {
    /// Jumped up to a higher (or equal) value.
    Rising,
    /// Still above the new value, stepping down.
    Decaying,
    /// Reached the new value from above.
    Holding,
}

/// Displayed band values and the phase each band is in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayState {
    heights: BandArray,
    phases: [BandPhase; BAND_COUNT],
}

impl DecayState {
    pub const fn new() -> Self {
        Self {
            heights: [0.0; BAND_COUNT],
            phases: [BandPhase::Holding; BAND_COUNT],
        }
    }

    pub fn heights(&self) -> &BandArray {
        &self.heights
    }

    pub fn phases(&self) -> &[BandPhase; BAND_COUNT] {
        &self.phases
    }
}

impl Default for DecayState {
    fn default() -> Self {
        Self::new()
    }
}

/// Rise-immediately, fall-gradually filter applied to every band.
pub struct DecayEngine {
    mode: DecayMode,
}

impl DecayEngine {
    pub fn new(mode: DecayMode) -> Result<Self, ConfigError> {
        let valid = match mode {
            DecayMode::Linear { step } => step.is_finite() && step > 0.0,
            DecayMode::Proportional { ratio, min_step } => {
                ratio.is_finite()
                    && ratio > 0.0
                    && ratio <= 1.0
                    && min_step.is_finite()
                    && min_step > 0.0
            }
        };
        if !valid {
            return Err(ConfigError::DecayStep);
        }
        Ok(Self { mode })
    }

    pub fn mode(&self) -> DecayMode {
        self.mode
    }

    /// Moves one band from `old` towards `new`. A falling band never
    /// undershoots `new`.
    pub fn step_band(&self, old: f32, new: f32) -> (f32, BandPhase) {
        if new >= old {
            return (new, BandPhase::Rising);
        }
        let next = (old - self.mode.step(old, new)).max(new);
        if next > new {
            (next, BandPhase::Decaying)
        } else {
            (new, BandPhase::Holding)
        }
    }

    pub fn smooth(&self, bands: &BandArray, prior: &DecayState) -> DecayState {
        let mut next = DecayState::new();
        for i in 0..BAND_COUNT {
            let (height, phase) = self.step_band(prior.heights[i], bands[i]);
            next.heights[i] = height;
            next.phases[i] = phase;
        }
        next
    }
}

/// Peak markers that jump to each new bar maximum, hold briefly, then fall.
pub struct PeakHold {
    fall: u8,
    hold_frames: u8,
    peaks: BandHeights,
    hold: BandHeights,
}

impl PeakHold {
    /// `fall` is the marker drop per frame once the hold has run out.
    pub fn new(fall: u8, hold_frames: u8) -> Result<Self, ConfigError> {
        if fall == 0 {
            return Err(ConfigError::PeakFall);
        }
        Ok(Self {
            fall,
            hold_frames,
            peaks: [0; BAND_COUNT],
            hold: [0; BAND_COUNT],
        })
    }

    pub fn update(&mut self, bars: &BandHeights) -> &BandHeights {
        for i in 0..BAND_COUNT {
            let bar = bars[i];
            if bar >= self.peaks[i] {
                self.peaks[i] = bar;
                self.hold[i] = self.hold_frames;
            } else if self.hold[i] > 0 {
                self.hold[i] -= 1;
            } else {
                self.peaks[i] = self.peaks[i].saturating_sub(self.fall).max(bar);
            }
        }
        &self.peaks
    }

    pub fn peaks(&self) -> &BandHeights {
        &self.peaks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(step: f32) -> DecayEngine {
        DecayEngine::new(DecayMode::Linear { step }).unwrap()
    }

    #[test]
    fn test_rejects_non_positive_steps() {
        assert!(DecayEngine::new(DecayMode::Linear { step: 0.0 }).is_err());
        assert!(DecayEngine::new(DecayMode::Linear { step: f32::NAN }).is_err());
        assert!(DecayEngine::new(DecayMode::Proportional {
            ratio: 1.5,
            min_step: 0.1
        })
        .is_err());
        assert!(DecayEngine::new(DecayMode::Proportional {
            ratio: 0.5,
            min_step: 0.0
        })
        .is_err());
    }

    #[test]
    fn test_rising_band_snaps_up() {
        let engine = linear(1.0);
        assert_eq!(engine.step_band(3.0, 40.0), (40.0, BandPhase::Rising));
        assert_eq!(engine.step_band(40.0, 40.0), (40.0, BandPhase::Rising));
    }

    #[test]
    fn test_linear_decay_is_monotonic_and_stops_at_target() {
        let engine = linear(3.0);
        let target = 10.0;
        let mut height = 40.0;
        let mut frames = 0;
        loop {
            let (next, phase) = engine.step_band(height, target);
            assert!(next >= target);
            if phase == BandPhase::Holding {
                assert_eq!(next, target);
                break;
            }
            assert_eq!(phase, BandPhase::Decaying);
            assert!(next < height);
            height = next;
            frames += 1;
        }
        assert_eq!(frames, 9);
        assert_eq!(engine.step_band(target, target).0, target);
    }

    #[test]
    fn test_proportional_decay_reaches_target() {
        let engine = DecayEngine::new(DecayMode::Proportional {
            ratio: 0.25,
            min_step: 0.5,
        })
        .unwrap();
        let mut height = 64.0;
        for _ in 0..100 {
            let (next, _) = engine.step_band(height, 2.0);
            assert!(next >= 2.0 && (next < height || next == 2.0));
            height = next;
        }
        assert_eq!(height, 2.0);
    }

    #[test]
    fn test_smooth_updates_every_band() {
        let engine = linear(2.0);
        let mut prior = DecayState::new();
        let mut bands = [0.0; BAND_COUNT];
        bands[0] = 10.0;
        bands[64] = 5.0;
        prior = engine.smooth(&bands, &prior);
        assert_eq!(prior.heights()[0], 10.0);
        assert_eq!(prior.phases()[0], BandPhase::Rising);

        let next = engine.smooth(&[0.0; BAND_COUNT], &prior);
        assert_eq!(next.heights()[0], 8.0);
        assert_eq!(next.heights()[64], 3.0);
        assert_eq!(next.phases()[0], BandPhase::Decaying);
        assert_eq!(next.heights()[1], 0.0);
    }

    #[test]
    fn test_peak_hold_rejects_zero_fall() {
        assert_eq!(PeakHold::new(0, 4).err(), Some(ConfigError::PeakFall));
    }

    #[test]
    fn test_peak_hold_then_fall() {
        let mut peaks = PeakHold::new(2, 2).unwrap();
        let mut bars = [0u8; BAND_COUNT];
        bars[5] = 20;
        assert_eq!(peaks.update(&bars)[5], 20);

        bars[5] = 4;
        assert_eq!(peaks.update(&bars)[5], 20);
        assert_eq!(peaks.update(&bars)[5], 20);
        assert_eq!(peaks.update(&bars)[5], 18);
        assert_eq!(peaks.update(&bars)[5], 16);
        for _ in 0..20 {
            peaks.update(&bars);
        }
        assert_eq!(peaks.peaks()[5], 4);
    }
}
