#[cfg(feature = "logging")]
use defmt::trace;

use crate::error::ConfigError;
use crate::types::BandArray;

/// Higher values make the gain release more slowly after a loud passage.
pub const GAIN_DAMPEN: u32 = 2;
/// Smallest level the gain divides by; silence settles here.
pub const MIN_GAIN_LEVEL: f32 = 1.0;
pub const MAX_GAIN_LEVEL: f32 = 1.0e9;

// relative distance at which the damped level snaps onto the peak
const SETTLE_RATIO: f32 = 1.0e-6;

/// Normalization level carried from frame to frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub struct GainState {
    level: f32,
}

impl GainState {
    pub fn level(&self) -> f32 {
        self.level
    }
}

/// Tracks the loudest band and scales every band against it.
///
/// The level follows a louder peak immediately and releases towards a
/// quieter one as an exponential moving average with weight `1 / dampen`.
pub struct GainController {
    dampen: u32,
    min_level: f32,
    max_level: f32,
    target: f32,
}

impl GainController {
    /// `target` is the value a band equal to the tracked level scales to.
    pub fn new(dampen: u32, min_level: f32, max_level: f32, target: f32) -> Result<Self, ConfigError> {
        if !(1..=64).contains(&dampen) {
            return Err(ConfigError::GainDampen(dampen));
        }
        if !(min_level.is_finite() && max_level.is_finite() && min_level > 0.0 && min_level < max_level) {
            return Err(ConfigError::GainRange {
                min: min_level,
                max: max_level,
            });
        }
        if !(target.is_finite() && target >= 1.0) {
            return Err(ConfigError::BarHeight);
        }
        Ok(Self {
            dampen,
            min_level,
            max_level,
            target,
        })
    }

    pub fn initial_state(&self) -> GainState {
        GainState {
            level: self.min_level,
        }
    }

    pub fn update_gain(&self, bands: &BandArray, state: GainState) -> GainState {
        let peak = bands.iter().copied().fold(0.0f32, f32::max);
        let dampen = self.dampen as f32;
        let released = (state.level * (dampen - 1.0) + peak) / dampen;

        let mut level = peak.max(released);
        if level - peak <= peak * SETTLE_RATIO {
            level = peak;
        }
        if !level.is_finite() {
            level = self.max_level;
        }
        let level = level.clamp(self.min_level, self.max_level);

        #[cfg(feature = "logging")]
        trace!("gain: peak {} level {} -> {}", peak, state.level, level);

        GainState { level }
    }

    /// Factor applied to every band, always within `target / max .. target / min`.
    pub fn multiplier(&self, state: GainState) -> f32 {
        self.target / state.level.clamp(self.min_level, self.max_level)
    }

    /// Scales `bands` into `0..=target` using the state's level.
    pub fn apply(&self, bands: &BandArray, state: GainState, scaled: &mut BandArray) {
        let multiplier = self.multiplier(state);
        for (out, &band) in scaled.iter_mut().zip(bands.iter()) {
            *out = (band * multiplier).clamp(0.0, self.target);
        }
    }
}
