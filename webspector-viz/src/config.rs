use webspector_dsp::{validate_block_size, SAMPLING_FREQUENCY};

use crate::band_decay::DecayMode;
use crate::band_mapper::BandSpacing;
use crate::bin_summary_strategy::BinSummaryStrategy;
use crate::error::ConfigError;
use crate::gain_controller::{GAIN_DAMPEN, MAX_GAIN_LEVEL, MIN_GAIN_LEVEL};
use crate::types::BAND_COUNT;

// --- Band Config ---
pub const NOISE_THRESHOLD: u32 = 1000; // Bin magnitudes below this are dropped; affects the upper bands most
pub const FIRST_BIN: usize = 2; // Bins 0 and 1 carry DC and its window leakage

// --- Display Config ---
pub const MAX_BAR_HEIGHT: u8 = 64; // Tallest bar, in LEDs/pixels
pub const DECAY_STEP: f32 = 1.0; // Height lost per frame by a falling bar
pub const PEAK_FALL: u8 = 1;
pub const PEAK_HOLD_FRAMES: u8 = 8;

/// Everything the pipeline needs at startup. Validated once by
/// [`PipelineConfig::validate`]; invalid settings are fatal.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub struct PipelineConfig {
    pub sample_rate_hz: u32,
    /// Initial noise floor; the live value sits in [`crate::Controls`].
    pub noise_threshold: u32,
    /// Release damping of the gain controller, `1..=64`. 1 disables damping.
    pub gain_dampen: u32,
    /// Lower bound of the gain level, `> 0`.
    pub min_gain_level: f32,
    /// Upper bound of the gain level, `> min_gain_level`.
    pub max_gain_level: f32,
    /// Height a band at the tracked peak is scaled to, `>= 1`.
    pub max_bar_height: u8,
    /// First FFT bin fed to the bands, `1..N/2`.
    pub first_bin: usize,
    pub spacing: BandSpacing,
    pub reducer: BinSummaryStrategy,
    pub decay: DecayMode,
    /// Peak marker drop per frame after the hold, `>= 1`.
    pub peak_fall: u8,
    pub peak_hold_frames: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: SAMPLING_FREQUENCY,
            noise_threshold: NOISE_THRESHOLD,
            gain_dampen: GAIN_DAMPEN,
            min_gain_level: MIN_GAIN_LEVEL,
            max_gain_level: MAX_GAIN_LEVEL,
            max_bar_height: MAX_BAR_HEIGHT,
            first_bin: FIRST_BIN,
            spacing: BandSpacing::Logarithmic,
            reducer: BinSummaryStrategy::Max,
            decay: DecayMode::Linear { step: DECAY_STEP },
            peak_fall: PEAK_FALL,
            peak_hold_frames: PEAK_HOLD_FRAMES,
        }
    }
}

impl PipelineConfig {
    /// Checks the settings against an `n`-point block.
    pub fn validate(&self, n: usize) -> Result<(), ConfigError> {
        validate_block_size(n)?;
        if !(1..=64).contains(&self.gain_dampen) {
            return Err(ConfigError::GainDampen(self.gain_dampen));
        }
        if !(self.min_gain_level.is_finite()
            && self.max_gain_level.is_finite()
            && self.min_gain_level > 0.0
            && self.min_gain_level < self.max_gain_level)
        {
            return Err(ConfigError::GainRange {
                min: self.min_gain_level,
                max: self.max_gain_level,
            });
        }
        if self.max_bar_height == 0 {
            return Err(ConfigError::BarHeight);
        }
        if self.first_bin == 0 || self.first_bin >= n / 2 {
            return Err(ConfigError::FirstBin {
                first_bin: self.first_bin,
                nyquist_bin: n / 2,
            });
        }
        let bins = n / 2 - self.first_bin + 1;
        if bins < BAND_COUNT {
            return Err(ConfigError::TooFewBins {
                bins,
                bands: BAND_COUNT,
            });
        }
        if self.peak_fall == 0 {
            return Err(ConfigError::PeakFall);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webspector_dsp::DspError;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(PipelineConfig::default().validate(1024), Ok(()));
    }

    #[test]
    fn test_validate_reports_each_problem() {
        let base = PipelineConfig::default();
        assert_eq!(
            base.validate(1000),
            Err(ConfigError::Dsp(DspError::InvalidBlockSize(1000)))
        );
        let config = PipelineConfig {
            gain_dampen: 0,
            ..base
        };
        assert_eq!(config.validate(1024), Err(ConfigError::GainDampen(0)));
        let config = PipelineConfig {
            max_bar_height: 0,
            ..base
        };
        assert_eq!(config.validate(1024), Err(ConfigError::BarHeight));
        let config = PipelineConfig {
            first_bin: 600,
            ..base
        };
        assert!(matches!(
            config.validate(1024),
            Err(ConfigError::FirstBin { .. })
        ));
        assert_eq!(
            base.validate(64),
            Err(ConfigError::TooFewBins {
                bins: 31,
                bands: BAND_COUNT
            })
        );
    }

    #[test]
    fn test_validate_rejects_stuck_peak_markers() {
        let config = PipelineConfig {
            peak_fall: 0,
            ..PipelineConfig::default()
        };
        assert_eq!(config.validate(1024), Err(ConfigError::PeakFall));
    }
}
