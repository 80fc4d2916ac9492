use thiserror::Error;
use webspector_dsp::DspError;

/// Configuration rejected while building the pipeline.
///
/// All of these are startup failures; nothing in the per-frame path returns
/// an error.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum ConfigError {
    #[error(transparent)]
    Dsp(#[from] DspError),
    #[error("gain dampen {0} outside 1..=64")]
    GainDampen(u32),
    #[error("gain level range {min}..{max} must be finite with 0 < min < max")]
    GainRange { min: f32, max: f32 },
    #[error("decay step must be positive and finite")]
    DecayStep,
    #[error("first bin {first_bin} leaves no usable bins below {nyquist_bin}")]
    FirstBin { first_bin: usize, nyquist_bin: usize },
    #[error("{bins} usable bins cannot fill {bands} bands")]
    TooFewBins { bins: usize, bands: usize },
    #[error("bar height must be at least 1")]
    BarHeight,
    #[error("peak markers must fall by at least 1 per frame")]
    PeakFall,
}
