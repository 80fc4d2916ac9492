#![cfg_attr(not(test), no_std)]

//! Sampling and spectral transform stages of the Webspector spectrum analyzer.
//!
//! Raw ADC words are DC-corrected into a [`SampleBlock`], windowed, and run
//! through a real FFT. The resulting [`SpectralFrame`] carries per-bin
//! magnitudes in its real array for the band stages downstream.

mod acquisition;
mod error;
mod paced;
mod transform;

pub use acquisition::{
    AcquisitionConfig, AcquisitionStats, AdcSource, DcOffset, SampleAcquirer, SampleBlock,
    StalePolicy,
};
pub use error::DspError;
pub use paced::PacedAdc;
pub use transform::{
    bin_frequency, validate_block_size, SpectralFrame, SpectralTransform, MAX_BLOCK_SIZE,
    MIN_BLOCK_SIZE,
};

/// Samples per FFT block.
pub const SAMPLEBLOCK: usize = 1024;
/// ADC sample rate in Hz.
pub const SAMPLING_FREQUENCY: u32 = 40_000;
/// ADC1 channel feeding the analyzer.
pub const ADC_INPUT: u8 = 0;
/// Conversion width of the on-chip ADC.
pub const ADC_RESOLUTION_BITS: u8 = 12;
