use thiserror::Error;

/// Failures raised by the sampling and transform stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum DspError {
    /// The ADC did not deliver a full block inside its time budget.
    #[error("ADC block not filled within {budget_us} us")]
    AcquisitionTimeout { budget_us: u32 },
    /// The ADC driver reported a conversion error.
    #[error("ADC conversion failed")]
    AdcFault,
    #[error("block size {0} is not a power of two between 16 and 4096")]
    InvalidBlockSize(usize),
}
