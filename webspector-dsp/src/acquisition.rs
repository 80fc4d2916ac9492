#[cfg(feature = "logging")]
use defmt::{trace, warn};

use crate::error::DspError;
use crate::transform::validate_block_size;
use crate::{ADC_INPUT, ADC_RESOLUTION_BITS};

/// One block of DC-corrected samples, overwritten every acquisition cycle.
pub type SampleBlock<const N: usize> = [i16; N];

/// A hardware (or simulated) ADC that can fill a block of raw conversions.
///
/// Implementations pace the reads at their fixed sample rate and must give up
/// once `budget_us` has elapsed, returning [`DspError::AcquisitionTimeout`].
/// A partially written `raw` buffer is discarded by the caller on error.
pub trait AdcSource {
    fn read_block(&mut self, raw: &mut [u16], budget_us: u32) -> Result<(), DspError>;
}

/// Offset subtracted from every raw ADC word before it enters the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub struct DcOffset(u16);

impl DcOffset {
    /// Offset for I2S-ADC words, which carry the channel id in the top nibble.
    ///
    /// The conversion itself is centred at mid-scale so a silent input maps
    /// to zero.
    pub fn for_channel(channel: u8, resolution_bits: u8) -> Self {
        let tag = (channel as u16 & 0x0F) << 12;
        Self(tag | Self::midscale(resolution_bits).0)
    }

    /// Offset for untagged one-shot conversions.
    pub fn midscale(resolution_bits: u8) -> Self {
        let bits = resolution_bits.clamp(1, 12);
        Self(1 << (bits - 1))
    }

    pub const fn value(self) -> u16 {
        self.0
    }

    /// Removes the offset, saturating into the `i16` sample range.
    pub fn correct(self, raw: u16) -> i16 {
        let centred = raw as i32 - self.0 as i32;
        centred.clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }
}

/// What to hand downstream when a block could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum StalePolicy {
    /// Emit a silent block.
    ZeroFill,
    /// Emit the previous good block again.
    RepeatLast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub struct AcquisitionConfig {
    pub channel: u8,
    pub resolution_bits: u8,
    /// Time allowed for one full block before the read is abandoned.
    pub budget_us: u32,
    pub policy: StalePolicy,
    /// Words arrive channel-tagged (I2S-ADC mode) rather than as bare conversions.
    pub tagged_words: bool,
}

impl AcquisitionConfig {
    pub fn dc_offset(&self) -> DcOffset {
        if self.tagged_words {
            DcOffset::for_channel(self.channel, self.resolution_bits)
        } else {
            DcOffset::midscale(self.resolution_bits)
        }
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            channel: ADC_INPUT,
            resolution_bits: ADC_RESOLUTION_BITS,
            budget_us: 50_000,
            policy: StalePolicy::RepeatLast,
            tagged_words: false,
        }
    }
}

/// Counters kept across the acquirer's lifetime.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub struct AcquisitionStats {
    pub blocks: u32,
    pub timeouts: u32,
    pub faults: u32,
}

impl AcquisitionStats {
    pub fn failures(&self) -> u32 {
        self.timeouts.wrapping_add(self.faults)
    }
}

/// Reads fixed-size blocks from an [`AdcSource`] and applies the DC offset.
///
/// `acquire` always returns a block: failed reads are replaced according to
/// the configured [`StalePolicy`] so the processing loop never stalls.
pub struct SampleAcquirer<S, const N: usize> {
    source: S,
    offset: DcOffset,
    budget_us: u32,
    policy: StalePolicy,
    raw: [u16; N],
    block: SampleBlock<N>,
    stats: AcquisitionStats,
    last_fresh: bool,
}

impl<S: AdcSource, const N: usize> SampleAcquirer<S, N> {
    pub fn new(source: S, config: &AcquisitionConfig) -> Result<Self, DspError> {
        validate_block_size(N)?;
        Ok(Self {
            source,
            offset: config.dc_offset(),
            budget_us: config.budget_us,
            policy: config.policy,
            raw: [0; N],
            block: [0; N],
            stats: AcquisitionStats::default(),
            last_fresh: false,
        })
    }

    pub fn acquire(&mut self) -> &SampleBlock<N> {
        match self.source.read_block(&mut self.raw, self.budget_us) {
            Ok(()) => {
                for (sample, &raw) in self.block.iter_mut().zip(self.raw.iter()) {
                    *sample = self.offset.correct(raw);
                }
                self.stats.blocks = self.stats.blocks.wrapping_add(1);
                self.last_fresh = true;
                #[cfg(feature = "logging")]
                trace!("acquired block {}", self.stats.blocks);
            }
            Err(err) => {
                match err {
                    DspError::AcquisitionTimeout { .. } => {
                        self.stats.timeouts = self.stats.timeouts.wrapping_add(1)
                    }
                    _ => self.stats.faults = self.stats.faults.wrapping_add(1),
                }
                #[cfg(feature = "logging")]
                warn!("acquisition failed: {}, substituting {}", err, self.policy);
                if self.policy == StalePolicy::ZeroFill {
                    self.block.fill(0);
                }
                self.last_fresh = false;
            }
        }
        &self.block
    }

    /// Whether the block returned by the last `acquire` came from the ADC.
    pub fn last_was_fresh(&self) -> bool {
        self.last_fresh
    }

    pub fn stats(&self) -> AcquisitionStats {
        self.stats
    }

    pub fn offset(&self) -> DcOffset {
        self.offset
    }
}
