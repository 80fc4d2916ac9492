#[allow(unused_imports)]
use micromath::F32Ext;

use crate::bin_summary_strategy::BinSummaryStrategy;
use crate::error::ConfigError;
use crate::types::{BandArray, BAND_COUNT};
use webspector_dsp::validate_block_size;

/// How band edges are spread across the usable bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum BandSpacing {
    /// Every band spans the same number of bins.
    Linear,
    /// Every band spans the same frequency ratio, so low bands are narrow.
    Logarithmic,
}

/// A band's extent in fractional bin units.
///
/// Bin `k` belongs to the band when `start <= k < end`. Every band is at
/// least one bin wide, so it always holds at least one bin centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandRange {
    pub start: f32,
    pub end: f32,
}

impl BandRange {
    /// Indices of the bins whose centres fall inside this band.
    pub fn bins(&self) -> core::ops::Range<usize> {
        self.start.ceil() as usize..self.end.ceil() as usize
    }
}

/// Groups the non-mirrored FFT bins of an `N`-point transform into
/// [`BAND_COUNT`] display bands.
pub struct BandMapper<const N: usize> {
    ranges: [BandRange; BAND_COUNT],
    reducer: BinSummaryStrategy,
    first_bin: usize,
    gated: [f32; N],
}

impl<const N: usize> BandMapper<N> {
    /// Builds the band table for bins `first_bin..=N / 2`.
    ///
    /// Bins below `first_bin` (DC and its window leakage) never reach a band.
    pub fn new(
        first_bin: usize,
        spacing: BandSpacing,
        reducer: BinSummaryStrategy,
    ) -> Result<Self, ConfigError> {
        validate_block_size(N)?;
        let nyquist_bin = N / 2;
        if first_bin == 0 || first_bin >= nyquist_bin {
            return Err(ConfigError::FirstBin {
                first_bin,
                nyquist_bin,
            });
        }
        let bins = nyquist_bin - first_bin + 1;
        if bins < BAND_COUNT {
            return Err(ConfigError::TooFewBins {
                bins,
                bands: BAND_COUNT,
            });
        }

        let lower = first_bin as f32 - 0.5;
        let upper = nyquist_bin as f32 + 0.5;
        let ranges = match spacing {
            BandSpacing::Linear => Self::linear_ranges(lower, upper),
            BandSpacing::Logarithmic => Self::logarithmic_ranges(lower, upper),
        };

        Ok(Self {
            ranges,
            reducer,
            first_bin,
            gated: [0.0; N],
        })
    }

    pub fn band_ranges(&self) -> &[BandRange; BAND_COUNT] {
        &self.ranges
    }

    pub fn reducer(&self) -> BinSummaryStrategy {
        self.reducer
    }

    /// The band a bin contributes to, if it is in the usable range.
    pub fn band_for_bin(&self, bin: usize) -> Option<usize> {
        if bin < self.first_bin || bin > N / 2 {
            return None;
        }
        let position = bin as f32;
        self.ranges
            .iter()
            .position(|range| range.start <= position && position < range.end)
    }

    /// Aggregates `magnitudes` (DC through Nyquist) into `bands`.
    ///
    /// Magnitudes below `threshold` are zeroed first, then the bins of each
    /// band are collapsed with the configured reducer. Bands past the end of a
    /// short `magnitudes` slice stay at zero.
    pub fn map_bands(&mut self, magnitudes: &[f32], threshold: u32, bands: &mut BandArray) {
        let threshold = threshold as f32;
        let usable = magnitudes.len().min(N / 2 + 1);

        self.gated.fill(0.0);
        if usable > self.first_bin {
            for (gated, &magnitude) in self.gated[self.first_bin..usable]
                .iter_mut()
                .zip(&magnitudes[self.first_bin..usable])
            {
                *gated = if magnitude < threshold { 0.0 } else { magnitude };
            }
        }

        for (band, range) in bands.iter_mut().zip(self.ranges.iter()) {
            let bins = range.bins();
            let start = bins.start.min(usable);
            let end = bins.end.min(usable);
            *band = if start < end {
                self.reducer.reduce(&self.gated[start..end])
            } else {
                0.0
            };
        }
    }

    fn linear_ranges(lower: f32, upper: f32) -> [BandRange; BAND_COUNT] {
        let width = (upper - lower) / BAND_COUNT as f32;
        Self::ranges_from_edges(lower, upper, |start, _| start + width)
    }

    /// Geometric edges, except that no band is narrower than one bin.
    ///
    /// Each edge is placed one geometric step past `start` towards `upper`
    /// over the bands still left. While that step is under a bin the band
    /// takes exactly one bin, so the bottom of the range is linear and the
    /// rest is logarithmic.
    fn logarithmic_ranges(lower: f32, upper: f32) -> [BandRange; BAND_COUNT] {
        Self::ranges_from_edges(lower, upper, |start, remaining| {
            let step = libm::powf(upper / start, 1.0 / remaining as f32);
            (start * step).max(start + 1.0)
        })
    }

    /// `next_edge(start, remaining)` gives the end of the band starting at
    /// `start` with `remaining` bands (this one included) still to place.
    fn ranges_from_edges(
        lower: f32,
        upper: f32,
        next_edge: impl Fn(f32, usize) -> f32,
    ) -> [BandRange; BAND_COUNT] {
        let mut ranges = [BandRange { start: 0.0, end: 0.0 }; BAND_COUNT];
        let mut start = lower;
        for (i, range) in ranges.iter_mut().enumerate() {
            // pin the outer edge so the Nyquist bin is always covered
            let end = if i == BAND_COUNT - 1 {
                upper
            } else {
                next_edge(start, BAND_COUNT - i)
            };
            *range = BandRange { start, end };
            start = end;
        }
        ranges
    }
}
