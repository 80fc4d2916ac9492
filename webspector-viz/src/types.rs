/// Number of display bands produced per frame.
pub const BAND_COUNT: usize = 65;

/// One floating-point intensity per display band.
pub type BandArray = [f32; BAND_COUNT];
/// One bar or marker height per display band.
pub type BandHeights = [u8; BAND_COUNT];

/// Everything the display/network layer reads for one processed frame.
///
/// All views are indexed identically: element `i` of every array describes
/// the same frequency band.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub struct BandSnapshot {
    /// Frame counter, wraps.
    pub sequence: u32,
    /// Display mode selected when the frame was processed.
    pub mode: u8,
    /// Normalization level the gain controller divided by.
    pub gain_level: f32,
    /// Mapped band intensities after the noise gate, before gain.
    pub freq_bins: BandArray,
    /// Gain-normalized intensities of this frame.
    pub freq_bins_nw: BandArray,
    /// Displayed intensities after decay.
    pub freq_bins_od: BandArray,
    pub bar_heights: BandHeights,
    /// Bar heights of the previous frame.
    pub old_bar_heights: BandHeights,
    /// Peak-hold marker heights.
    pub peak: BandHeights,
}

impl BandSnapshot {
    pub const fn empty() -> Self {
        Self {
            sequence: 0,
            mode: 0,
            gain_level: 0.0,
            freq_bins: [0.0; BAND_COUNT],
            freq_bins_nw: [0.0; BAND_COUNT],
            freq_bins_od: [0.0; BAND_COUNT],
            bar_heights: [0; BAND_COUNT],
            old_bar_heights: [0; BAND_COUNT],
            peak: [0; BAND_COUNT],
        }
    }
}

impl Default for BandSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
