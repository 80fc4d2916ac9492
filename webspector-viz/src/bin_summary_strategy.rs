/// How the gated bins inside one band collapse into the band's intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum BinSummaryStrategy {
    Average,
    /// Bin `i` of the band weighs `i + 1`, favouring its upper edge.
    WeightedAverage,
    /// Loudest bin; a lone tone keeps its full height in a wide band.
    Max,
    /// Accumulates every bin, so wide upper bands read louder.
    Sum,
    RMS,
}

impl BinSummaryStrategy {
    /// Reduces `bins` to one non-negative value. An empty band is silent.
    pub fn reduce(self, bins: &[f32]) -> f32 {
        let count = bins.len();
        if count == 0 {
            return 0.0;
        }

        match self {
            Self::Average => bins.iter().sum::<f32>() / count as f32,
            Self::WeightedAverage => {
                let weighted: f32 = (1..).zip(bins).map(|(w, &v)| w as f32 * v).sum();
                // 1 + 2 + .. + count
                weighted / (count * (count + 1) / 2) as f32
            }
            Self::Max => bins.iter().fold(0.0, |loudest: f32, &v| loudest.max(v)),
            Self::Sum => bins.iter().sum(),
            Self::RMS => {
                let energy: f32 = bins.iter().map(|v| v * v).sum();
                libm::sqrtf(energy / count as f32)
            }
        }
    }
}
