#[cfg(feature = "logging")]
use defmt::{debug, info};
#[allow(unused_imports)]
use micromath::F32Ext;

use webspector_dsp::{AdcSource, SampleAcquirer, SampleBlock, SpectralTransform};

use crate::band_decay::{DecayEngine, DecayState, PeakHold};
use crate::band_mapper::BandMapper;
use crate::config::PipelineConfig;
use crate::controls::Controls;
use crate::error::ConfigError;
use crate::gain_controller::{GainController, GainState};
use crate::types::{BandArray, BandHeights, BandSnapshot, BAND_COUNT};

/// Owns every buffer of the sample → bands chain and runs it once per frame.
///
/// One instance exists per analyzer; its buffers are reused every frame and
/// the latest result is kept in a [`BandSnapshot`] for publishing.
pub struct SpectrumPipeline<const N: usize> {
    transform: SpectralTransform<N>,
    mapper: BandMapper<N>,
    gain: GainController,
    gain_state: GainState,
    decay: DecayEngine,
    decay_state: DecayState,
    peaks: PeakHold,
    max_bar_height: u8,
    snapshot: BandSnapshot,
}

impl<const N: usize> SpectrumPipeline<N> {
    pub fn new(config: &PipelineConfig) -> Result<Self, ConfigError> {
        config.validate(N)?;
        let gain = GainController::new(
            config.gain_dampen,
            config.min_gain_level,
            config.max_gain_level,
            config.max_bar_height as f32,
        )?;

        #[cfg(feature = "logging")]
        info!(
            "pipeline: {} samples at {} Hz into {} bands",
            N, config.sample_rate_hz, BAND_COUNT
        );

        Ok(Self {
            transform: SpectralTransform::new()?,
            mapper: BandMapper::new(config.first_bin, config.spacing, config.reducer)?,
            gain_state: gain.initial_state(),
            gain,
            decay: DecayEngine::new(config.decay)?,
            decay_state: DecayState::new(),
            peaks: PeakHold::new(config.peak_fall, config.peak_hold_frames)?,
            max_bar_height: config.max_bar_height,
            snapshot: BandSnapshot::empty(),
        })
    }

    /// Reads one block from `acquirer` and processes it with the current
    /// control values. Acquisition failures only degrade the frame.
    pub fn run_frame<S: AdcSource>(
        &mut self,
        acquirer: &mut SampleAcquirer<S, N>,
        controls: &Controls,
    ) -> &BandSnapshot {
        let samples = acquirer.acquire();
        self.process_block(samples, controls.noise_threshold.get(), controls.mode())
    }

    /// Transform, band mapping, gain and decay for one block.
    pub fn process_block(&mut self, samples: &SampleBlock<N>, threshold: u32, mode: u8) -> &BandSnapshot {
        let frame = self.transform.transform(samples);

        let mut raw: BandArray = [0.0; BAND_COUNT];
        self.mapper.map_bands(frame.magnitudes(), threshold, &mut raw);

        self.gain_state = self.gain.update_gain(&raw, self.gain_state);
        let mut normalized: BandArray = [0.0; BAND_COUNT];
        self.gain.apply(&raw, self.gain_state, &mut normalized);

        self.decay_state = self.decay.smooth(&normalized, &self.decay_state);
        let bars = self.bar_heights(self.decay_state.heights());

        let snapshot = &mut self.snapshot;
        snapshot.sequence = snapshot.sequence.wrapping_add(1);
        snapshot.mode = mode;
        snapshot.gain_level = self.gain_state.level();
        snapshot.freq_bins = raw;
        snapshot.freq_bins_nw = normalized;
        snapshot.freq_bins_od = *self.decay_state.heights();
        snapshot.old_bar_heights = snapshot.bar_heights;
        snapshot.bar_heights = bars;
        snapshot.peak = *self.peaks.update(&bars);

        #[cfg(feature = "logging")]
        {
            if snapshot.sequence % 256 == 0 {
                debug!(
                    "frame {}: gain level {}, threshold {}",
                    snapshot.sequence, snapshot.gain_level, threshold
                );
            }
        }

        &self.snapshot
    }

    fn bar_heights(&self, heights: &BandArray) -> BandHeights {
        let mut bars = [0u8; BAND_COUNT];
        let max = self.max_bar_height as f32;
        for (bar, &height) in bars.iter_mut().zip(heights.iter()) {
            *bar = height.round().clamp(0.0, max) as u8;
        }
        bars
    }

    pub fn snapshot(&self) -> &BandSnapshot {
        &self.snapshot
    }

    pub fn gain_state(&self) -> GainState {
        self.gain_state
    }

    pub fn decay_state(&self) -> &DecayState {
        &self.decay_state
    }

    pub fn mapper(&self) -> &BandMapper<N> {
        &self.mapper
    }
}
