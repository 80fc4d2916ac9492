use webspector_dsp::{
    AcquisitionConfig, AdcSource, DspError, SampleAcquirer, SpectralTransform, StalePolicy,
    SAMPLEBLOCK,
};
pub mod common;
use common::*;

/// Replays a fixed block of ADC words, failing every `fail_every`th read.
struct LoopbackAdc {
    words: [u16; SAMPLEBLOCK],
    reads: u32,
    fail_every: u32,
}

impl AdcSource for LoopbackAdc {
    fn read_block(&mut self, raw: &mut [u16], budget_us: u32) -> Result<(), DspError> {
        self.reads += 1;
        if self.fail_every != 0 && self.reads % self.fail_every == 0 {
            return Err(DspError::AcquisitionTimeout { budget_us });
        }
        raw.copy_from_slice(&self.words);
        Ok(())
    }
}

fn peak_bin(magnitudes: &[f32]) -> usize {
    magnitudes
        .iter()
        .enumerate()
        .skip(2)
        .fold((0, f32::MIN), |best, (i, &m)| if m > best.1 { (i, m) } else { best })
        .0
}

#[test]
fn test_tone_peaks_at_its_bin() {
    let mut transform = SpectralTransform::<SAMPLEBLOCK>::new().unwrap();
    for bin in [20usize, 100, 300] {
        let block = tone_block::<SAMPLEBLOCK>(bin, 1000.0);
        let frame = transform.transform(&block);
        assert_eq!(peak_bin(frame.magnitudes()), bin, "tone at bin {}", bin);
    }
}

#[test]
fn test_tone_magnitude_scale() {
    // A Hann-windowed bin-centred sine of amplitude A peaks near A * N / 4.
    let mut transform = SpectralTransform::<SAMPLEBLOCK>::new().unwrap();
    let block = tone_block::<SAMPLEBLOCK>(64, 1000.0);
    let frame = transform.transform(&block);
    let expected = 1000.0 * SAMPLEBLOCK as f32 / 4.0;
    let got = frame.magnitudes()[64];
    assert!(
        (got - expected).abs() < expected * 0.02,
        "Expected about {}, got {}",
        expected,
        got
    );
}

#[test]
fn test_noise_frame_is_well_formed() {
    let mut transform = SpectralTransform::<SAMPLEBLOCK>::new().unwrap();
    for _ in 0..8 {
        let block = noise_block::<SAMPLEBLOCK>(500);
        let frame = transform.transform(&block);
        assert_eq!(frame.real().len(), SAMPLEBLOCK);
        assert_eq!(frame.imag().len(), SAMPLEBLOCK);
        assert!(frame
            .real()
            .iter()
            .all(|m| m.is_finite() && *m >= 0.0));
    }
}

#[test]
fn test_acquired_tone_survives_dc_offset() {
    let block = tone_block::<SAMPLEBLOCK>(100, 800.0);
    let adc = LoopbackAdc {
        words: to_adc_words(&block),
        reads: 0,
        fail_every: 0,
    };
    let mut acquirer = SampleAcquirer::<_, SAMPLEBLOCK>::new(adc, &AcquisitionConfig::default()).unwrap();
    let acquired = *acquirer.acquire();
    assert_eq!(acquired, block);

    let mut transform = SpectralTransform::<SAMPLEBLOCK>::new().unwrap();
    let frame = transform.transform(&acquired);
    assert_eq!(peak_bin(frame.magnitudes()), 100);
}

#[test]
fn test_timeouts_never_stall_the_loop() {
    let block = tone_block::<SAMPLEBLOCK>(50, 800.0);
    let adc = LoopbackAdc {
        words: to_adc_words(&block),
        reads: 0,
        fail_every: 3,
    };
    let config = AcquisitionConfig {
        policy: StalePolicy::ZeroFill,
        ..AcquisitionConfig::default()
    };
    let mut acquirer = SampleAcquirer::<_, SAMPLEBLOCK>::new(adc, &config).unwrap();
    let mut silent = 0;
    for _ in 0..9 {
        if acquirer.acquire().iter().all(|&s| s == 0) {
            silent += 1;
        }
    }
    assert_eq!(silent, 3);
    assert_eq!(acquirer.stats().timeouts, 3);
    assert_eq!(acquirer.stats().blocks, 6);
}
