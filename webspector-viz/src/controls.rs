use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

/// Noise floor for the band mapper, adjustable while the pipeline runs.
///
/// Bin magnitudes below this value are treated as silence. Raising it
/// mostly quiets the upper bands, which collect the most broadband noise.
pub struct NoiseThreshold(AtomicU32);

impl NoiseThreshold {
    pub const fn new(value: u32) -> Self {
        Self(AtomicU32::new(value))
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, value: u32) {
        self.0.store(value, Ordering::Relaxed);
    }
}

/// Runtime inputs written by UI tasks and read once per frame.
pub struct Controls {
    pub noise_threshold: NoiseThreshold,
    mode: AtomicU8,
}

impl Controls {
    pub const fn new(noise_threshold: u32) -> Self {
        Self {
            noise_threshold: NoiseThreshold::new(noise_threshold),
            mode: AtomicU8::new(0),
        }
    }

    pub fn mode(&self) -> u8 {
        self.mode.load(Ordering::Relaxed)
    }

    pub fn set_mode(&self, mode: u8) {
        self.mode.store(mode, Ordering::Relaxed);
    }

    /// Advances to the next of `mode_count` modes, wrapping to 0.
    pub fn cycle_mode(&self, mode_count: u8) -> u8 {
        let count = mode_count.max(1);
        let next = (self.mode() + 1) % count;
        self.set_mode(next);
        next
    }
}
