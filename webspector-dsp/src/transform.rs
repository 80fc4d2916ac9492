use microdsp::common::{apply_window_function, WindowFunctionType::Hann};
use microfft::{real, Complex32};
#[allow(unused_imports)]
use micromath::F32Ext;

use crate::acquisition::SampleBlock;
use crate::error::DspError;

pub const MIN_BLOCK_SIZE: usize = 16;
pub const MAX_BLOCK_SIZE: usize = 4096;

/// Checks that `n` is a block size the real FFT can run on.
pub const fn validate_block_size(n: usize) -> Result<(), DspError> {
    if n.is_power_of_two() && n >= MIN_BLOCK_SIZE && n <= MAX_BLOCK_SIZE {
        Ok(())
    } else {
        Err(DspError::InvalidBlockSize(n))
    }
}

/// Centre frequency in Hz of FFT bin `bin` for an `n`-point transform.
pub fn bin_frequency(bin: usize, sample_rate: u32, n: usize) -> f32 {
    bin as f32 * sample_rate as f32 / n as f32
}

/// Real and imaginary components of one transformed block.
///
/// After [`SpectralTransform::transform`] the real array holds the magnitude
/// of every bin and the imaginary array keeps the imaginary FFT components.
/// Bins above `N / 2` mirror the lower half.
#[derive(Clone)]
pub struct SpectralFrame<const N: usize> {
    real: [f32; N],
    imag: [f32; N],
}

impl<const N: usize> SpectralFrame<N> {
    pub const fn new() -> Self {
        Self {
            real: [0.0; N],
            imag: [0.0; N],
        }
    }

    pub fn real(&self) -> &[f32; N] {
        &self.real
    }

    pub fn imag(&self) -> &[f32; N] {
        &self.imag
    }

    /// Magnitudes of the non-mirrored bins, DC through Nyquist.
    pub fn magnitudes(&self) -> &[f32] {
        &self.real[..=N / 2]
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Copies the packed half spectrum of a real FFT into full-length
    /// component arrays.
    ///
    /// The Nyquist coefficient arrives in the imaginary slot of bin 0; both it
    /// and DC are purely real and have no mirrored partner.
    fn unpack(&mut self, half_spectrum: &[Complex32]) {
        let half = N / 2;
        self.real[0] = half_spectrum[0].re;
        self.imag[0] = 0.0;
        self.real[half] = half_spectrum[0].im;
        self.imag[half] = 0.0;
        for k in 1..half {
            let bin = half_spectrum[k];
            self.real[k] = bin.re;
            self.imag[k] = bin.im;
            self.real[N - k] = bin.re;
            self.imag[N - k] = -bin.im;
        }
    }

    fn complex_to_magnitude(&mut self) {
        let half = N / 2;
        for (k, (re, im)) in self.real.iter_mut().zip(self.imag.iter()).enumerate() {
            *re = if k == 0 || k == half {
                re.abs()
            } else {
                libm::sqrtf(*re * *re + *im * *im)
            };
        }
    }
}

impl<const N: usize> Default for SpectralFrame<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Windowed real FFT over fixed-size sample blocks, reusing its buffers
/// between frames.
pub struct SpectralTransform<const N: usize> {
    frame: SpectralFrame<N>,
    scratch: [f32; N],
}

impl<const N: usize> SpectralTransform<N> {
    pub fn new() -> Result<Self, DspError> {
        validate_block_size(N)?;
        Ok(Self {
            frame: SpectralFrame::new(),
            scratch: [0.0; N],
        })
    }

    pub fn transform(&mut self, samples: &SampleBlock<N>) -> &SpectralFrame<N> {
        for (re, &sample) in self.frame.real.iter_mut().zip(samples.iter()) {
            *re = sample as f32;
        }
        self.frame.imag.fill(0.0);

        apply_window_function(Hann, &mut self.frame.real);

        self.scratch.copy_from_slice(&self.frame.real);
        match real_fft(&mut self.scratch) {
            Ok(half_spectrum) => self.frame.unpack(half_spectrum),
            // unreachable once `new` has validated N
            Err(_) => self.frame.real.fill(0.0),
        }
        self.frame.complex_to_magnitude();

        &self.frame
    }

    pub fn frame(&self) -> &SpectralFrame<N> {
        &self.frame
    }
}

fn as_block<const M: usize>(input: &mut [f32]) -> Result<&mut [f32; M], DspError> {
    let len = input.len();
    input.try_into().map_err(|_| DspError::InvalidBlockSize(len))
}

/// Runs the in-place real FFT matching the input length, returning `len / 2`
/// packed complex bins.
fn real_fft(input: &mut [f32]) -> Result<&mut [Complex32], DspError> {
    let spectrum: &mut [Complex32] = match input.len() {
        16 => real::rfft_16(as_block(input)?),
        32 => real::rfft_32(as_block(input)?),
        64 => real::rfft_64(as_block(input)?),
        128 => real::rfft_128(as_block(input)?),
        256 => real::rfft_256(as_block(input)?),
        512 => real::rfft_512(as_block(input)?),
        1024 => real::rfft_1024(as_block(input)?),
        2048 => real::rfft_2048(as_block(input)?),
        4096 => real::rfft_4096(as_block(input)?),
        other => return Err(DspError::InvalidBlockSize(other)),
    };
    Ok(spectrum)
}
