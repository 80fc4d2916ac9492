#![allow(dead_code)]

use rand::Rng;
use wavegen::{sine, wf};

pub const SAMPLE_RATE: f32 = 40_000.0;

/// A full-scale-ish sine landing exactly on FFT bin `bin`.
pub fn tone_block<const N: usize>(bin: usize, amplitude: f32) -> [i16; N] {
    let frequency = bin as f32 * SAMPLE_RATE / N as f32;
    let wave = wf!(f32, 40_000.0, sine!(frequency));
    let mut block = [0i16; N];
    for (sample, value) in block.iter_mut().zip(wave.iter()) {
        *sample = (value * amplitude).round() as i16;
    }
    block
}

pub fn noise_block<const N: usize>(amplitude: i16) -> [i16; N] {
    let mut rng = rand::rng();
    let mut block = [0i16; N];
    for sample in block.iter_mut() {
        *sample = rng.random_range(-amplitude..=amplitude);
    }
    block
}

/// Raw ADC words for `block` as a mid-scale 12-bit converter would produce them.
pub fn to_adc_words<const N: usize>(block: &[i16; N]) -> [u16; N] {
    let mut raw = [0u16; N];
    for (word, &sample) in raw.iter_mut().zip(block.iter()) {
        *word = (sample as i32 + 2048).clamp(0, 4095) as u16;
    }
    raw
}
