#![cfg_attr(not(test), no_std)]

//! Band stages of the Webspector spectrum analyzer.
//!
//! FFT magnitudes from `webspector-dsp` are grouped into [`BAND_COUNT`]
//! display bands, normalized by an automatic gain controller, smoothed with a
//! rise-fast/fall-slow filter and handed to display consumers through a
//! [`BandExchange`].

mod band_decay;
mod band_mapper;
mod bin_summary_strategy;
mod config;
mod controls;
mod error;
mod exchange;
mod gain_controller;
mod pipeline;
mod types;

pub use band_decay::{BandPhase, DecayEngine, DecayMode, DecayState, PeakHold};
pub use band_mapper::{BandMapper, BandRange, BandSpacing};
pub use bin_summary_strategy::BinSummaryStrategy;
pub use config::*;
pub use controls::{Controls, NoiseThreshold};
pub use error::ConfigError;
pub use exchange::BandExchange;
pub use gain_controller::{
    GainController, GainState, GAIN_DAMPEN, MAX_GAIN_LEVEL, MIN_GAIN_LEVEL,
};
pub use pipeline::SpectrumPipeline;
pub use types::*;
