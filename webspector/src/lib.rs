#![no_std]

pub mod adc;
pub mod config;
