use embassy_time::Instant;
use webspector_dsp::PacedAdc;

fn now_us() -> u64 {
    Instant::now().as_micros()
}

/// Paces `read` (e.g. `move || adc.read_oneshot(&mut pin)`) against the
/// embassy clock.
pub fn oneshot_source<R>(read: R, sample_rate_hz: u32) -> PacedAdc<R, fn() -> u64>
where
    R: FnMut() -> nb::Result<u16, ()>,
{
    PacedAdc::new(read, now_us as fn() -> u64, sample_rate_hz)
}
