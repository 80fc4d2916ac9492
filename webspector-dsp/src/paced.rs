use crate::acquisition::AdcSource;
use crate::error::DspError;

/// One-shot conversions taken one per sample period against a microsecond
/// clock.
///
/// `read` is the driver's non-blocking conversion call and `clock` returns
/// the current time in microseconds. Every wait checks the block's time
/// budget, so a budget shorter than `N` periods fails the block.
pub struct PacedAdc<R, C> {
    read: R,
    clock: C,
    period_us: u64,
}

impl<R, C> PacedAdc<R, C>
where
    R: FnMut() -> nb::Result<u16, ()>,
    C: FnMut() -> u64,
{
    pub fn new(read: R, clock: C, sample_rate_hz: u32) -> Self {
        Self {
            read,
            clock,
            period_us: 1_000_000 / sample_rate_hz.max(1) as u64,
        }
    }

    fn now_before(&mut self, deadline: u64, budget_us: u32) -> Result<u64, DspError> {
        let now = (self.clock)();
        if now > deadline {
            Err(DspError::AcquisitionTimeout { budget_us })
        } else {
            Ok(now)
        }
    }
}

impl<R, C> AdcSource for PacedAdc<R, C>
where
    R: FnMut() -> nb::Result<u16, ()>,
    C: FnMut() -> u64,
{
    fn read_block(&mut self, raw: &mut [u16], budget_us: u32) -> Result<(), DspError> {
        let start = (self.clock)();
        let deadline = start.saturating_add(budget_us as u64);
        let mut next = start;

        for word in raw.iter_mut() {
            while self.now_before(deadline, budget_us)? < next {}
            *word = loop {
                match (self.read)() {
                    Ok(value) => break value,
                    Err(nb::Error::WouldBlock) => {
                        self.now_before(deadline, budget_us)?;
                    }
                    Err(nb::Error::Other(())) => return Err(DspError::AdcFault),
                }
            };
            next += self.period_us;
        }
        self.now_before(deadline, budget_us)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    // every clock read advances time by one microsecond
    fn ticking(time: &Cell<u64>) -> impl FnMut() -> u64 + '_ {
        move || {
            time.set(time.get() + 1);
            time.get()
        }
    }

    #[test]
    fn test_reads_are_paced_at_the_sample_rate() {
        let time = Cell::new(0);
        let taken = RefCell::new(Vec::new());
        let mut adc = PacedAdc::new(
            || {
                taken.borrow_mut().push(time.get());
                Ok(42)
            },
            ticking(&time),
            40_000,
        );

        let mut raw = [0u16; 16];
        assert_eq!(adc.read_block(&mut raw, 1_000), Ok(()));
        assert!(raw.iter().all(|&w| w == 42));
        let taken = taken.borrow();
        assert_eq!(taken.len(), 16);
        // the block starts at the first clock tick, t = 1
        for (i, &at) in taken.iter().enumerate() {
            assert!(at >= 1 + 25 * i as u64, "read {} at {} came early", i, at);
        }
    }

    #[test]
    fn test_budget_shorter_than_block_times_out() {
        let time = Cell::new(0);
        let mut reads = 0;
        let mut adc = PacedAdc::new(
            || {
                reads += 1;
                Ok(1)
            },
            ticking(&time),
            40_000,
        );

        // 16 samples at 25 us need at least 375 us
        let mut raw = [0u16; 16];
        assert_eq!(
            adc.read_block(&mut raw, 100),
            Err(DspError::AcquisitionTimeout { budget_us: 100 })
        );
        drop(adc);
        assert!(reads < 16);
    }

    #[test]
    fn test_busy_converter_times_out() {
        let time = Cell::new(0);
        let mut adc = PacedAdc::new(|| Err(nb::Error::WouldBlock), ticking(&time), 40_000);
        let mut raw = [0u16; 16];
        assert_eq!(
            adc.read_block(&mut raw, 500),
            Err(DspError::AcquisitionTimeout { budget_us: 500 })
        );
        assert!(time.get() <= 503);
    }

    #[test]
    fn test_driver_error_is_a_fault() {
        let time = Cell::new(0);
        let mut adc = PacedAdc::new(|| Err(nb::Error::Other(())), ticking(&time), 40_000);
        let mut raw = [0u16; 16];
        assert_eq!(adc.read_block(&mut raw, 1_000), Err(DspError::AdcFault));
    }
}
