use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::RawMutex, Mutex};
use embassy_sync::signal::Signal;

use crate::types::BandSnapshot;

/// Hands finished frames from the processing loop to display/network readers.
///
/// The producer copies each snapshot in under a short critical section and
/// never waits for a reader. Readers always get a whole frame, never a mix of
/// two.
pub struct BandExchange<M: RawMutex> {
    latest: Mutex<M, RefCell<BandSnapshot>>,
    published: Signal<M, u32>,
}

impl<M: RawMutex> BandExchange<M> {
    pub const fn new() -> Self {
        Self {
            latest: Mutex::new(RefCell::new(BandSnapshot::empty())),
            published: Signal::new(),
        }
    }

    pub fn publish(&self, snapshot: &BandSnapshot) {
        self.latest.lock(|latest| *latest.borrow_mut() = *snapshot);
        self.published.signal(snapshot.sequence);
    }

    /// Copy of the most recently published frame.
    pub fn snapshot(&self) -> BandSnapshot {
        self.latest.lock(|latest| *latest.borrow())
    }

    pub fn sequence(&self) -> u32 {
        self.latest.lock(|latest| latest.borrow().sequence)
    }

    /// Waits until a frame is published after the last wait returned.
    ///
    /// Frames published in between are skipped; the newest one is returned.
    pub async fn wait_frame(&self) -> BandSnapshot {
        self.published.wait().await;
        self.snapshot()
    }

    pub fn has_new_frame(&self) -> bool {
        self.published.signaled()
    }
}

impl<M: RawMutex> Default for BandExchange<M> {
    fn default() -> Self {
        Self::new()
    }
}
