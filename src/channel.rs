//! Bounded sample queue between the sample-completion interrupt and the
//! main loop.
//!
//! Built on `critical-section` and `heapless::Deque`, so pushing from an
//! interrupt handler and draining from the main loop never overlap.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

use crate::orientation::Sample;

/// Error returned when the queue is full; carries the rejected sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrySendError(pub Sample);

/// A bounded, interrupt-safe sample queue.
pub struct SampleChannel<const SIZE: usize> {
    inner: Mutex<RefCell<Deque<Sample, SIZE>>>,
}

impl<const SIZE: usize> SampleChannel<SIZE> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Handle for the interrupt side
    pub const fn sender(&self) -> SampleSender<'_, SIZE> {
        SampleSender { channel: self }
    }

    /// Handle for the main loop
    pub const fn receiver(&self) -> SampleReceiver<'_, SIZE> {
        SampleReceiver { channel: self }
    }

    /// Queue a sample.
    ///
    /// Returns `Err(TrySendError(sample))` if the queue is full.
    pub fn try_send(&self, sample: Sample) -> Result<(), TrySendError> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.push_back(sample).map_err(TrySendError)
        })
    }

    /// Queue a sample, evicting the oldest one when the queue is full.
    ///
    /// Returns the evicted sample, if any.
    pub fn send_latest(&self, sample: Sample) -> Option<Sample> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            let evicted = if queue.is_full() { queue.pop_front() } else { None };
            // Cannot fail: there is room after the eviction
            let _ = queue.push_back(sample);
            evicted
        })
    }

    /// Take the oldest queued sample
    pub fn try_receive(&self) -> Option<Sample> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().pop_front())
    }

    /// Empty the queue and return the newest sample, if any
    pub fn take_latest(&self) -> Option<Sample> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            let latest = queue.pop_back();
            queue.clear();
            latest
        })
    }

    /// Number of queued samples
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const SIZE: usize> Default for SampleChannel<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Interrupt-side handle of a [`SampleChannel`].
#[derive(Clone, Copy)]
pub struct SampleSender<'a, const SIZE: usize> {
    channel: &'a SampleChannel<SIZE>,
}

impl<const SIZE: usize> SampleSender<'_, SIZE> {
    /// Queue a sample; a full queue drops its oldest entry to make room.
    ///
    /// Returns `true` if nothing was evicted.
    pub fn send(&self, sample: Sample) -> bool {
        self.channel.send_latest(sample).is_none()
    }
}

/// Main-loop handle of a [`SampleChannel`].
#[derive(Clone, Copy)]
pub struct SampleReceiver<'a, const SIZE: usize> {
    channel: &'a SampleChannel<SIZE>,
}

impl<const SIZE: usize> SampleReceiver<'_, SIZE> {
    /// Newest sample since the last call, discarding older ones
    pub fn take_latest(&self) -> Option<Sample> {
        self.channel.take_latest()
    }
}
