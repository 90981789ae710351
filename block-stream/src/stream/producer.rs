use crate::block::{BlockRegion, ProducerSlot, Region};
use crate::device::{BlockDevice, Completion};
use crate::event::{self, Event};
use crate::session::{Direction, Mode, SessionState};

use super::BlockStream;

/// Device-side handle: moves blocks on behalf of the hardware.
///
/// Call it from whatever context the device completes transfers in: a DMA
/// completion ISR, a timer, or a polling loop. Every call is bounded and
/// never waits on the application. Events raised by a call are delivered to
/// the registered callback before the call returns, combined into one
/// notification.
///
/// Two ways to drive it:
///
/// - [`advance()`](Self::advance): take a block, run the transfer closure on
///   it, finish it. One call per block.
/// - [`begin()`](Self::begin) / [`finish()`](Self::finish): arm a DMA channel
///   with the returned region, then finish from the completion interrupt.
///   The block stays `ProducerOwned` in between.
pub struct StreamProducer<'s, 'buf, const N: usize> {
    stream: &'s BlockStream<'buf, N>,
    /// Events from `begin` to be delivered with the matching `finish`.
    /// Only meaningful while a block is in flight.
    pending: Event,
}

impl<'s, 'buf, const N: usize> StreamProducer<'s, 'buf, N> {
    pub(crate) fn new(stream: &'s BlockStream<'buf, N>) -> Self {
        StreamProducer {
            stream,
            pending: Event::NONE,
        }
    }

    pub fn direction(&self) -> Direction {
        self.stream.direction()
    }

    /// Transfer exactly one block.
    ///
    /// Input streams: the closure fills a free block, which then becomes
    /// `Ready`. Output streams: the closure drains the oldest `Ready` block,
    /// which then becomes `Free`. When no block is available the closure is
    /// not called and `OVERFLOW` or `UNDERFLOW` is raised instead.
    ///
    /// Returns the events raised by this step.
    pub fn advance<F>(&mut self, transfer: F) -> Event
    where
        F: FnOnce(&mut [u8]) -> Completion,
    {
        let _busy = self.stream.enter_producer();
        let Some(region) = self.streaming_region() else {
            return Event::NONE;
        };

        let (slot, mut raised) = self.acquire();
        if let Some(index) = slot {
            // SAFETY: the block is ProducerOwned; the application cannot take
            // it, and `stop` waits for this call before discarding it.
            let block = unsafe { region.block_mut(index) };
            let completion = transfer(block);
            raised |= self.complete(completion);
        }
        self.notify(raised);
        raised
    }

    /// Run one [`advance()`](Self::advance) step against a device.
    pub fn pump<D: BlockDevice>(&mut self, device: &mut D) -> Event {
        if device.direction() != self.stream.direction() {
            log::warn!(
                "{:?} device cannot drive a {:?} stream",
                device.direction(),
                self.stream.direction()
            );
            return Event::NONE;
        }
        self.advance(|block| device.transfer(block))
    }

    /// Take the next block for an asynchronous transfer.
    ///
    /// Returns the region to program the DMA engine with, or `None` when the
    /// stream is not running or no block is available (the matching
    /// `OVERFLOW`/`UNDERFLOW` is raised immediately). Calling it again before
    /// [`finish()`](Self::finish) returns the same block.
    pub fn begin(&mut self) -> Option<BlockRegion> {
        let _busy = self.stream.enter_producer();
        let region = self.streaming_region()?;
        let (slot, raised) = self.acquire();
        match slot {
            Some(index) => {
                self.pending |= raised;
                region.block_at(index)
            }
            None => {
                self.notify(raised);
                None
            }
        }
    }

    /// Complete the block taken by [`begin()`](Self::begin).
    ///
    /// Does nothing if the stream was stopped in the meantime; `stop`
    /// already discarded the block.
    pub fn finish(&mut self, completion: Completion) -> Event {
        let _busy = self.stream.enter_producer();
        if self.streaming_region().is_none() {
            self.pending = Event::NONE;
            return Event::NONE;
        }
        let raised = self.complete(completion);
        self.notify(raised);
        raised
    }

    /// The device reports it will produce or consume nothing more.
    ///
    /// Discards any in-flight block, stops the session and raises
    /// `END_OF_STREAM`.
    pub fn end_of_stream(&mut self) -> Event {
        let _busy = self.stream.enter_producer();
        if !self
            .stream
            .session()
            .transition(SessionState::Streaming, SessionState::Stopped)
        {
            return Event::NONE;
        }
        let pending = core::mem::take(&mut self.pending);
        let discarded = self.stream.ring().producer_discard(self.stream.direction());
        self.stream.raise_flags(Event::END_OF_STREAM);
        let mut raised = Event::END_OF_STREAM;
        if discarded.is_some() {
            raised |= pending;
        }
        self.notify(raised);
        raised
    }

    /// Region the next transfer will use, for arming DMA ahead of time.
    pub fn next_region(&self) -> Option<BlockRegion> {
        if self.stream.session_state() != SessionState::Streaming {
            return None;
        }
        let ring = self.stream.ring();
        let index = ring.in_flight().or_else(|| ring.producer_position())?;
        self.stream.block_at(index)
    }

    // ── Private helpers (caller holds the busy guard) ──────────────────

    fn streaming_region(&self) -> Option<Region> {
        if self.stream.session_state() != SessionState::Streaming {
            return None;
        }
        self.stream.region()
    }

    /// Take the in-flight block, or a new one under the overflow policy.
    fn acquire(&mut self) -> (Option<usize>, Event) {
        let ring = self.stream.ring();
        if let Some(index) = ring.in_flight() {
            return (Some(index), Event::NONE);
        }
        // Nothing in flight: whatever `begin` stashed belonged to a block
        // that a stop or uninitialize already discarded.
        self.pending = Event::NONE;
        match ring.producer_acquire(self.stream.direction()) {
            ProducerSlot::Fresh(index) => {
                log::trace!("device took block {}", index);
                (Some(index), Event::NONE)
            }
            ProducerSlot::Overwritten(index) => {
                log::warn!("overflow: overwriting oldest unread block {}", index);
                self.stream.raise_flags(Event::OVERFLOW);
                (Some(index), Event::OVERFLOW)
            }
            ProducerSlot::Blocked => {
                log::warn!("overflow: next block is held by the application, data dropped");
                self.stream.raise_flags(Event::OVERFLOW);
                (None, Event::OVERFLOW)
            }
            ProducerSlot::Starved => {
                log::warn!("underflow: no ready block, transfer skipped");
                self.stream.raise_flags(Event::UNDERFLOW);
                (None, Event::UNDERFLOW)
            }
        }
    }

    /// Finish the in-flight block according to the device's completion.
    fn complete(&mut self, completion: Completion) -> Event {
        let direction = self.stream.direction();
        let ring = self.stream.ring();
        let pending = core::mem::take(&mut self.pending);

        if completion == Completion::Failed {
            return match ring.producer_discard(direction) {
                Some(index) => {
                    log::warn!("device transfer failed, block {} discarded", index);
                    pending
                }
                None => Event::NONE,
            };
        }

        let Some(index) = ring.producer_complete(direction) else {
            return Event::NONE;
        };
        log::trace!("device finished block {}", index);
        let mut raised = pending | Event::DATA;

        if completion == Completion::Last || self.stream.mode() == Mode::Single {
            self.stream
                .session()
                .transition(SessionState::Streaming, SessionState::Stopped);
            self.stream.raise_flags(Event::END_OF_STREAM);
            raised |= Event::END_OF_STREAM;
        }
        raised
    }

    fn notify(&self, raised: Event) {
        // SAFETY: called with the busy guard held.
        let callback = unsafe { self.stream.callback() };
        event::raise(callback, raised);
    }
}
