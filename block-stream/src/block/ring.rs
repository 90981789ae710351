use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use crate::constants::NO_BLOCK;
use crate::session::Direction;

/// Ownership state of one block.
///
/// Every block cycles `Free → ProducerOwned → Ready → ConsumerOwned → Free`
/// for input streams. Output streams walk the same ring with the roles
/// swapped: the application takes `Free` blocks and the device takes `Ready`
/// ones.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    Free = 0,
    ProducerOwned = 1,
    Ready = 2,
    ConsumerOwned = 3,
}

impl BlockState {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => BlockState::ProducerOwned,
            2 => BlockState::Ready,
            3 => BlockState::ConsumerOwned,
            _ => BlockState::Free,
        }
    }
}

impl Direction {
    /// State the device side takes a block from.
    const fn producer_takes(self) -> BlockState {
        match self {
            Direction::Input => BlockState::Free,
            Direction::Output => BlockState::Ready,
        }
    }

    /// State the device side leaves a finished block in.
    const fn producer_yields(self) -> BlockState {
        match self {
            Direction::Input => BlockState::Ready,
            Direction::Output => BlockState::Free,
        }
    }

    /// State the application takes a block from.
    const fn consumer_takes(self) -> BlockState {
        match self {
            Direction::Input => BlockState::Ready,
            Direction::Output => BlockState::Free,
        }
    }

    /// State the application leaves a released block in.
    const fn consumer_yields(self) -> BlockState {
        match self {
            Direction::Input => BlockState::Free,
            Direction::Output => BlockState::Ready,
        }
    }
}

/// Outcome of the device side trying to take its next block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProducerSlot {
    /// Took a block in the expected state.
    Fresh(usize),
    /// Input only: the next block still held unread data, which is now lost.
    Overwritten(usize),
    /// Input only: the next block is held by the application; new data must
    /// be dropped.
    Blocked,
    /// Output only: no block is ready to transmit.
    Starved,
}

/// Lock-free per-block state table with independent producer and consumer
/// ring positions.
///
/// Single-producer single-consumer: the device side calls the `producer_*`
/// methods, the application side calls the `consumer_*` methods. Each block
/// changes hands only through a compare-and-swap on its state, so at most one
/// side owns a block at any instant.
pub struct BlockRing<const N: usize> {
    states: [AtomicU8; N],
    /// Number of blocks in use (`<= N`).
    count: AtomicUsize,
    /// Next block the device side will take.
    producer: AtomicUsize,
    /// Next block the application side will take.
    consumer: AtomicUsize,
    /// Block currently owned by the device side, or `NO_BLOCK`.
    in_flight: AtomicUsize,
}

impl<const N: usize> BlockRing<N> {
    #[allow(clippy::declare_interior_mut_const)]
    pub const fn new() -> Self {
        const FREE: AtomicU8 = AtomicU8::new(BlockState::Free as u8);
        BlockRing {
            states: [FREE; N],
            count: AtomicUsize::new(0),
            producer: AtomicUsize::new(0),
            consumer: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(NO_BLOCK),
        }
    }

    /// Put `count` blocks into the ring, all `Free`, both positions at 0.
    ///
    /// Must not race with either side.
    pub(crate) fn reset(&self, count: usize) {
        debug_assert!(count <= N);
        for state in &self.states {
            state.store(BlockState::Free as u8, Ordering::Release);
        }
        self.producer.store(0, Ordering::Release);
        self.consumer.store(0, Ordering::Release);
        self.in_flight.store(NO_BLOCK, Ordering::Release);
        self.count.store(count, Ordering::Release);
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    pub fn state(&self, index: usize) -> BlockState {
        BlockState::from_u8(self.states[index].load(Ordering::Acquire))
    }

    /// Number of blocks in the `Ready` state.
    pub fn ready_count(&self) -> usize {
        (0..self.count())
            .filter(|&i| self.state(i) == BlockState::Ready)
            .count()
    }

    fn next(&self, index: usize) -> usize {
        (index + 1) % self.count()
    }

    fn swap_state(&self, index: usize, from: BlockState, to: BlockState) -> bool {
        self.states[index]
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    // ── Application side ───────────────────────────────────────────────

    /// Take the oldest block the application may use: `Ready` for input,
    /// `Free` for output. Returns `None` if that block is not available.
    pub(crate) fn consumer_acquire(&self, direction: Direction) -> Option<usize> {
        if self.count() == 0 {
            return None;
        }
        let want = direction.consumer_takes();
        // The device side can overwrite the head between our load and our
        // claim; retry a bounded number of times so FIFO order is kept.
        for _ in 0..=self.count() {
            let head = self.consumer.load(Ordering::Acquire);
            if !self.swap_state(head, want, BlockState::ConsumerOwned) {
                return None;
            }
            let advanced = self
                .consumer
                .compare_exchange(head, self.next(head), Ordering::AcqRel, Ordering::Acquire)
                .is_ok();
            if advanced {
                return Some(head);
            }
            // Claimed a block that was overwritten and re-queued behind us.
            self.swap_state(head, BlockState::ConsumerOwned, want);
        }
        None
    }

    /// Hand a held block back: `Free` for input, `Ready` for output.
    pub(crate) fn consumer_release(&self, direction: Direction, index: usize) -> bool {
        self.swap_state(index, BlockState::ConsumerOwned, direction.consumer_yields())
    }

    // ── Device side ────────────────────────────────────────────────────

    /// Block the device side is working on, if any.
    pub(crate) fn in_flight(&self) -> Option<usize> {
        match self.in_flight.load(Ordering::Acquire) {
            NO_BLOCK => None,
            index => Some(index),
        }
    }

    /// Block the next [`producer_acquire`](Self::producer_acquire) will target.
    pub(crate) fn producer_position(&self) -> Option<usize> {
        if self.count() == 0 {
            return None;
        }
        Some(self.producer.load(Ordering::Acquire))
    }

    /// Take the device side's next block.
    ///
    /// Input streams overwrite the oldest unread block when the ring is full,
    /// moving the application's read position past it. If the application
    /// holds that block instead, the new data has nowhere to go.
    pub(crate) fn producer_acquire(&self, direction: Direction) -> ProducerSlot {
        let Some(pos) = self.producer_position() else {
            return match direction {
                Direction::Input => ProducerSlot::Blocked,
                Direction::Output => ProducerSlot::Starved,
            };
        };

        if self.swap_state(pos, direction.producer_takes(), BlockState::ProducerOwned) {
            self.in_flight.store(pos, Ordering::Release);
            return ProducerSlot::Fresh(pos);
        }

        match direction {
            Direction::Input => {
                if self.swap_state(pos, BlockState::Ready, BlockState::ProducerOwned) {
                    // A full ring means the oldest unread block sits at our position.
                    let _ = self.consumer.compare_exchange(
                        pos,
                        self.next(pos),
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    );
                    self.in_flight.store(pos, Ordering::Release);
                    ProducerSlot::Overwritten(pos)
                } else {
                    ProducerSlot::Blocked
                }
            }
            Direction::Output => ProducerSlot::Starved,
        }
    }

    /// Finish the in-flight block: `Ready` for input, `Free` for output.
    ///
    /// Returns `None` if nothing was in flight (for example because the
    /// block was discarded by a stop).
    pub(crate) fn producer_complete(&self, direction: Direction) -> Option<usize> {
        let index = self.take_in_flight()?;
        self.states[index].store(direction.producer_yields() as u8, Ordering::Release);
        self.producer.store(self.next(index), Ordering::Release);
        Some(index)
    }

    /// Drop the in-flight block without delivering it.
    ///
    /// The block goes back to `Free`. Output streams also step past it, since
    /// its data was already handed over by the application.
    pub(crate) fn producer_discard(&self, direction: Direction) -> Option<usize> {
        let index = self.take_in_flight()?;
        self.states[index].store(BlockState::Free as u8, Ordering::Release);
        if direction == Direction::Output {
            self.producer.store(self.next(index), Ordering::Release);
        }
        Some(index)
    }

    fn take_in_flight(&self) -> Option<usize> {
        match self.in_flight.swap(NO_BLOCK, Ordering::AcqRel) {
            NO_BLOCK => None,
            index => Some(index),
        }
    }
}
