//! The block stream engine.
//!
//! [`BlockStream`] is the shared core: session state, block ring, status
//! flags and the registered buffer, all behind atomics so it can live in a
//! `static` and be touched from interrupt context. It is used through two
//! handles obtained once with [`BlockStream::split()`]:
//!
//! | Handle | Context | Operations |
//! |--------|---------|------------|
//! | [`StreamControl`] | application | lifecycle, `get_block` / `release_block` |
//! | [`StreamProducer`] | device (ISR, DMA, timer) | `advance`, `begin` / `finish` |
//!
//! ## Usage
//!
//! ```ignore
//! static STREAM: BlockStream<'static, 4> = BlockStream::new(Direction::Input);
//! static mut MEMORY: [u8; 1024] = [0; 1024];
//!
//! let (mut control, mut producer) = STREAM.split().unwrap();
//! control.initialize(Some(&on_event))?;
//! control.register_buffer(unsafe { &mut *core::ptr::addr_of_mut!(MEMORY) }, 256)?;
//! control.start(Mode::Continuous)?;
//!
//! // In the DMA completion ISR:
//! producer.advance(|block| { copy_samples(block); Completion::Done });
//!
//! // In the application:
//! if let Some(block) = control.get_block() {
//!     process(&block);
//! }
//! control.release_block()?;
//! ```

mod control;
mod producer;


pub use control::StreamControl;
pub use producer::StreamProducer;

use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicBool, AtomicPtr, AtomicU8, AtomicUsize, Ordering};

use crate::block::{BlockRegion, BlockRing, BlockState, BufferInfo, Region};
use crate::constants::DEFAULT_MAX_BLOCKS;
use crate::event::{Event, EventCallback};
use crate::session::{AtomicSession, Direction, Mode, SessionState};

/// Point-in-time view of a stream's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    /// The session is streaming.
    pub active: bool,
    /// An input producer found no free block since the last `start`.
    pub overflow: bool,
    /// An output producer found no ready block since the last `start`.
    pub underflow: bool,
    /// The stream ended (single block delivered, or the device signalled end).
    pub end_of_stream: bool,
    /// Blocks currently in the `Ready` state.
    pub ready_count: usize,
}

/// Shared core of a block stream with room for up to `N` blocks.
///
/// `'buf` is the lifetime of the registered memory region and the event
/// callback; use `'static` when the stream itself is a `static`.
pub struct BlockStream<'buf, const N: usize = DEFAULT_MAX_BLOCKS> {
    direction: Direction,
    session: AtomicSession,
    mode: AtomicU8,
    /// Sticky status bits, stored as [`Event`] bits.
    flags: AtomicU8,
    ring: BlockRing<N>,
    base: AtomicPtr<u8>,
    block_size: AtomicUsize,
    /// Set while a producer call is running; `stop` waits for it to clear.
    producer_busy: AtomicBool,
    split: AtomicBool,
    /// Written only while no producer call can observe a streaming session.
    callback: UnsafeCell<Option<EventCallback<'buf>>>,
    _buffer: PhantomData<&'buf mut [u8]>,
}

// SAFETY: All state shared between the two handles is atomic except the
// callback cell, which is written only by the control handle after the
// producer has been quiesced and read only by the producer while the
// session is streaming. Block memory is accessed only by the side that owns
// the block under the ring protocol.
unsafe impl<const N: usize> Sync for BlockStream<'_, N> {}

impl<'buf, const N: usize> BlockStream<'buf, N> {
    /// Create an uninitialized stream for a device of the given direction.
    pub const fn new(direction: Direction) -> Self {
        assert!(N >= 1, "a block stream needs room for at least one block");
        BlockStream {
            direction,
            session: AtomicSession::new(),
            mode: AtomicU8::new(Mode::Continuous as u8),
            flags: AtomicU8::new(0),
            ring: BlockRing::new(),
            base: AtomicPtr::new(core::ptr::null_mut()),
            block_size: AtomicUsize::new(0),
            producer_busy: AtomicBool::new(false),
            split: AtomicBool::new(false),
            callback: UnsafeCell::new(None),
            _buffer: PhantomData,
        }
    }

    /// Hand out the application and device handles. Succeeds once.
    pub fn split(&self) -> Option<(StreamControl<'_, 'buf, N>, StreamProducer<'_, 'buf, N>)> {
        if self.split.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some((StreamControl::new(self), StreamProducer::new(self)))
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn session_state(&self) -> SessionState {
        self.session.load()
    }

    pub fn mode(&self) -> Mode {
        Mode::from_u8(self.mode.load(Ordering::Acquire))
    }

    /// Fresh snapshot of the stream's status flags.
    pub fn status(&self) -> StatusSnapshot {
        let flags = Event::from_bits_truncate(self.flags.load(Ordering::Acquire));
        StatusSnapshot {
            active: self.session.load() == SessionState::Streaming,
            overflow: flags.contains(Event::OVERFLOW),
            underflow: flags.contains(Event::UNDERFLOW),
            end_of_stream: flags.contains(Event::END_OF_STREAM),
            ready_count: self.ring.ready_count(),
        }
    }

    /// Number of blocks in the registered buffer, 0 if none is registered.
    pub fn block_count(&self) -> usize {
        self.ring.count()
    }

    /// Geometry of the registered buffer.
    pub fn buffer_info(&self) -> Option<BufferInfo> {
        self.region().map(|r| r.info())
    }

    /// Location of block `index`, or `None` if out of range.
    pub fn block_at(&self, index: usize) -> Option<BlockRegion> {
        self.region()?.block_at(index)
    }

    /// Ownership state of block `index`.
    pub fn block_state(&self, index: usize) -> Option<BlockState> {
        (index < self.block_count()).then(|| self.ring.state(index))
    }

    // ── Crate-internal plumbing ────────────────────────────────────────

    pub(crate) fn ring(&self) -> &BlockRing<N> {
        &self.ring
    }

    pub(crate) fn session(&self) -> &AtomicSession {
        &self.session
    }

    pub(crate) fn region(&self) -> Option<Region> {
        let count = self.ring.count();
        if count == 0 {
            return None;
        }
        let base = self.base.load(Ordering::Acquire);
        let block_size = self.block_size.load(Ordering::Acquire);
        if base.is_null() || block_size == 0 {
            return None;
        }
        Some(Region::new(
            base,
            BufferInfo {
                block_size,
                block_count: count,
                usable_len: count * block_size,
            },
        ))
    }

    /// Install a new buffer; every block starts `Free`.
    pub(crate) fn install_region(&self, base: *mut u8, info: BufferInfo) {
        self.ring.reset(0);
        self.base.store(base, Ordering::Release);
        self.block_size.store(info.block_size, Ordering::Release);
        self.ring.reset(info.block_count);
    }

    pub(crate) fn clear_region(&self) {
        self.ring.reset(0);
        self.base.store(core::ptr::null_mut(), Ordering::Release);
        self.block_size.store(0, Ordering::Release);
    }

    pub(crate) fn set_mode(&self, mode: Mode) {
        self.mode.store(mode as u8, Ordering::Release);
    }

    pub(crate) fn raise_flags(&self, event: Event) {
        self.flags.fetch_or(event.bits(), Ordering::AcqRel);
    }

    pub(crate) fn clear_flags(&self) {
        self.flags.store(0, Ordering::Release);
    }

    /// # Safety
    ///
    /// Call only after [`quiesce`](Self::quiesce) with the session not
    /// streaming, so no producer call can read the cell concurrently.
    pub(crate) unsafe fn set_callback(&self, callback: Option<EventCallback<'buf>>) {
        unsafe { *self.callback.get() = callback };
    }

    /// # Safety
    ///
    /// Call only from a producer call holding the busy guard.
    pub(crate) unsafe fn callback(&self) -> Option<EventCallback<'buf>> {
        unsafe { *self.callback.get() }
    }

    /// Mark a producer call as running until the guard drops.
    pub(crate) fn enter_producer(&self) -> ProducerGuard<'_> {
        self.producer_busy.store(true, Ordering::SeqCst);
        ProducerGuard(&self.producer_busy)
    }

    /// Wait for a running producer call to return.
    ///
    /// The session must already have left `Streaming`, so any producer call
    /// that starts afterwards returns without touching the ring.
    pub(crate) fn quiesce(&self) {
        while self.producer_busy.load(Ordering::SeqCst) {
            core::hint::spin_loop();
        }
    }
}

/// Clears the producer-busy flag on drop.
pub(crate) struct ProducerGuard<'a>(&'a AtomicBool);

impl Drop for ProducerGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
