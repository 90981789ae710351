use crate::block::{Block, BufferInfo};
use crate::driver::StreamDriver;
use crate::error::StreamError;
use crate::event::EventCallback;
use crate::session::{Direction, Mode, SessionState};

use super::{BlockStream, StatusSnapshot};

/// Application-side handle: session lifecycle plus block retrieval.
///
/// Runs in the application's normal execution context. None of the block
/// operations wait: absence of a block is reported as `None`.
///
/// The application holds at most one block at a time. [`get_block()`]
/// borrows this handle, so the returned view must go out of scope before
/// [`release_block()`] can be called.
///
/// [`get_block()`]: Self::get_block
/// [`release_block()`]: Self::release_block
pub struct StreamControl<'s, 'buf, const N: usize> {
    stream: &'s BlockStream<'buf, N>,
    /// Block currently held by the application.
    held: Option<usize>,
}

impl<'s, 'buf, const N: usize> StreamControl<'s, 'buf, N> {
    pub(crate) fn new(stream: &'s BlockStream<'buf, N>) -> Self {
        StreamControl { stream, held: None }
    }

    /// The shared stream core.
    pub fn stream(&self) -> &'s BlockStream<'buf, N> {
        self.stream
    }

    pub fn direction(&self) -> Direction {
        self.stream.direction()
    }

    pub fn session_state(&self) -> SessionState {
        self.stream.session_state()
    }

    /// Move `Uninitialized → Configured` and store the event callback.
    ///
    /// With no callback, events are dropped and the application polls
    /// [`status()`](Self::status) and [`get_block()`](Self::get_block).
    pub fn initialize(&mut self, callback: Option<EventCallback<'buf>>) -> Result<(), StreamError> {
        if self.stream.session_state() != SessionState::Uninitialized {
            return Err(StreamError::AlreadyInitialized);
        }
        self.stream.quiesce();
        // SAFETY: the session is not streaming and the producer is quiesced.
        unsafe { self.stream.set_callback(callback) };
        self.held = None;
        self.stream.clear_flags();
        self.stream.session().store(SessionState::Configured);
        Ok(())
    }

    /// Return to `Uninitialized` from any state.
    ///
    /// Stops a running stream, drops the buffer registration and the
    /// callback. Calling it again is a no-op.
    pub fn uninitialize(&mut self) -> Result<(), StreamError> {
        if self.stream.session_state() == SessionState::Uninitialized {
            return Ok(());
        }
        self.stream.session().store(SessionState::Uninitialized);
        self.stream.quiesce();
        self.stream.ring().producer_discard(self.stream.direction());
        self.stream.clear_region();
        // SAFETY: the session is not streaming and the producer is quiesced.
        unsafe { self.stream.set_callback(None) };
        self.stream.clear_flags();
        self.held = None;
        Ok(())
    }

    /// Register the memory region the stream exchanges blocks in.
    ///
    /// The region is split into `region.len() / block_size` blocks; trailing
    /// bytes are left unused. Valid in `Configured` and `Stopped`; from
    /// `Stopped` the session returns to `Configured`. Any previous
    /// registration is replaced and all blocks start `Free`. On error the
    /// previous registration and session state are left untouched.
    ///
    /// The block count may not exceed the stream's capacity `N`
    /// ([`DEFAULT_MAX_BLOCKS`](crate::constants::DEFAULT_MAX_BLOCKS) unless
    /// chosen otherwise); a region that splits into more blocks fails with
    /// [`StreamError::Parameter`].
    pub fn register_buffer(
        &mut self,
        region: &'buf mut [u8],
        block_size: usize,
    ) -> Result<BufferInfo, StreamError> {
        let state = self.stream.session_state();
        if !state.accepts_buffer() {
            return Err(StreamError::InvalidState(state));
        }
        let info = BufferInfo::compute(region.len(), block_size, N)?;

        self.stream.quiesce();
        self.stream.install_region(region.as_mut_ptr(), info);
        self.stream.clear_flags();
        self.held = None;
        if state == SessionState::Stopped {
            self.stream.session().store(SessionState::Configured);
        }
        log::debug!(
            "registered {} blocks of {} bytes ({} of {} bytes used)",
            info.block_count,
            info.block_size,
            info.usable_len,
            region.len()
        );
        Ok(info)
    }

    /// Start streaming in the given mode.
    ///
    /// Valid from `Configured` and `Stopped`; needs a registered buffer.
    /// Status flags are cleared. Blocks left in the ring by an earlier
    /// session keep their states, so a stopped stream resumes where it was.
    pub fn start(&mut self, mode: Mode) -> Result<(), StreamError> {
        let state = self.stream.session_state();
        if !state.can_start() {
            return Err(StreamError::InvalidState(state));
        }
        if self.stream.block_count() == 0 {
            return Err(StreamError::Parameter("no buffer registered"));
        }
        self.stream.clear_flags();
        self.stream.set_mode(mode);
        self.stream.session().store(SessionState::Streaming);
        Ok(())
    }

    /// Stop streaming.
    ///
    /// Waits for a running producer call to finish, then discards the block
    /// the device was working on without delivering it. The buffer stays
    /// registered.
    pub fn stop(&mut self) -> Result<(), StreamError> {
        if !self
            .stream
            .session()
            .transition(SessionState::Streaming, SessionState::Stopped)
        {
            return Err(StreamError::InvalidState(self.stream.session_state()));
        }
        self.stream.quiesce();
        if let Some(index) = self.stream.ring().producer_discard(self.stream.direction()) {
            log::debug!("stop discarded in-flight block {}", index);
        }
        Ok(())
    }

    /// Take the oldest block available to the application.
    ///
    /// Input streams hand out the oldest `Ready` block; output streams hand
    /// out the oldest `Free` block to fill. Returns `None` when no such
    /// block exists, no buffer is registered, or a block is already held.
    pub fn get_block(&mut self) -> Option<Block<'_>> {
        if self.held.is_some() {
            log::trace!("get_block while block {:?} is held", self.held);
            return None;
        }
        if self.stream.session_state() == SessionState::Uninitialized {
            return None;
        }
        let region = self.stream.region()?;
        let index = self.stream.ring().consumer_acquire(self.stream.direction())?;
        self.held = Some(index);
        log::trace!("application took block {}", index);
        // SAFETY: the ring just moved this block to ConsumerOwned, so neither
        // the producer nor another `get_block` can reach it until released.
        Some(Block::new(index, unsafe { region.block_mut(index) }))
    }

    /// View the block taken by the last `get_block` again.
    pub fn held_block(&mut self) -> Option<Block<'_>> {
        let index = self.held?;
        let region = self.stream.region()?;
        // SAFETY: the block is still ConsumerOwned by this handle.
        Some(Block::new(index, unsafe { region.block_mut(index) }))
    }

    /// Hand the held block back.
    ///
    /// Input streams return it to `Free` for the device to refill; output
    /// streams mark it `Ready` for the device to transmit.
    pub fn release_block(&mut self) -> Result<(), StreamError> {
        let state = self.stream.session_state();
        if state == SessionState::Uninitialized {
            return Err(StreamError::InvalidState(state));
        }
        let index = self.held.take().ok_or(StreamError::NoActiveBlock)?;
        if !self.stream.ring().consumer_release(self.stream.direction(), index) {
            log::error!("held block {} was not consumer-owned", index);
            return Err(StreamError::Operation);
        }
        log::trace!("application released block {}", index);
        Ok(())
    }

    pub fn status(&self) -> StatusSnapshot {
        self.stream.status()
    }

    pub fn block_count(&self) -> usize {
        self.stream.block_count()
    }
}

impl<'buf, const N: usize> StreamDriver<'buf> for StreamControl<'_, 'buf, N> {
    fn initialize(&mut self, callback: Option<EventCallback<'buf>>) -> Result<(), StreamError> {
        StreamControl::initialize(self, callback)
    }

    fn uninitialize(&mut self) -> Result<(), StreamError> {
        StreamControl::uninitialize(self)
    }

    fn register_buffer(
        &mut self,
        region: &'buf mut [u8],
        block_size: usize,
    ) -> Result<BufferInfo, StreamError> {
        StreamControl::register_buffer(self, region, block_size)
    }

    fn start(&mut self, mode: Mode) -> Result<(), StreamError> {
        StreamControl::start(self, mode)
    }

    fn stop(&mut self) -> Result<(), StreamError> {
        StreamControl::stop(self)
    }

    fn get_block(&mut self) -> Option<Block<'_>> {
        StreamControl::get_block(self)
    }

    fn release_block(&mut self) -> Result<(), StreamError> {
        StreamControl::release_block(self)
    }

    fn status(&self) -> StatusSnapshot {
        StreamControl::status(self)
    }
}
