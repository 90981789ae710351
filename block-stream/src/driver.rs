use crate::block::{Block, BufferInfo};
use crate::error::StreamError;
use crate::event::EventCallback;
use crate::session::Mode;
use crate::stream::StatusSnapshot;

/// Application-facing operations of a block stream.
///
/// Code written against this trait works with any device's stream without
/// knowing how the device moves data; only the producer side differs between
/// devices (see [`BlockDevice`](crate::device::BlockDevice)).
pub trait StreamDriver<'buf> {
    /// Enter the configured state, optionally registering an event callback.
    fn initialize(&mut self, callback: Option<EventCallback<'buf>>) -> Result<(), StreamError>;

    /// Return to the uninitialized state from any state.
    fn uninitialize(&mut self) -> Result<(), StreamError>;

    /// Register the shared memory region and its block size.
    fn register_buffer(
        &mut self,
        region: &'buf mut [u8],
        block_size: usize,
    ) -> Result<BufferInfo, StreamError>;

    /// Start streaming.
    fn start(&mut self, mode: Mode) -> Result<(), StreamError>;

    /// Stop streaming.
    fn stop(&mut self) -> Result<(), StreamError>;

    /// Take the oldest block available to the application, if any.
    fn get_block(&mut self) -> Option<Block<'_>>;

    /// Hand back the block taken by `get_block`.
    fn release_block(&mut self) -> Result<(), StreamError>;

    /// Current status flags.
    fn status(&self) -> StatusSnapshot;
}
