use crate::session::Direction;

/// How a device finished a block transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The block was transferred; more will follow.
    Done,
    /// The block was transferred and it is the device's last one.
    Last,
    /// The transfer failed; the block is discarded.
    Failed,
}

/// Producer-side capability implemented by each concrete device.
///
/// The stream engine owns block bookkeeping; a device only moves bytes into
/// (source) or out of (sink) the block it is handed. Drive it with
/// [`StreamProducer::pump()`](crate::stream::StreamProducer::pump).
pub trait BlockDevice {
    /// `Input` for sources, `Output` for sinks.
    fn direction(&self) -> Direction;

    /// Fill (input) or drain (output) one block.
    fn transfer(&mut self, block: &mut [u8]) -> Completion;
}
