/// Default block capacity of a [`BlockStream`](crate::stream::BlockStream).
pub const DEFAULT_MAX_BLOCKS: usize = 32;

/// Fewer blocks than this still work, but producer and consumer end up
/// contending for the same block and latency is no longer bounded.
pub const MIN_RECOMMENDED_BLOCKS: usize = 2;

/// Sentinel stored in index slots that hold no block.
pub(crate) const NO_BLOCK: usize = usize::MAX;
