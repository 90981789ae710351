//! Buffer manager: block geometry, per-block ownership states and the
//! application's view of a held block.
//!
//! The registered memory region is split into `block_count` equal blocks.
//! Each block's [`BlockState`] lives in an atomic cell of a fixed-size
//! [`BlockRing`]; ownership moves between device and application only by
//! compare-and-swap on that cell.

mod handle;
mod layout;
mod ring;

pub use handle::Block;
pub use layout::{BlockRegion, BufferInfo};
pub use ring::{BlockRing, BlockState};

pub(crate) use layout::Region;
pub(crate) use ring::ProducerSlot;
