use crate::constants::MIN_RECOMMENDED_BLOCKS;
use crate::error::StreamError;

/// Geometry of a registered stream buffer.
///
/// `block_count = capacity / block_size` (truncated); any tail bytes past
/// `usable_len` are never handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferInfo {
    pub block_size: usize,
    pub block_count: usize,
    pub usable_len: usize,
}

impl BufferInfo {
    /// Compute the block layout for a region of `len` bytes.
    ///
    /// Fails with [`StreamError::Parameter`] when the block size is zero,
    /// larger than the region, or when the region would yield more blocks
    /// than the stream can track (`max_blocks`).
    pub fn compute(len: usize, block_size: usize, max_blocks: usize) -> Result<Self, StreamError> {
        if block_size == 0 {
            return Err(StreamError::Parameter("block size is zero"));
        }
        if block_size > len {
            return Err(StreamError::Parameter("block size exceeds buffer size"));
        }
        let block_count = len / block_size;
        if block_count > max_blocks {
            return Err(StreamError::Parameter("buffer holds more blocks than the stream tracks"));
        }
        if block_count < MIN_RECOMMENDED_BLOCKS {
            log::warn!(
                "stream buffer has {} block(s); producer and consumer will stall on each other",
                block_count
            );
        }
        Ok(BufferInfo {
            block_size,
            block_count,
            usable_len: block_count * block_size,
        })
    }

    /// Byte offset of block `index` from the buffer base.
    pub const fn offset_of(&self, index: usize) -> usize {
        index * self.block_size
    }
}

/// Location of one block inside the registered buffer.
///
/// `addr` is the absolute address, suitable for programming a DMA channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRegion {
    pub index: usize,
    pub offset: usize,
    pub len: usize,
    pub addr: usize,
}

/// A registered buffer: base pointer plus geometry.
#[derive(Clone, Copy)]
pub(crate) struct Region {
    base: *mut u8,
    info: BufferInfo,
}

impl Region {
    pub(crate) fn new(base: *mut u8, info: BufferInfo) -> Self {
        Region { base, info }
    }

    pub(crate) fn info(&self) -> BufferInfo {
        self.info
    }

    pub(crate) fn block_at(&self, index: usize) -> Option<BlockRegion> {
        if index >= self.info.block_count {
            return None;
        }
        let offset = self.info.offset_of(index);
        Some(BlockRegion {
            index,
            offset,
            len: self.info.block_size,
            addr: self.base as usize + offset,
        })
    }

    /// Mutable view of block `index`.
    ///
    /// # Safety
    ///
    /// `index < block_count`, and the caller must currently own the block
    /// under the ownership protocol so no other view of it exists.
    pub(crate) unsafe fn block_mut<'a>(&self, index: usize) -> &'a mut [u8] {
        debug_assert!(index < self.info.block_count);
        unsafe {
            core::slice::from_raw_parts_mut(
                self.base.add(self.info.offset_of(index)),
                self.info.block_size,
            )
        }
    }
}
