use core::ops::{Deref, DerefMut};

/// Exclusive view of a block held by the application.
///
/// Returned by `get_block`. Provides `Deref`/`DerefMut` access to the block's
/// bytes. The view borrows the stream handle, so it must be dropped before
/// `release_block` hands the block back; dropping the view does not release
/// the block.
pub struct Block<'a> {
    index: usize,
    data: &'a mut [u8],
}

impl<'a> Block<'a> {
    pub(crate) fn new(index: usize, data: &'a mut [u8]) -> Self {
        Block { index, data }
    }

    /// Ring index of this block.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Deref for Block<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.data
    }
}

impl DerefMut for Block<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.data
    }
}

impl core::fmt::Debug for Block<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Block")
            .field("index", &self.index)
            .field("len", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_and_read() {
        let mut mem = [0u8; 16];
        let mut block = Block::new(3, &mut mem[4..8]);
        assert_eq!(block.index(), 3);
        assert_eq!(block.len(), 4);

        block.copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(&block[..], &[1, 2, 3, 4]);
        drop(block);
        assert_eq!(&mem[4..8], &[1, 2, 3, 4]);
        assert_eq!(mem[3], 0);
        assert_eq!(mem[8], 0);
    }
}
