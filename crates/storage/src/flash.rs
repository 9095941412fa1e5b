//! Files stored at a fixed region of a flash device.

use core::{cell::RefCell, fmt::Debug};

use embedded_io::Io;
use embedded_storage::ReadStorage;

use crate::BlockReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashError<E> {
    /// The block lies outside of the region.
    OutOfBounds,
    Storage(E),
}

impl<E: Debug> embedded_io::Error for FlashError<E> {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::Other
    }
}

/// A region of the flash memory seen as a block device.
#[derive(Debug)]
pub struct FlashRegion<S> {
    storage: RefCell<S>,
    base: u32,
    len: u32,
}

impl<S: ReadStorage> FlashRegion<S> {
    /// Creates a region of `len` bytes starting at the `base` offset.
    ///
    /// # Panics
    ///
    /// If the region does not fit into the storage capacity.
    pub fn new(storage: S, base: u32, len: u32) -> Self {
        assert!(
            base as usize + len as usize <= storage.capacity(),
            "The region {base:#x}+{len:#x} exceeds the storage capacity"
        );

        Self {
            storage: RefCell::new(storage),
            base,
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn into_inner(self) -> S {
        self.storage.into_inner()
    }
}

impl<S> Io for FlashRegion<S>
where
    S: ReadStorage,
    S::Error: Debug,
{
    type Error = FlashError<S::Error>;
}

impl<S, const BLOCK_SIZE: usize> BlockReader<BLOCK_SIZE> for FlashRegion<S>
where
    S: ReadStorage,
    S::Error: Debug,
{
    fn read_block(&self, index: usize, buf: &mut [u8]) -> Result<(), Self::Error> {
        let from = index
            .checked_mul(BLOCK_SIZE)
            .ok_or(FlashError::OutOfBounds)?;
        let len = core::cmp::min(BLOCK_SIZE, buf.len());
        if from + len > self.len() {
            return Err(FlashError::OutOfBounds);
        }

        // The region fits into the storage, so does the offset.
        let offset = self.base + from as u32;
        self.storage
            .borrow_mut()
            .read(offset, &mut buf[..len])
            .map_err(FlashError::Storage)
    }
}
