//! Block device plumbing for the image viewer storage.

#![cfg_attr(not(any(feature = "std", test)), no_std)]

use embedded_io::Io;

pub use self::{
    file_reader::{FileError, FileReader},
    flash::{FlashError, FlashRegion},
};

mod file_reader;
mod flash;
#[cfg(any(feature = "std", test))]
pub mod test_utils;

/// Block size used by default, the sector size of the SD cards.
pub const DEFAULT_BLOCK_SIZE: usize = 512;

/// Auxiliary trait describing reading from block devices.
pub trait BlockReader<const BLOCK_SIZE: usize>: Io {
    /// Read block content into the specified buffer.
    ///
    /// The buffer may be shorter than the block, only its length is read then.
    fn read_block(&self, index: usize, buf: &mut [u8]) -> Result<(), Self::Error>;
}

impl<const BLOCK_SIZE: usize> BlockReader<BLOCK_SIZE> for &[u8] {
    fn read_block(&self, index: usize, buf: &mut [u8]) -> Result<(), Self::Error> {
        let from = index * BLOCK_SIZE;
        let to = from + core::cmp::min(BLOCK_SIZE, buf.len());
        buf.copy_from_slice(&self[from..to]);
        Ok(())
    }
}
