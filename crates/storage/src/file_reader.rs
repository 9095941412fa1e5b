//! File reader wrapper over block reader.

use embedded_io::{
    blocking::{Read, Seek},
    Io, SeekFrom,
};

use crate::{BlockReader, DEFAULT_BLOCK_SIZE};

/// File reader error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileError<E> {
    /// The underlying block device failed.
    Block(E),
    /// Attempt to seek before the start or past the end of the file.
    InvalidSeek,
}

impl<E: core::fmt::Debug> embedded_io::Error for FileError<E> {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::Other
    }
}

/// Reads a file of the known length through a single block buffer.
#[derive(Debug)]
pub struct FileReader<T, B, const N: usize = DEFAULT_BLOCK_SIZE>
where
    T: BlockReader<N>,
{
    block_reader: T,

    file_len: usize,
    pos: usize,
    /// Index of the block held in the buffer.
    cached_block: Option<usize>,

    block: B,
}

impl<T, const N: usize> FileReader<T, [u8; N], N>
where
    T: BlockReader<N>,
{
    pub const fn new_in_array(block_reader: T, file_len: usize) -> Self {
        Self {
            block_reader,
            file_len,
            pos: 0,
            cached_block: None,
            block: [0_u8; N],
        }
    }
}

impl<T, B, const N: usize> FileReader<T, B, N>
where
    T: BlockReader<N>,
    B: AsMut<[u8]>,
{
    pub fn new(block_reader: T, file_len: usize, mut block: B) -> Self {
        assert!(
            block.as_mut().len() >= N,
            "Given buffer has not enough capacity to store the entire block content"
        );

        Self {
            block_reader,
            file_len,
            pos: 0,
            cached_block: None,
            block,
        }
    }

    /// Returns the total file length.
    pub const fn len(&self) -> usize {
        self.file_len
    }

    /// Returns the remaining bytes to read.
    pub const fn bytes_remaining(&self) -> usize {
        self.file_len - self.pos
    }

    /// Return true if there are no remaining bytes to read.
    pub const fn is_empty(&self) -> bool {
        self.bytes_remaining() == 0
    }

    pub fn into_inner(self) -> T {
        self.block_reader
    }

    const fn current_block(&self) -> usize {
        self.pos / N
    }

    fn load_current_block(&mut self) -> Result<(), T::Error> {
        let index = self.current_block();
        if self.cached_block == Some(index) {
            return Ok(());
        }

        // The last block of the file may be incomplete.
        let to = core::cmp::min(self.file_len - index * N, N);
        log::trace!("Filling block {index} [0..{to}]");

        let buf = &mut self.block.as_mut()[0..to];
        self.cached_block = None;
        self.block_reader.read_block(index, buf)?;
        self.cached_block = Some(index);
        Ok(())
    }
}

impl<T: BlockReader<N>, B, const N: usize> Io for FileReader<T, B, N> {
    type Error = FileError<T::Error>;
}

impl<T, B, const N: usize> Seek for FileReader<T, B, N>
where
    T: BlockReader<N>,
    B: AsMut<[u8]>,
{
    fn seek(&mut self, seek: SeekFrom) -> Result<u64, Self::Error> {
        let pos = match seek {
            SeekFrom::Start(pos) => usize::try_from(pos).ok(),
            SeekFrom::Current(offset) => offset_pos(self.pos, offset),
            SeekFrom::End(offset) => offset_pos(self.file_len, offset),
        };

        match pos {
            Some(pos) if pos <= self.file_len => {
                self.pos = pos;
                Ok(pos as u64)
            }
            _ => Err(FileError::InvalidSeek),
        }
    }
}

fn offset_pos(base: usize, offset: i64) -> Option<usize> {
    let offset = isize::try_from(offset).ok()?;
    base.checked_add_signed(offset)
}

impl<T, B, const N: usize> Read for FileReader<T, B, N>
where
    T: BlockReader<N>,
    B: AsMut<[u8]>,
{
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        // Just return if there is nothing to read or given buffer has zero size.
        if self.is_empty() || buf.is_empty() {
            return Ok(0);
        }
        self.load_current_block().map_err(FileError::Block)?;

        // Compute how much bytes we can copy to the outgoing buffer.
        let max_bytes_to_read = core::cmp::min(self.bytes_remaining(), buf.len());
        // We can read no more than the remaining part of the current block.
        let from = self.pos % N;
        let bytes_to_read = core::cmp::min(max_bytes_to_read, N - from);
        let to = from + bytes_to_read;

        buf[0..bytes_to_read].copy_from_slice(&self.block.as_mut()[from..to]);
        self.pos += bytes_to_read;
        Ok(bytes_to_read)
    }
}
