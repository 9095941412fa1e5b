//! Storage collaborator traits and read helpers.

use core::fmt::Debug;

use embedded_io::blocking::{Read, ReadExactError, Seek};

use crate::{Error, Result};

/// A file system volume holding the image files and the viewer configuration.
pub trait Volume {
    type Error: Debug;

    /// A read-only handle to an opened file.
    type File<'a>: Read + Seek
    where
        Self: 'a;

    /// Opens an existing file for reading.
    fn open(&mut self, name: &str) -> core::result::Result<Self::File<'_>, Self::Error>;
    /// Creates the file or truncates an existing one and writes `bytes` into it.
    fn write(&mut self, name: &str, bytes: &[u8]) -> core::result::Result<(), Self::Error>;
}

/// Fills the whole buffer, a short read is reported as [`Error::UnexpectedEof`].
pub fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|err| match err {
        ReadExactError::UnexpectedEof => Error::UnexpectedEof,
        ReadExactError::Other(err) => Error::storage_read(err),
    })
}

/// Reads a single byte, returns `None` at the end of the file.
pub fn read_byte<R: Read>(reader: &mut R) -> Result<Option<u8>> {
    let mut byte = [0_u8; 1];
    let bytes_read = reader.read(&mut byte).map_err(Error::storage_read)?;
    Ok((bytes_read == 1).then_some(byte[0]))
}

/// Reads until the buffer is full or the file ends, returns the number of bytes read.
pub fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut len = 0;
    while len < buf.len() {
        let bytes_read = reader.read(&mut buf[len..]).map_err(Error::storage_read)?;
        if bytes_read == 0 {
            break;
        }
        len += bytes_read;
    }
    Ok(len)
}

/// Moves the read position to the given offset from the file start.
pub fn seek_to<R: Seek>(reader: &mut R, offset: u64) -> Result<()> {
    reader
        .seek(embedded_io::SeekFrom::Start(offset))
        .map_err(Error::storage_read)?;
    Ok(())
}
