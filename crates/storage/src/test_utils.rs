//! Test helpers

use core::convert::Infallible;
use std::collections::BTreeMap;

use cani_core::storage::Volume;
use embedded_storage::{ReadStorage, Storage};

use crate::{FileReader, DEFAULT_BLOCK_SIZE};

/// In-memory embedded-storage backend.
pub struct MemoryBackend(pub Vec<u8>);

impl Default for MemoryBackend {
    fn default() -> Self {
        // Allocate 1MB memory by default, it would be enough for any possible
        // kind of tests
        Self(vec![0_u8; 1024 * 1024])
    }
}

impl ReadStorage for MemoryBackend {
    type Error = Infallible;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let from = offset as usize;
        let to = from + bytes.len();
        bytes.copy_from_slice(&self.0[from..to]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.0.len()
    }
}

impl Storage for MemoryBackend {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let from = offset as usize;
        let to = from + bytes.len();
        self.0[from..to].copy_from_slice(bytes);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeError {
    NotFound,
    ReadOnly,
}

/// In-memory volume with a flat directory.
#[derive(Debug, Default, Clone)]
pub struct MemoryVolume {
    files: BTreeMap<String, Vec<u8>>,
    read_only: bool,
}

impl MemoryVolume {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(mut self, name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(name, bytes);
        self
    }

    pub fn insert(&mut self, name: &str, bytes: impl Into<Vec<u8>>) {
        self.files.insert(name.to_owned(), bytes.into());
    }

    /// Returns the file contents.
    pub fn file(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    /// Makes all the subsequent writes fail.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }
}

impl Volume for MemoryVolume {
    type Error = VolumeError;

    type File<'a> = FileReader<&'a [u8], [u8; DEFAULT_BLOCK_SIZE]>
    where
        Self: 'a;

    fn open(&mut self, name: &str) -> Result<Self::File<'_>, Self::Error> {
        let bytes = self.files.get(name).ok_or(VolumeError::NotFound)?;
        Ok(FileReader::new_in_array(bytes.as_slice(), bytes.len()))
    }

    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.read_only {
            return Err(VolumeError::ReadOnly);
        }
        self.insert(name, bytes);
        Ok(())
    }
}

#[test]
fn test_embedded_storage_in_memory() {
    let mut backend = MemoryBackend::default();

    let expected_data = b"some bytes string".as_slice();

    for offset in 0..1024 {
        backend.write(offset, expected_data).unwrap();

        let mut actual_data = vec![0_u8; expected_data.len()];
        assert_ne!(expected_data, actual_data);
        backend.read(offset, &mut actual_data).unwrap();
        assert_eq!(expected_data, actual_data);
    }
}
