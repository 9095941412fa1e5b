//! Image format selection.

use core::time::Duration;

use embedded_io::blocking::{Read, Seek};

use crate::{
    bmp::BmpDecoder,
    cani::{self, CaniDecoder},
    display::PixelSink,
    playback::{Decoder, Unit},
    storage, Error, Result,
};

/// Supported image file formats.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Format {
    /// CANI animation bytecode.
    Cani,
    /// Stack of uncompressed bitmaps.
    Bmp,
}

impl Format {
    /// Guesses the format by the file extension.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, extension) = name.rsplit_once('.')?;
        if extension.eq_ignore_ascii_case("pca") || extension.eq_ignore_ascii_case("cani") {
            Some(Self::Cani)
        } else if extension.eq_ignore_ascii_case("bmp") {
            Some(Self::Bmp)
        } else {
            None
        }
    }

    /// Guesses the format by the file signature.
    pub fn sniff(prefix: &[u8]) -> Option<Self> {
        if prefix.starts_with(&cani::MAGIC) {
            Some(Self::Cani)
        } else if prefix.starts_with(b"BM") {
            Some(Self::Bmp)
        } else {
            None
        }
    }

    /// Reads the file signature and rewinds the file.
    pub fn detect<R: Read + Seek>(file: &mut R) -> Result<Self> {
        let mut prefix = [0_u8; 4];
        let len = storage::read_up_to(file, &mut prefix)?;
        storage::seek_to(file, 0)?;

        Self::sniff(&prefix[..len]).ok_or(Error::UnsupportedFormat)
    }
}

/// Decoder of any supported format.
pub enum AnyDecoder<R> {
    Cani(CaniDecoder<R>),
    Bmp(BmpDecoder<R>),
}

impl<R> AnyDecoder<R>
where
    R: Read + Seek,
{
    /// Opens the file with the decoder chosen by the extension or, failing that,
    /// by the file contents.
    ///
    /// The frame delay is used by multi-frame bitmaps only.
    pub fn open(mut file: R, name: &str, frame_delay: Duration) -> Result<Self> {
        let format = match Format::from_file_name(name) {
            Some(format) => format,
            None => Format::detect(&mut file)?,
        };
        log::debug!("Loading {name} as {format:?}");

        match format {
            Format::Cani => CaniDecoder::open(file).map(Self::Cani),
            Format::Bmp => BmpDecoder::open(file, frame_delay).map(Self::Bmp),
        }
    }

    pub fn format(&self) -> Format {
        match self {
            AnyDecoder::Cani(_) => Format::Cani,
            AnyDecoder::Bmp(_) => Format::Bmp,
        }
    }
}

impl<R> Decoder for AnyDecoder<R>
where
    R: Read + Seek,
{
    fn restart<S: PixelSink>(&mut self, sink: &mut S) -> Result<()> {
        match self {
            AnyDecoder::Cani(decoder) => decoder.restart(sink),
            AnyDecoder::Bmp(decoder) => decoder.restart(sink),
        }
    }

    fn next_unit<S: PixelSink>(&mut self, sink: &mut S) -> Result<Unit> {
        match self {
            AnyDecoder::Cani(decoder) => decoder.next_unit(sink),
            AnyDecoder::Bmp(decoder) => decoder.next_unit(sink),
        }
    }

    fn position(&self) -> u64 {
        match self {
            AnyDecoder::Cani(decoder) => decoder.position(),
            AnyDecoder::Bmp(decoder) => decoder.position(),
        }
    }
}
