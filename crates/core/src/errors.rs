use core::fmt::Debug;

use displaydoc::Display;

/// A specialized result type for the playback core.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while loading and playing back an image file.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Debug)]
pub enum Error {
    /// Unable to read bytes from storage.
    StorageRead,
    /// The file ends in the middle of a header, a directive or a scanline.
    UnexpectedEof,
    /// Unable to write bytes to storage.
    StorageWrite,
    /// Unable to open the requested file.
    FileNotFound,
    /// The file signature does not match any supported format.
    UnsupportedFormat,
    /// The animation file version is not supported.
    UnsupportedVersion,
    /// The bitmap has more than one color plane.
    PlanesMismatch,
    /// The bitmap uses compression.
    Compressed,
    /// The bitmap carries a color palette.
    Palette,
    /// The image width does not match the display width.
    WidthMismatch,
    /// The animation height does not match the display height.
    HeightMismatch,
    /// The bitmap height is not a positive multiple of the display height.
    StackHeightMismatch,
    /// The bitmap depth is neither 24 nor 32 bits per pixel.
    UnsupportedBitDepth,
    /// A pixel instruction runs past the end of its pixel block.
    InstructionOverrun,
    /// Unknown pixel instruction tag {0:#04x}.
    UnknownInstruction(u8),
    /// Unable to send data to the display.
    Display,
}

/// Broad error categories.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    /// Storage I/O failure or short read.
    Read,
    /// Header, geometry or encoding mismatch.
    Format,
    /// Malformed animation instruction stream.
    StreamCorruption,
    /// Pixel bus failure.
    Display,
}

impl Error {
    /// Returns the category of this error.
    pub const fn kind(self) -> ErrorKind {
        match self {
            Error::StorageRead
            | Error::UnexpectedEof
            | Error::StorageWrite
            | Error::FileNotFound => ErrorKind::Read,

            Error::UnsupportedFormat
            | Error::UnsupportedVersion
            | Error::PlanesMismatch
            | Error::Compressed
            | Error::Palette
            | Error::WidthMismatch
            | Error::HeightMismatch
            | Error::StackHeightMismatch
            | Error::UnsupportedBitDepth => ErrorKind::Format,

            Error::InstructionOverrun | Error::UnknownInstruction(_) => {
                ErrorKind::StreamCorruption
            }

            Error::Display => ErrorKind::Display,
        }
    }

    /// Returns a message short enough to fit into a single line of the display.
    pub const fn short_message(self) -> &'static str {
        match self {
            Error::StorageRead => "file reading",
            Error::UnexpectedEof => "data IOerr",
            Error::StorageWrite => "file writing",
            Error::FileNotFound => "file not found",
            Error::UnsupportedFormat => "unsupported format",
            Error::UnsupportedVersion => "unsupported version",
            Error::PlanesMismatch => "> 1 plane!?",
            Error::Compressed => "compression!?",
            Error::Palette => "palette!?",
            Error::WidthMismatch => "ERR:width!=98",
            Error::HeightMismatch => "ERR:height!=70",
            Error::StackHeightMismatch => "ERR:height%70!=0",
            Error::UnsupportedBitDepth => "BPP!=24 or 32",
            Error::InstructionOverrun => "IBUF overrun",
            Error::UnknownInstruction(_) => "bad instruction",
            Error::Display => "LCD error",
        }
    }

    /// Creates a new storage read error.
    pub fn storage_read<E>(err: E) -> Self
    where
        E: Debug,
    {
        log::error!("Storage read failed: {err:?}");
        Self::StorageRead
    }

    /// Creates a new storage write error.
    pub fn storage_write<E>(err: E) -> Self
    where
        E: Debug,
    {
        log::error!("Storage write failed: {err:?}");
        Self::StorageWrite
    }

    /// Creates a new display bus error.
    pub fn display<E>(err: E) -> Self
    where
        E: Debug,
    {
        log::error!("Display bus failed: {err:?}");
        Self::Display
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        std::io::Error::new(std::io::ErrorKind::Other, err)
    }
}
