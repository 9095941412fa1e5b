//! CANI animation format.
//!
//! ```text
//! offset 0: magic "CANI"
//! offset 4: version, 2
//! offset 5: width
//! offset 6: height
//! offset 7: directive stream
//! ```
//!
//! Every directive starts with a switch byte:
//!
//! - `0xxx_xxxx` - a pixel block of `xxx_xxxx * 2` bytes of pixel instructions follows;
//! - `1xxx_xxxx` - pause for `xxx_xxxx * 10` ms, zero means "until a key is pressed".
//!
//! Pixel instructions inside a block:
//!
//! - `0xxx_xxxx` - `xxx_xxxx` big-endian RGB565 words follow, sent literally
//!   (`0x00` is valid padding);
//! - `10xx_xxxx` - the following RGB565 word is repeated `xx_xxxx` times;
//! - `1100_0000` - four bytes `xs xe ys ye` follow, they change the drawing window.

use core::time::Duration;

use embedded_io::blocking::{Read, Seek};

pub use self::{
    interpreter::{run_block, Instruction, Instructions},
    writer::{
        pause_directive, BlockFull, BlockWriter, MAX_DIRECTIVE_LEN, MAX_LITERAL_LEN, MAX_REPEAT_LEN,
    },
};
use crate::{
    display::{self, PixelSink},
    playback::{Decoder, Pause, Unit},
    storage, Error, Result, DISPLAY_HEIGHT, DISPLAY_WIDTH,
};

mod interpreter;
mod writer;

pub const MAGIC: [u8; 4] = *b"CANI";
/// The only supported format version.
pub const VERSION: u8 = 2;
pub const HEADER_LEN: usize = 7;
/// The switch byte length field counts 16-bit words.
pub const MAX_BLOCK_LEN: usize = 0x7F * 2;

/// Length of a single pause tick in milliseconds.
pub const PAUSE_TICK_MS: u64 = 10;

const PAUSE_FLAG: u8 = 0x80;
const LENGTH_MASK: u8 = 0x7F;

/// Validated CANI file header.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Header {
    pub width: u8,
    pub height: u8,
}

impl Header {
    /// Header of an animation matching the display geometry.
    pub const DISPLAY: Self = Self {
        width: DISPLAY_WIDTH,
        height: DISPLAY_HEIGHT,
    };

    /// Checks the header fields in the file order.
    pub fn parse(bytes: &[u8; HEADER_LEN]) -> Result<Self> {
        if bytes[0..4] != MAGIC {
            return Err(Error::UnsupportedFormat);
        }
        if bytes[4] != VERSION {
            return Err(Error::UnsupportedVersion);
        }

        let header = Self {
            width: bytes[5],
            height: bytes[6],
        };
        if header.width != DISPLAY_WIDTH {
            return Err(Error::WidthMismatch);
        }
        if header.height != DISPLAY_HEIGHT {
            return Err(Error::HeightMismatch);
        }
        Ok(header)
    }

    /// Reads and validates the header at the current reader position.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = [0_u8; HEADER_LEN];
        storage::read_exact(reader, &mut bytes)?;
        Self::parse(&bytes)
    }

    pub fn to_bytes(self) -> [u8; HEADER_LEN] {
        let mut bytes = [0_u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&MAGIC);
        bytes[4] = VERSION;
        bytes[5] = self.width;
        bytes[6] = self.height;
        bytes
    }
}

/// A directive switch byte.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Directive {
    /// A pixel block of the given length in bytes follows.
    Pixels(usize),
    Pause(Pause),
}

impl Directive {
    pub const fn from_byte(byte: u8) -> Self {
        let value = byte & LENGTH_MASK;
        if byte & PAUSE_FLAG == 0 {
            Self::Pixels(value as usize * 2)
        } else if value == 0 {
            Self::Pause(Pause::Forever)
        } else {
            Self::Pause(Pause::For(Duration::from_millis(value as u64 * PAUSE_TICK_MS)))
        }
    }
}

/// Streaming decoder of a CANI file.
///
/// Reads one directive at a time into a single fixed-size instruction buffer.
pub struct CaniDecoder<R> {
    file: R,
    header: Header,
    /// Offset of the next directive.
    pos: u64,
    block: [u8; MAX_BLOCK_LEN],
}

impl<R> CaniDecoder<R>
where
    R: Read + Seek,
{
    /// Validates the header at the start of the file.
    pub fn open(mut file: R) -> Result<Self> {
        storage::seek_to(&mut file, 0)?;
        let header = Header::read_from(&mut file)?;
        log::debug!("Opened {}x{} animation", header.width, header.height);

        Ok(Self {
            file,
            header,
            pos: HEADER_LEN as u64,
            block: [0_u8; MAX_BLOCK_LEN],
        })
    }

    pub fn header(&self) -> Header {
        self.header
    }

    pub fn into_inner(self) -> R {
        self.file
    }
}

impl<R> Decoder for CaniDecoder<R>
where
    R: Read + Seek,
{
    fn restart<S: PixelSink>(&mut self, sink: &mut S) -> Result<()> {
        storage::seek_to(&mut self.file, HEADER_LEN as u64)?;
        self.pos = HEADER_LEN as u64;
        // A stream is not obliged to start with a window directive.
        display::reset_window(sink)
    }

    fn next_unit<S: PixelSink>(&mut self, sink: &mut S) -> Result<Unit> {
        let Some(switch) = storage::read_byte(&mut self.file)? else {
            return Ok(Unit::End);
        };
        self.pos += 1;

        match Directive::from_byte(switch) {
            Directive::Pixels(len) => {
                let block = &mut self.block[..len];
                storage::read_exact(&mut self.file, block)?;
                self.pos += len as u64;
                run_block(block, sink)?;
                Ok(Unit::Pixels)
            }
            Directive::Pause(pause) => Ok(Unit::Pause(pause)),
        }
    }

    fn position(&self) -> u64 {
        self.pos
    }
}
