//! Uncompressed BMP stacks: a 98 pixels wide bitmap whose height is a multiple
//! of the display height, each 70 rows slice is a separate frame.

use core::time::Duration;

use embedded_io::blocking::{Read, Seek};

use crate::{
    display::{self, transaction, PixelSink, Rgb565},
    playback::{Decoder, Pause, Unit},
    storage, Error, Result, DISPLAY_HEIGHT, DISPLAY_WIDTH,
};

/// Length of the header part that is checked.
pub const HEADER_LEN: usize = 54;
/// The longest scanline: 32 bits per pixel without padding.
pub const MAX_ROW_LEN: usize = DISPLAY_WIDTH as usize * 4;

const SIGNATURE: [u8; 2] = *b"BM";

/// Supported pixel layouts.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BitsPerPixel {
    /// Blue, green, red.
    Bgr24,
    /// Blue, green, red, alpha.
    Bgra32,
}

impl BitsPerPixel {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            BitsPerPixel::Bgr24 => 3,
            BitsPerPixel::Bgra32 => 4,
        }
    }

    /// Returns the stored scanline length, rows are padded to four bytes.
    pub const fn row_len(self) -> usize {
        let len = DISPLAY_WIDTH as usize * self.bytes_per_pixel();
        (len + 3) & !3
    }
}

/// Validated BMP header.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Header {
    pub bits_per_pixel: BitsPerPixel,
    /// Number of display-sized frames stacked in the bitmap.
    pub frames: u32,
    /// Offset of the first scanline from the file start.
    pub data_offset: u32,
}

fn u16_at(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn i32_at(bytes: &[u8], offset: usize) -> i32 {
    u32_at(bytes, offset) as i32
}

impl Header {
    /// Checks the signature, the encoding, then the geometry and the pixel depth.
    pub fn parse(bytes: &[u8; HEADER_LEN]) -> Result<Self> {
        if bytes[0..2] != SIGNATURE {
            return Err(Error::UnsupportedFormat);
        }
        if u16_at(bytes, 0x1A) != 1 {
            return Err(Error::PlanesMismatch);
        }
        if u32_at(bytes, 0x1E) != 0 {
            return Err(Error::Compressed);
        }
        if u32_at(bytes, 0x2E) != 0 {
            return Err(Error::Palette);
        }

        if i32_at(bytes, 0x12) != i32::from(DISPLAY_WIDTH) {
            return Err(Error::WidthMismatch);
        }
        // Top-down bitmaps have a negative height and are not supported.
        let height = i32_at(bytes, 0x16);
        let frame_height = i32::from(DISPLAY_HEIGHT);
        if height <= 0 || height % frame_height != 0 {
            return Err(Error::StackHeightMismatch);
        }

        let bits_per_pixel = match u16_at(bytes, 0x1C) {
            24 => BitsPerPixel::Bgr24,
            32 => BitsPerPixel::Bgra32,
            _ => return Err(Error::UnsupportedBitDepth),
        };

        Ok(Self {
            bits_per_pixel,
            frames: (height / frame_height) as u32,
            data_offset: u32_at(bytes, 0x0A).max(HEADER_LEN as u32),
        })
    }

    /// Reads and validates the header at the current reader position.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = [0_u8; HEADER_LEN];
        storage::read_exact(reader, &mut bytes)?;
        Self::parse(&bytes)
    }
}

/// Streaming decoder of a BMP stack, one frame per unit.
///
/// The panel scans in the opposite direction to the bitmap storage order, so the
/// bottom-up rows are sent as stored and the pixels of every row are sent from
/// right to left, which yields an upright picture.
pub struct BmpDecoder<R> {
    file: R,
    header: Header,
    frame_delay: Duration,
    frame: u32,
    row: [u8; MAX_ROW_LEN],
}

impl<R> BmpDecoder<R>
where
    R: Read + Seek,
{
    /// Validates the header at the start of the file.
    pub fn open(mut file: R, frame_delay: Duration) -> Result<Self> {
        storage::seek_to(&mut file, 0)?;
        let header = Header::read_from(&mut file)?;
        log::debug!(
            "Opened {:?} bitmap with {} frames",
            header.bits_per_pixel,
            header.frames
        );

        Ok(Self {
            file,
            header,
            frame_delay,
            frame: 0,
            row: [0_u8; MAX_ROW_LEN],
        })
    }

    pub fn header(&self) -> Header {
        self.header
    }

    /// Index of the next frame to be drawn.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn into_inner(self) -> R {
        self.file
    }

    /// A still picture stays until a key press, an animation advances after the frame delay.
    fn frame_pause(&self) -> Pause {
        if self.header.frames == 1 {
            Pause::Forever
        } else {
            Pause::For(self.frame_delay)
        }
    }

    fn draw_row<S: PixelSink>(&mut self, sink: &mut S) -> Result<()> {
        let bits_per_pixel = self.header.bits_per_pixel;
        let row = &mut self.row[..bits_per_pixel.row_len()];
        storage::read_exact(&mut self.file, row)?;

        let pixels = &row[..DISPLAY_WIDTH as usize * bits_per_pixel.bytes_per_pixel()];
        transaction(sink, |sink| {
            for pixel in pixels.chunks_exact(bits_per_pixel.bytes_per_pixel()).rev() {
                let color = Rgb565::from_rgb(pixel[2], pixel[1], pixel[0]);
                sink.write_color(color).map_err(Error::display)?;
            }
            Ok(())
        })
    }
}

impl<R> Decoder for BmpDecoder<R>
where
    R: Read + Seek,
{
    fn restart<S: PixelSink>(&mut self, sink: &mut S) -> Result<()> {
        storage::seek_to(&mut self.file, self.header.data_offset.into())?;
        self.frame = 0;
        display::reset_window(sink)
    }

    fn next_unit<S: PixelSink>(&mut self, sink: &mut S) -> Result<Unit> {
        if self.frame == self.header.frames {
            return Ok(Unit::End);
        }

        for _ in 0..DISPLAY_HEIGHT {
            self.draw_row(sink)?;
        }
        self.frame += 1;
        Ok(Unit::Frame(self.frame_pause()))
    }

    fn position(&self) -> u64 {
        let frame_len = (self.header.bits_per_pixel.row_len() * DISPLAY_HEIGHT as usize) as u64;
        u64::from(self.header.data_offset) + u64::from(self.frame) * frame_len
    }
}
