//! Summary of an image file as the viewer sees it.

use std::{convert::Infallible, fmt, time::Duration};

use cani_core::{
    config::DEFAULT_FRAME_DELAY,
    display::{PixelSink, Rgb565, Window},
    format::{AnyDecoder, Format},
    playback::{Decoder, Pause, Unit},
};
use embedded_io::blocking::{Read, Seek};

/// Counts the display writes without drawing anything.
#[derive(Debug, Default)]
struct CountingSink {
    windows: usize,
    pixels: usize,
}

impl PixelSink for CountingSink {
    type Error = Infallible;

    fn select(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_window(&mut self, _window: Window) -> Result<(), Self::Error> {
        self.windows += 1;
        Ok(())
    }

    fn write_color(&mut self, _color: Rgb565) -> Result<(), Self::Error> {
        self.pixels += 1;
        Ok(())
    }
}

/// Playback statistics of a single pass over the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamStats {
    pub format: Format,
    /// Decoded pixel blocks, every bitmap frame counts as one block.
    pub pixel_blocks: usize,
    /// Pauses, including the ones after the bitmap frames.
    pub pauses: usize,
    /// Pauses that last until a key press.
    pub key_waits: usize,
    /// Total length of the timed pauses.
    pub pause_time: Duration,
    /// Window changes, including the one made on rewind.
    pub windows: usize,
    pub pixels: usize,
}

impl StreamStats {
    fn add_pause(&mut self, pause: Pause) {
        self.pauses += 1;
        match pause {
            Pause::Forever => self.key_waits += 1,
            Pause::For(duration) => self.pause_time += duration,
        }
    }
}

impl fmt::Display for StreamStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "format: {:?}", self.format)?;
        writeln!(f, "pixel blocks: {}", self.pixel_blocks)?;
        writeln!(f, "pixels: {}", self.pixels)?;
        writeln!(f, "windows: {}", self.windows)?;
        writeln!(f, "pauses: {} ({} until a key press)", self.pauses, self.key_waits)?;
        write!(f, "timed pauses: {} ms", self.pause_time.as_millis())
    }
}

/// Decodes the whole file once and collects its statistics.
///
/// Any header or stream error the viewer would report is returned as is.
pub fn inspect<R: Read + Seek>(file: R, name: &str) -> cani_core::Result<StreamStats> {
    let mut decoder = AnyDecoder::open(file, name, DEFAULT_FRAME_DELAY)?;
    let mut sink = CountingSink::default();
    let mut stats = StreamStats {
        format: decoder.format(),
        pixel_blocks: 0,
        pauses: 0,
        key_waits: 0,
        pause_time: Duration::ZERO,
        windows: 0,
        pixels: 0,
    };

    decoder.restart(&mut sink)?;
    loop {
        match decoder.next_unit(&mut sink)? {
            Unit::Pixels => stats.pixel_blocks += 1,
            Unit::Frame(pause) => {
                stats.pixel_blocks += 1;
                stats.add_pause(pause);
            }
            Unit::Pause(pause) => stats.add_pause(pause),
            Unit::End => break,
        }
    }

    stats.windows = sink.windows;
    stats.pixels = sink.pixels;
    Ok(stats)
}
