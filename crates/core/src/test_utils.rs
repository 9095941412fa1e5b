//! Test helpers

use std::{collections::VecDeque, convert::Infallible, time::Duration, vec::Vec};

use embedded_io::{
    blocking::{Read, Seek},
    Io, SeekFrom,
};

use crate::{
    display::{PixelSink, Rgb565, Window},
    input::{Input, Key},
};

/// A single observed pixel sink call.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SinkEvent {
    Select,
    Deselect,
    Window(Window),
    Color(Rgb565),
}

/// The display bus was used outside of a transaction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BusMisuse {
    NestedSelect,
    DeselectWithoutSelect,
    WriteWithoutSelect,
}

/// Pixel sink that records every call.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
    selected: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all the written colours in the order of writing.
    pub fn colors(&self) -> Vec<Rgb565> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Color(color) => Some(*color),
                _ => None,
            })
            .collect()
    }

    pub fn windows(&self) -> Vec<Window> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Window(window) => Some(*window),
                _ => None,
            })
            .collect()
    }

    /// Returns the number of completed transactions.
    pub fn transactions(&self) -> usize {
        self.events
            .iter()
            .filter(|event| **event == SinkEvent::Deselect)
            .count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl PixelSink for RecordingSink {
    type Error = BusMisuse;

    fn select(&mut self) -> Result<(), Self::Error> {
        if self.selected {
            return Err(BusMisuse::NestedSelect);
        }
        self.selected = true;
        self.events.push(SinkEvent::Select);
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), Self::Error> {
        if !self.selected {
            return Err(BusMisuse::DeselectWithoutSelect);
        }
        self.selected = false;
        self.events.push(SinkEvent::Deselect);
        Ok(())
    }

    fn set_window(&mut self, window: Window) -> Result<(), Self::Error> {
        if !self.selected {
            return Err(BusMisuse::WriteWithoutSelect);
        }
        self.events.push(SinkEvent::Window(window));
        Ok(())
    }

    fn write_color(&mut self, color: Rgb565) -> Result<(), Self::Error> {
        if !self.selected {
            return Err(BusMisuse::WriteWithoutSelect);
        }
        self.events.push(SinkEvent::Color(color));
        Ok(())
    }
}

/// A request made to the input.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputRequest {
    Poll,
    Wait,
    WaitTimeout(Duration),
}

/// Input that answers requests from a prepared script.
///
/// When the script runs out, polls and timed waits see no key and an
/// indefinite wait gets the fallback key.
#[derive(Debug)]
pub struct ScriptedInput {
    script: VecDeque<Option<Key>>,
    fallback: Key,
    pub requests: Vec<InputRequest>,
}

impl ScriptedInput {
    pub fn new(script: impl IntoIterator<Item = Option<Key>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback: Key::Left,
            requests: Vec::new(),
        }
    }

    /// Answers "no key" to the first `requests` requests, then presses the key.
    pub fn key_after(requests: usize, key: Key) -> Self {
        Self::new(std::iter::repeat(None).take(requests).chain([Some(key)]))
    }

    /// Never presses a key on its own.
    pub fn idle() -> Self {
        Self::new([])
    }

    fn next_answer(&mut self) -> Option<Key> {
        self.script.pop_front().flatten()
    }
}

impl Input for ScriptedInput {
    fn poll(&mut self) -> Option<Key> {
        self.requests.push(InputRequest::Poll);
        self.next_answer()
    }

    fn wait(&mut self) -> Key {
        self.requests.push(InputRequest::Wait);
        while let Some(answer) = self.script.pop_front() {
            if let Some(key) = answer {
                return key;
            }
        }
        self.fallback
    }

    fn wait_timeout(&mut self, timeout: Duration) -> Option<Key> {
        self.requests.push(InputRequest::WaitTimeout(timeout));
        self.next_answer()
    }
}

/// In-memory file.
#[derive(Clone, Debug, Default)]
pub struct MemoryFile {
    bytes: Vec<u8>,
    pos: usize,
}

impl MemoryFile {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            pos: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }
}

impl Io for MemoryFile {
    type Error = Infallible;
}

impl Read for MemoryFile {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let remaining = &self.bytes[self.pos.min(self.bytes.len())..];
        let len = remaining.len().min(buf.len());
        buf[..len].copy_from_slice(&remaining[..len]);
        self.pos += len;
        Ok(len)
    }
}

impl Seek for MemoryFile {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, Self::Error> {
        self.pos = match pos {
            SeekFrom::Start(pos) => pos as usize,
            SeekFrom::Current(offset) => (self.pos as i64 + offset) as usize,
            SeekFrom::End(offset) => (self.bytes.len() as i64 + offset) as usize,
        };
        Ok(self.pos as u64)
    }
}

/// Builds a CANI file with the display geometry.
pub fn cani_file(directives: &[&[u8]]) -> Vec<u8> {
    let mut bytes = crate::cani::Header::DISPLAY.to_bytes().to_vec();
    for directive in directives {
        bytes.extend_from_slice(directive);
    }
    bytes
}

/// Builds a BMP header with the given geometry and depth.
pub fn bmp_header(width: i32, height: i32, bits_per_pixel: u16) -> [u8; crate::bmp::HEADER_LEN] {
    let mut header = [0_u8; crate::bmp::HEADER_LEN];
    header[0..2].copy_from_slice(b"BM");
    header[0x0A..0x0E].copy_from_slice(&(crate::bmp::HEADER_LEN as u32).to_le_bytes());
    header[0x0E..0x12].copy_from_slice(&40_u32.to_le_bytes());
    header[0x12..0x16].copy_from_slice(&width.to_le_bytes());
    header[0x16..0x1A].copy_from_slice(&height.to_le_bytes());
    header[0x1A..0x1C].copy_from_slice(&1_u16.to_le_bytes());
    header[0x1C..0x1E].copy_from_slice(&bits_per_pixel.to_le_bytes());
    header
}

/// Builds a BMP stack, `pixel(frame, row, column)` returns the RGB colour of the
/// pixel counted from the top left corner of the frame.
///
/// Frames are numbered in the playback order, that is from the bottom of the picture.
pub fn bmp_file(
    frames: u8,
    bits_per_pixel: u16,
    mut pixel: impl FnMut(u8, u8, u8) -> [u8; 3],
) -> Vec<u8> {
    use crate::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

    let height = i32::from(frames) * i32::from(DISPLAY_HEIGHT);
    let mut bytes = bmp_header(i32::from(DISPLAY_WIDTH), height, bits_per_pixel).to_vec();
    // Bitmaps store the bottom row first.
    for frame in 0..frames {
        for row in (0..DISPLAY_HEIGHT).rev() {
            let row_start = bytes.len();
            for column in 0..DISPLAY_WIDTH {
                let [r, g, b] = pixel(frame, row, column);
                bytes.extend_from_slice(&[b, g, r]);
                if bits_per_pixel == 32 {
                    bytes.push(0xFF);
                }
            }
            while (bytes.len() - row_start) % 4 != 0 {
                bytes.push(0);
            }
        }
    }
    bytes
}
