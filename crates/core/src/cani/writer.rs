//! Pixel block builder used by the encoders.

use heapless::Vec;

use super::{LENGTH_MASK, MAX_BLOCK_LEN, PAUSE_FLAG, PAUSE_TICK_MS};
use crate::{
    display::{Rgb565, Window},
    playback::Pause,
};

/// Maximum number of colour words in a single literal run.
pub const MAX_LITERAL_LEN: usize = 0x7F;
/// Maximum number of repetitions in a single repeat run.
pub const MAX_REPEAT_LEN: u8 = 0x3F;
/// Length of an encoded pixel directive with its switch byte.
pub const MAX_DIRECTIVE_LEN: usize = MAX_BLOCK_LEN + 1;

const REPEAT_TAG: u8 = 0x80;
const WINDOW_TAG: u8 = 0xC0;

/// The instruction does not fit into the remaining block space.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BlockFull;

/// Collects pixel instructions of a single pixel block.
#[derive(Clone, Debug, Default)]
pub struct BlockWriter {
    data: Vec<u8, MAX_BLOCK_LEN>,
}

impl BlockWriter {
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Returns the number of instruction bytes that still fit into the block.
    pub fn remaining(&self) -> usize {
        MAX_BLOCK_LEN - self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Appends as many colours from the slice as fit, returns how many were taken.
    pub fn push_literal(&mut self, colors: &[Rgb565]) -> usize {
        let available = self.remaining().saturating_sub(1) / 2;
        let count = colors.len().min(available).min(MAX_LITERAL_LEN);
        if count == 0 {
            return 0;
        }

        // The capacity has been checked above.
        self.data.push(count as u8).ok();
        for color in &colors[..count] {
            self.data.extend_from_slice(&color.to_be_bytes()).ok();
        }
        count
    }

    /// Appends a repeat run of up to [`MAX_REPEAT_LEN`] colours, returns how
    /// many of `count` were taken.
    pub fn push_repeat(&mut self, count: usize, color: Rgb565) -> Result<usize, BlockFull> {
        let taken = count.min(usize::from(MAX_REPEAT_LEN));
        if taken == 0 {
            return Ok(0);
        }

        let [hi, lo] = color.to_be_bytes();
        self.push_bytes(&[REPEAT_TAG | taken as u8, hi, lo])?;
        Ok(taken)
    }

    pub fn push_window(&mut self, window: Window) -> Result<(), BlockFull> {
        let [xs, xe, ys, ye] = window.to_bytes();
        self.push_bytes(&[WINDOW_TAG, xs, xe, ys, ye])
    }

    fn push_bytes(&mut self, bytes: &[u8]) -> Result<(), BlockFull> {
        if bytes.len() > self.remaining() {
            return Err(BlockFull);
        }
        self.data.extend_from_slice(bytes).map_err(|_| BlockFull)
    }

    /// Returns the complete directive: the switch byte followed by the
    /// instructions padded to an even length.
    pub fn finish(mut self) -> Vec<u8, MAX_DIRECTIVE_LEN> {
        if self.data.len() % 2 == 1 {
            // Zero-length literal run.
            self.data.push(0x00).ok();
        }

        let mut directive = Vec::new();
        directive.push((self.data.len() / 2) as u8).ok();
        directive.extend_from_slice(&self.data).ok();
        directive
    }
}

/// Encodes a pause directive, finite pauses are rounded to 10 ms ticks.
pub fn pause_directive(pause: Pause) -> u8 {
    match pause {
        Pause::Forever => PAUSE_FLAG,
        Pause::For(duration) => {
            let ticks = (duration.as_millis() as u64 + PAUSE_TICK_MS / 2) / PAUSE_TICK_MS;
            PAUSE_FLAG | ticks.clamp(1, u64::from(LENGTH_MASK)) as u8
        }
    }
}
