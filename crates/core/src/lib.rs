//! Decoding and playback core of the colour image viewer.
//!
//! Two file formats are streamed to a 98x70 colour display: the CANI animation
//! bytecode and uncompressed 24/32-bit BMP stacks. Storage, display and user
//! input are injected as collaborators, see [`storage::Volume`],
//! [`display::PixelSink`] and [`input::Input`].

#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub use errors::{Error, ErrorKind, Result};

pub mod bmp;
pub mod cani;
pub mod config;
pub mod display;
pub mod errors;
pub mod format;
pub mod input;
pub mod playback;
pub mod storage;
#[cfg(any(feature = "std", test))]
pub mod test_utils;

#[cfg(test)]
mod tests;

/// Display width in pixels.
pub const DISPLAY_WIDTH: u8 = 98;
/// Display height in pixels.
pub const DISPLAY_HEIGHT: u8 = 70;
