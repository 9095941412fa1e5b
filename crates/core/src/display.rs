//! Logical interface to the colour display.

use core::fmt::Debug;

use rgb::RGB8;

use crate::{Error, Result, DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// A 16-bit colour with 5 bits of red, 6 bits of green and 5 bits of blue.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    pub const BLACK: Self = Self(0x0000);
    pub const WHITE: Self = Self(0xFFFF);

    /// Packs 8-bit channels, dropping the low bits of every channel.
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | ((b as u16 & 0xF8) >> 3))
    }

    /// Colour words are stored most significant byte first, the same order
    /// in which the display expects them on the bus.
    pub const fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }

    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

impl From<RGB8> for Rgb565 {
    fn from(rgb: RGB8) -> Self {
        Self::from_rgb(rgb.r, rgb.g, rgb.b)
    }
}

/// Rectangular region of the display filled by the subsequent pixel writes.
///
/// Both ends of each range are inclusive.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Window {
    pub x_start: u8,
    pub x_end: u8,
    pub y_start: u8,
    pub y_end: u8,
}

impl Window {
    /// Window covering the whole display.
    pub const FULL_SCREEN: Self = Self::new(0, DISPLAY_WIDTH - 1, 0, DISPLAY_HEIGHT - 1);

    pub const fn new(x_start: u8, x_end: u8, y_start: u8, y_end: u8) -> Self {
        Self {
            x_start,
            x_end,
            y_start,
            y_end,
        }
    }

    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        [self.x_start, self.x_end, self.y_start, self.y_end]
    }
}

/// Display bus abstraction used by the decoders.
///
/// Every call is synchronous: when it returns, the data has been handed to the
/// display and the next call is strictly ordered after it. Writes are only
/// valid between [`PixelSink::select`] and [`PixelSink::deselect`]; use
/// [`transaction`] to bracket them.
pub trait PixelSink {
    type Error: Debug;

    /// Starts a bus transaction.
    fn select(&mut self) -> core::result::Result<(), Self::Error>;
    /// Finishes the current bus transaction.
    fn deselect(&mut self) -> core::result::Result<(), Self::Error>;
    /// Redefines the active drawing rectangle.
    fn set_window(&mut self, window: Window) -> core::result::Result<(), Self::Error>;
    /// Sends a single colour to the current write position.
    fn write_color(&mut self, color: Rgb565) -> core::result::Result<(), Self::Error>;
}

impl<T: ?Sized + PixelSink> PixelSink for &mut T {
    type Error = T::Error;

    fn select(&mut self) -> core::result::Result<(), Self::Error> {
        T::select(self)
    }

    fn deselect(&mut self) -> core::result::Result<(), Self::Error> {
        T::deselect(self)
    }

    fn set_window(&mut self, window: Window) -> core::result::Result<(), Self::Error> {
        T::set_window(self, window)
    }

    fn write_color(&mut self, color: Rgb565) -> core::result::Result<(), Self::Error> {
        T::write_color(self, color)
    }
}

/// Runs `f` inside a single selected bus transaction.
///
/// The transaction is closed even if `f` fails; the error of `f` wins over a
/// deselect failure.
pub fn transaction<S, F, T>(sink: &mut S, f: F) -> Result<T>
where
    S: PixelSink + ?Sized,
    F: FnOnce(&mut S) -> Result<T>,
{
    sink.select().map_err(Error::display)?;
    let result = f(sink);
    let deselected = sink.deselect().map_err(Error::display);
    let value = result?;
    deselected?;
    Ok(value)
}

/// Resets the drawing window to the whole display in its own transaction.
pub fn reset_window<S: PixelSink + ?Sized>(sink: &mut S) -> Result<()> {
    transaction(sink, |sink| {
        sink.set_window(Window::FULL_SCREEN)
            .map_err(Error::display)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb565_packing() {
        assert_eq!(Rgb565::from_rgb(0xFF, 0xFF, 0xFF), Rgb565::WHITE);
        assert_eq!(Rgb565::from_rgb(0, 0, 0), Rgb565::BLACK);
        assert_eq!(Rgb565::from_rgb(0xFF, 0, 0), Rgb565(0xF800));
        assert_eq!(Rgb565::from_rgb(0, 0xFF, 0), Rgb565(0x07E0));
        assert_eq!(Rgb565::from_rgb(0, 0, 0xFF), Rgb565(0x001F));
        // Low bits are dropped.
        assert_eq!(Rgb565::from_rgb(0x07, 0x03, 0x07), Rgb565::BLACK);
        assert_eq!(Rgb565::from(RGB8::new(0x08, 0x04, 0x08)), Rgb565(0x0821));
    }

    #[test]
    fn test_full_screen_window() {
        assert_eq!(Window::FULL_SCREEN.to_bytes(), [0, 97, 0, 69]);
    }
}
