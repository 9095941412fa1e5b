//! Driver of the 98x70 colour LCD.
//!
//! The controller takes 9-bit SPI frames: the eighth bit tells data from
//! commands, the lower byte is the payload. The bus must already be
//! configured for 9-bit frames.

#![cfg_attr(not(test), no_std)]

use core::fmt::Debug;

use cani_core::display::{PixelSink, Rgb565, Window};
use embedded_hal::{digital::v2::OutputPin, spi::FullDuplex};

/// Sets the column range of the drawing window.
pub const COLUMN_ADDRESS_SET: u8 = 0x2A;
/// Sets the row range of the drawing window.
pub const ROW_ADDRESS_SET: u8 = 0x2B;
/// Starts writing pixels into the drawing window.
pub const MEMORY_WRITE: u8 = 0x2C;

const DATA_FLAG: u16 = 1 << 8;

/// Builds a command frame.
pub const fn command_frame(command: u8) -> u16 {
    command as u16
}

/// Builds a data frame.
pub const fn data_frame(data: u8) -> u16 {
    DATA_FLAG | data as u16
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LcdError<S, P> {
    Spi(S),
    Pin(P),
}

/// Colour LCD on an SPI bus with a dedicated chip select line.
pub struct Lcd<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI, CS> Lcd<SPI, CS>
where
    SPI: FullDuplex<u16>,
    CS: OutputPin,
{
    pub fn new(spi: SPI, cs: CS) -> Self {
        Self { spi, cs }
    }

    /// Returns the bus and the chip select pin.
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }

    fn send_frame(&mut self, frame: u16) -> Result<(), LcdError<SPI::Error, CS::Error>> {
        nb::block!(self.spi.send(frame)).map_err(LcdError::Spi)?;
        // Clear the receive FIFO.
        nb::block!(self.spi.read()).map_err(LcdError::Spi)?;
        Ok(())
    }

    fn send_command(
        &mut self,
        command: u8,
        args: &[u8],
    ) -> Result<(), LcdError<SPI::Error, CS::Error>> {
        self.send_frame(command_frame(command))?;
        for arg in args {
            self.send_frame(data_frame(*arg))?;
        }
        Ok(())
    }
}

impl<SPI, CS> PixelSink for Lcd<SPI, CS>
where
    SPI: FullDuplex<u16>,
    CS: OutputPin,
    SPI::Error: Debug,
    CS::Error: Debug,
{
    type Error = LcdError<SPI::Error, CS::Error>;

    fn select(&mut self) -> Result<(), Self::Error> {
        self.cs.set_low().map_err(LcdError::Pin)
    }

    fn deselect(&mut self) -> Result<(), Self::Error> {
        self.cs.set_high().map_err(LcdError::Pin)
    }

    fn set_window(&mut self, window: Window) -> Result<(), Self::Error> {
        log::trace!("Set window {window:?}");

        self.send_command(COLUMN_ADDRESS_SET, &[window.x_start, window.x_end])?;
        self.send_command(ROW_ADDRESS_SET, &[window.y_start, window.y_end])?;
        self.send_command(MEMORY_WRITE, &[])
    }

    fn write_color(&mut self, color: Rgb565) -> Result<(), Self::Error> {
        let [hi, lo] = color.to_be_bytes();
        self.send_frame(data_frame(hi))?;
        self.send_frame(data_frame(lo))
    }
}
