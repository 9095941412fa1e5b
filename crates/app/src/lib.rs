//! Colour image viewer application

#![cfg_attr(not(test), no_std)]

pub use cani_core;
use cani_core::{display::PixelSink, input::Input, storage::Volume};
pub use cani_core::{Error as ViewerError, Result as ViewerResult};

pub use crate::app::{App, SessionEnd, Viewer};

mod app;

/// Maximum number of text lines on a status screen.
pub const MAX_SCREEN_LINES: usize = 8;

/// Board-specific components
///
/// Including the file system volume, the colour display, the buttons and the text console.
pub trait Board {
    /// Type provides the file system with the images and the configuration files.
    type Volume: Volume;
    /// Type provides the pixel access to the display.
    type Display: PixelSink;
    /// Type provides the user buttons.
    type Input: Input;
    /// Type provides the text output on the display.
    type Screen: StatusScreen;
    /// Returns all board components.
    ///
    /// This method brings the component ownership to the caller and can be invoked only once.
    #[allow(clippy::type_complexity)]
    fn take_components(
        &mut self,
    ) -> Option<(Self::Volume, Self::Display, Self::Input, Self::Screen)>;
}

/// Text console used for the info and error screens.
pub trait StatusScreen {
    type Error: core::fmt::Debug;

    /// Clears the screen and shows the given lines from the top.
    fn show_lines(&mut self, lines: &[&str]) -> Result<(), Self::Error>;
}

impl<T: ?Sized + StatusScreen> StatusScreen for &mut T {
    type Error = T::Error;

    fn show_lines(&mut self, lines: &[&str]) -> Result<(), Self::Error> {
        T::show_lines(self, lines)
    }
}
