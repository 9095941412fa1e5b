//! Viewer configuration stored as a small text file.
//!
//! The first line holds the image file name, the second one the frame delay of
//! the bitmap viewer in milliseconds as ASCII digits.

use core::{fmt::Write, time::Duration};

use embedded_io::blocking::Read;
use heapless::{String, Vec};

use crate::{storage, Result};

/// Maximal length of the configured file name.
pub const MAX_FILE_NAME_LEN: usize = 23;
/// The file name, the delay digits and two line breaks.
pub const CONFIG_MAX_LEN: usize = MAX_FILE_NAME_LEN + 1 + 10 + 1;
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

/// Configuration file of the animation viewer.
pub const ANIMATION_CONFIG_FILE: &str = "COLORANI.CFG";
/// Configuration file of the bitmap viewer.
pub const BITMAP_CONFIG_FILE: &str = "BMPNICK.CFG";

pub type FileName = String<MAX_FILE_NAME_LEN>;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Config {
    /// Image file to show, `None` if the user has not chosen one yet.
    pub file_name: Option<FileName>,
    /// Delay between bitmap animation frames.
    pub frame_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file_name: None,
            frame_delay: DEFAULT_FRAME_DELAY,
        }
    }
}

fn is_line_break(byte: &u8) -> bool {
    matches!(byte, b'\n' | b'\r')
}

impl Config {
    /// Parses the configuration file contents.
    ///
    /// Never fails: malformed fields fall back to their defaults.
    pub fn parse(bytes: &[u8]) -> Self {
        let name_len = bytes
            .iter()
            .position(|b| is_line_break(b) || *b == 0)
            .unwrap_or(bytes.len());
        let (name, rest) = bytes.split_at(name_len);

        let file_name = core::str::from_utf8(name)
            .ok()
            .filter(|name| !name.is_empty())
            .and_then(|name| {
                let mut file_name = FileName::new();
                if file_name.push_str(name).is_err() {
                    log::warn!("Configured file name is longer than {MAX_FILE_NAME_LEN} bytes");
                    return None;
                }
                Some(file_name)
            });

        let digits = rest.iter().skip_while(|b| is_line_break(*b));
        let mut delay_ms = 0_u64;
        for digit in digits.take_while(|b| b.is_ascii_digit()) {
            delay_ms = delay_ms
                .saturating_mul(10)
                .saturating_add(u64::from(*digit - b'0'));
        }

        let mut config = Self {
            file_name,
            ..Self::default()
        };
        config.set_frame_delay(Duration::from_millis(delay_ms));
        config
    }

    /// Reads the configuration file, bytes past [`CONFIG_MAX_LEN`] are ignored.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buf = [0_u8; CONFIG_MAX_LEN];
        let len = storage::read_up_to(reader, &mut buf)?;
        Ok(Self::parse(&buf[..len]))
    }

    /// Sets the bitmap frame delay, zero resets it to the default one.
    pub fn set_frame_delay(&mut self, delay: Duration) {
        self.frame_delay = if delay.is_zero() {
            DEFAULT_FRAME_DELAY
        } else {
            delay
        };
    }

    /// Serializes the configuration, the frame delay line is written only on request.
    pub fn to_bytes(&self, with_frame_delay: bool) -> Vec<u8, CONFIG_MAX_LEN> {
        let mut text: String<CONFIG_MAX_LEN> = String::new();
        // Both parts are bounded, so the text always fits.
        if let Some(name) = &self.file_name {
            text.push_str(name).ok();
        }
        text.push('\n').ok();
        if with_frame_delay {
            let delay_ms = self.frame_delay.as_millis().min(u128::from(u32::MAX));
            writeln!(text, "{delay_ms}").ok();
        }
        text.into_bytes()
    }
}
