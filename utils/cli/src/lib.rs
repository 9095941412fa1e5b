//! Host side tools for the colour image viewer.

use std::path::Path;

pub use crate::{
    encoder::{encode, load_frames, Encoder, Frame, DEFAULT_PAUSE},
    inspect::{inspect, StreamStats},
};

pub mod encoder;
pub mod inspect;

/// Converts an image or a GIF animation into the CANI animation bytes.
///
/// The `pause` overrides the frame delays of the animation.
pub fn convert_image_to_cani(
    path: impl AsRef<Path>,
    pause: Option<std::time::Duration>,
) -> anyhow::Result<Vec<u8>> {
    let frames = load_frames(path.as_ref())?;
    log::debug!("Loaded {} frames from {:?}", frames.len(), path.as_ref());
    encode(&frames, pause)
}
