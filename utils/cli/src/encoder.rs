//! CANI animation encoder.
//!
//! Every frame is sent as the difference to the pixels already on the screen:
//! unchanged rows are skipped, a window directive moves the write position to
//! the next changed span and equal neighbours are packed into repeat runs.

use std::{fs::File, io::BufReader, mem, path::Path, time::Duration};

use anyhow::ensure;
use cani_core::{
    cani::{pause_directive, BlockFull, BlockWriter, Header},
    display::{Rgb565, Window},
    playback::Pause,
    DISPLAY_HEIGHT, DISPLAY_WIDTH,
};
use image::{codecs::gif::GifDecoder, imageops, AnimationDecoder, DynamicImage, ImageFormat, RgbImage};

/// Pause after every frame of an animation without its own frame delays.
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(60);

/// Unchanged runs up to this length are sent again, skipping them costs more.
const TRIVIAL_CUTOFF: usize = 5;

const WIDTH: usize = DISPLAY_WIDTH as usize;
const HEIGHT: usize = DISPLAY_HEIGHT as usize;

/// A single source picture.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
    /// Frame delay stored in the source file.
    pub delay: Option<Duration>,
}

/// Display write position inside the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    window: Window,
    x: u8,
    y: u8,
}

impl Cursor {
    const fn new(window: Window) -> Self {
        Self {
            window,
            x: window.x_start,
            y: window.y_start,
        }
    }

    /// Moves to the next pixel, `None` once the window has been filled.
    fn advance(self) -> Option<Self> {
        if self.x < self.window.x_end {
            Some(Self {
                x: self.x + 1,
                ..self
            })
        } else if self.y < self.window.y_end {
            Some(Self {
                x: self.window.x_start,
                y: self.y + 1,
                ..self
            })
        } else {
            None
        }
    }

    fn is_at_span(&self, x_start: usize, x_end: usize, y: usize) -> bool {
        usize::from(self.x) == x_start
            && usize::from(self.y) == y
            && usize::from(self.window.x_end) >= x_end
    }
}

#[derive(Debug)]
enum Op {
    Window(Window),
    Colors(Vec<Rgb565>),
}

/// Stateful encoder of the animation frames.
#[derive(Debug)]
pub struct Encoder {
    screen: Vec<Option<Rgb565>>,
    /// The decoder starts every pass with the full screen window.
    cursor: Option<Cursor>,
    block: BlockWriter,
    output: Vec<u8>,
    frames: usize,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self {
            screen: vec![None; WIDTH * HEIGHT],
            cursor: Some(Cursor::new(Window::FULL_SCREEN)),
            block: BlockWriter::new(),
            output: Header::DISPLAY.to_bytes().to_vec(),
            frames: 0,
        }
    }

    /// Appends the frame followed by the pause directive.
    ///
    /// The frame must have the display size, it is rotated by 180 degrees to
    /// match the panel scan direction.
    pub fn push_frame(&mut self, image: &RgbImage, pause: Pause) -> anyhow::Result<()> {
        ensure!(
            image.dimensions() == (WIDTH as u32, HEIGHT as u32),
            "Frame {} has {}x{} size instead of {WIDTH}x{HEIGHT}",
            self.frames,
            image.width(),
            image.height()
        );

        let image = imageops::rotate180(image);
        let ops = self.diff_frame(&image);
        for op in ops {
            match op {
                Op::Window(window) => self.push_instruction(|block| block.push_window(window)),
                Op::Colors(colors) => self.push_colors(&colors),
            }
        }
        self.flush_block();
        self.output.push(pause_directive(pause));

        self.frames += 1;
        log::trace!("Encoded frame {}, {} bytes total", self.frames, self.output.len());
        Ok(())
    }

    /// Returns the number of the encoded frames.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Returns the file length so far, the header included.
    pub fn encoded_len(&self) -> usize {
        self.output.len()
    }

    /// Returns the complete file contents.
    pub fn finish(mut self) -> Vec<u8> {
        self.flush_block();
        self.output
    }

    fn diff_frame(&mut self, image: &RgbImage) -> Vec<Op> {
        let mut ops = Vec::new();
        for y in 0..HEIGHT {
            let row = (0..WIDTH)
                .map(|x| {
                    let [r, g, b] = image.get_pixel(x as u32, y as u32).0;
                    Rgb565::from_rgb(r, g, b)
                })
                .collect::<Vec<_>>();
            let changed = row
                .iter()
                .enumerate()
                .map(|(x, color)| self.screen[y * WIDTH + x] != Some(*color))
                .collect::<Vec<_>>();

            for (x_start, x_end) in changed_spans(&changed) {
                if !self
                    .cursor
                    .map_or(false, |cursor| cursor.is_at_span(x_start, x_end, y))
                {
                    let window = Window::new(x_start as u8, x_end as u8, y as u8, DISPLAY_HEIGHT - 1);
                    ops.push(Op::Window(window));
                    self.cursor = Some(Cursor::new(window));
                }

                let span = &row[x_start..=x_end];
                match ops.last_mut() {
                    Some(Op::Colors(colors)) => colors.extend_from_slice(span),
                    _ => ops.push(Op::Colors(span.to_vec())),
                }
                for (x, color) in (x_start..=x_end).zip(span) {
                    self.screen[y * WIDTH + x] = Some(*color);
                    self.cursor = self.cursor.and_then(Cursor::advance);
                }
            }
        }
        ops
    }

    /// Packs two and more equal neighbours into repeat runs, the rest into literal runs.
    fn push_colors(&mut self, colors: &[Rgb565]) {
        let mut literal_start = 0;
        let mut pos = 0;
        while pos < colors.len() {
            let color = colors[pos];
            let run = colors[pos..].iter().take_while(|c| **c == color).count();
            if run < 2 {
                pos += 1;
                continue;
            }

            self.push_literal(&colors[literal_start..pos]);
            let mut remaining = run;
            while remaining > 0 {
                match self.block.push_repeat(remaining, color) {
                    Ok(taken) => remaining -= taken,
                    Err(BlockFull) => self.flush_block(),
                }
            }
            pos += run;
            literal_start = pos;
        }
        self.push_literal(&colors[literal_start..]);
    }

    fn push_literal(&mut self, mut colors: &[Rgb565]) {
        while !colors.is_empty() {
            let taken = self.block.push_literal(colors);
            if taken == 0 {
                self.flush_block();
            }
            colors = &colors[taken..];
        }
    }

    fn push_instruction(&mut self, push: impl Fn(&mut BlockWriter) -> Result<(), BlockFull>) {
        if push(&mut self.block).is_err() {
            self.flush_block();
            push(&mut self.block).expect("An empty block fits any single instruction");
        }
    }

    fn flush_block(&mut self) {
        if !self.block.is_empty() {
            let block = mem::take(&mut self.block);
            self.output.extend_from_slice(&block.finish());
        }
    }
}

/// Splits a row into spans to be sent, short unchanged gaps after a changed
/// span are merged into it.
fn changed_spans(changed: &[bool]) -> Vec<(usize, usize)> {
    // Runs of the equal flags: (changed, start, end).
    let mut runs: Vec<(bool, usize, usize)> = Vec::new();
    let mut pos = 0;
    while pos < changed.len() {
        let flag = changed[pos];
        let len = changed[pos..].iter().take_while(|f| **f == flag).count();
        let (start, end) = (pos, pos + len - 1);
        pos += len;

        match runs.last_mut() {
            Some(last) if last.0 && (flag || len <= TRIVIAL_CUTOFF) => last.2 = end,
            _ => runs.push((flag, start, end)),
        }
    }

    runs.into_iter()
        .filter(|run| run.0)
        .map(|(_, start, end)| (start, end))
        .collect()
}

/// Encodes the frames into a CANI animation.
///
/// A single frame is shown until a key press. Otherwise every frame is
/// followed by the given pause, the frame own delay or [`DEFAULT_PAUSE`].
pub fn encode(frames: &[Frame], pause: Option<Duration>) -> anyhow::Result<Vec<u8>> {
    ensure!(!frames.is_empty(), "There are no frames to encode");

    let mut encoder = Encoder::new();
    for frame in frames {
        let pause = if frames.len() == 1 {
            Pause::Forever
        } else {
            Pause::For(pause.or(frame.delay).unwrap_or(DEFAULT_PAUSE))
        };
        encoder.push_frame(&frame.image, pause)?;
    }
    Ok(encoder.finish())
}

/// Loads all the frames of a GIF animation or a single still image.
pub fn load_frames(path: &Path) -> anyhow::Result<Vec<Frame>> {
    if ImageFormat::from_path(path).ok() == Some(ImageFormat::Gif) {
        let decoder = GifDecoder::new(BufReader::new(File::open(path)?))?;
        let frames = decoder
            .into_frames()
            .collect_frames()?
            .into_iter()
            .map(|frame| {
                let delay = Duration::from(frame.delay());
                Frame {
                    delay: (!delay.is_zero()).then_some(delay),
                    image: DynamicImage::ImageRgba8(frame.into_buffer()).to_rgb8(),
                }
            })
            .collect();
        return Ok(frames);
    }

    let image = image::io::Reader::open(path)?.decode()?.to_rgb8();
    Ok(vec![Frame { image, delay: None }])
}

#[cfg(test)]
mod tests {
    use super::changed_spans;

    fn mask(s: &str) -> Vec<bool> {
        s.chars().map(|c| c == '#').collect()
    }

    #[test]
    fn test_changed_spans() {
        assert_eq!(changed_spans(&mask("......")), vec![]);
        assert_eq!(changed_spans(&mask("##....")), vec![(0, 5)]);
        assert_eq!(changed_spans(&mask("##......##")), vec![(0, 1), (8, 9)]);
        assert_eq!(changed_spans(&mask("##.....##")), vec![(0, 8)]);
        // Leading unchanged pixels are always skipped.
        assert_eq!(changed_spans(&mask("..##")), vec![(2, 3)]);
    }
}
