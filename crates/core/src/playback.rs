//! Playback controller shared by both image formats.

use core::time::Duration;

use crate::{
    display::PixelSink,
    input::{Input, Key},
    Error, Result,
};

/// How long a decoded picture stays on the screen.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pause {
    /// Wait until the user presses a key.
    Forever,
    /// Wait until the timeout expires or the user presses a key.
    For(Duration),
}

impl Pause {
    /// Blocks on the input according to the pause semantics.
    pub fn wait<I: Input + ?Sized>(self, input: &mut I) -> Option<Key> {
        match self {
            Pause::Forever => Some(input.wait()),
            Pause::For(timeout) => input.wait_timeout(timeout),
        }
    }
}

/// A single unit of decoder work.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Unit {
    /// A batch of pixels has been sent to the display.
    Pixels,
    /// A complete frame has been drawn and must be shown for the given pause.
    Frame(Pause),
    /// Nothing has been drawn, the stream asks for a pause.
    Pause(Pause),
    /// The stream is exhausted.
    End,
}

/// Common capability of the format specific decoders.
pub trait Decoder {
    /// Rewinds the stream to its first unit and resets the drawing window.
    fn restart<S: PixelSink>(&mut self, sink: &mut S) -> Result<()>;
    /// Decodes the next unit of work and renders it into the sink.
    fn next_unit<S: PixelSink>(&mut self, sink: &mut S) -> Result<Unit>;
    /// Returns the file offset of the next unit.
    fn position(&self) -> u64;
}

impl<T: ?Sized + Decoder> Decoder for &mut T {
    fn restart<S: PixelSink>(&mut self, sink: &mut S) -> Result<()> {
        T::restart(self, sink)
    }

    fn next_unit<S: PixelSink>(&mut self, sink: &mut S) -> Result<Unit> {
        T::next_unit(self, sink)
    }

    fn position(&self) -> u64 {
        T::position(self)
    }
}

/// Observable state of the current playback session.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct PlaybackState {
    /// Key that ended the most recent playback.
    pub last_key: Option<Key>,
    /// Outcome of the most recent playback.
    pub last_result: Option<core::result::Result<(), Error>>,
    /// Decoded units since the playback start.
    pub units: u32,
    /// Times the stream has been played to its end.
    pub passes: u32,
    /// File offset of the next unit to decode.
    pub position: u64,
    /// Frames shown in the current pass, that is the index of the next bitmap frame.
    pub frame: u32,
}

impl PlaybackState {
    // The counters saturate: a stream without pauses loops as fast as it decodes.
    fn count_unit(&mut self, unit: Unit) {
        self.units = self.units.saturating_add(1);
        if let Unit::Frame(_) = unit {
            self.frame = self.frame.saturating_add(1);
        }
    }

    fn count_pass(&mut self) {
        self.passes = self.passes.saturating_add(1);
        self.frame = 0;
    }
}

#[derive(Clone, Copy, Debug)]
enum State {
    Displaying,
    Polling,
    Paused(Pause),
    Restarting,
    Exiting(Key),
}

/// Drives a decoder until the user presses a key.
pub struct Player<S, I> {
    sink: S,
    input: I,
    state: PlaybackState,
}

impl<S, I> Player<S, I>
where
    S: PixelSink,
    I: Input,
{
    pub fn new(sink: S, input: I) -> Self {
        Self {
            sink,
            input,
            state: PlaybackState::default(),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn release(self) -> (S, I) {
        (self.sink, self.input)
    }

    /// Plays the stream in a loop and returns the key that stopped it.
    ///
    /// Decode errors stop the playback immediately.
    pub fn play<D: Decoder + ?Sized>(&mut self, decoder: &mut D) -> Result<Key> {
        self.play_from(decoder, PlaybackState::default())
    }

    /// Plays the stream, continuing the counters of the given state.
    pub fn play_from<D: Decoder + ?Sized>(
        &mut self,
        decoder: &mut D,
        state: PlaybackState,
    ) -> Result<Key> {
        self.state = state;

        let result = self.run(decoder);
        match result {
            Ok(key) => {
                self.state.last_key = Some(key);
                self.state.last_result = Some(Ok(()));
            }
            Err(err) => {
                log::warn!("Playback aborted after {} units: {err}", self.state.units);
                self.state.last_result = Some(Err(err));
            }
        }
        result
    }

    fn run<D: Decoder + ?Sized>(&mut self, decoder: &mut D) -> Result<Key> {
        decoder.restart(&mut self.sink)?;
        self.state.position = decoder.position();

        let mut state = State::Displaying;
        loop {
            state = match state {
                State::Displaying => {
                    let unit = decoder.next_unit(&mut self.sink)?;
                    self.state.count_unit(unit);
                    self.state.position = decoder.position();
                    log::trace!("Decoded unit {}: {unit:?}", self.state.units);

                    match unit {
                        Unit::Pixels => State::Polling,
                        Unit::Frame(pause) | Unit::Pause(pause) => State::Paused(pause),
                        Unit::End => State::Restarting,
                    }
                }

                State::Polling => self
                    .input
                    .poll()
                    .map_or(State::Displaying, State::Exiting),

                State::Paused(pause) => pause
                    .wait(&mut self.input)
                    .map_or(State::Displaying, State::Exiting),

                State::Restarting => {
                    self.state.count_pass();
                    if let Some(key) = self.input.poll() {
                        State::Exiting(key)
                    } else {
                        decoder.restart(&mut self.sink)?;
                        self.state.position = decoder.position();
                        State::Displaying
                    }
                }

                State::Exiting(key) => {
                    log::debug!("Playback stopped by {key:?}");
                    return Ok(key);
                }
            };
        }
    }
}
