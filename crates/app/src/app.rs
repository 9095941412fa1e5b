//! Viewer session business-logic implementation

use core::time::Duration;

use cani_core::{
    config::{Config, FileName, ANIMATION_CONFIG_FILE, BITMAP_CONFIG_FILE},
    format::AnyDecoder,
    input::{Input, Key},
    playback::{PlaybackState, Player},
    storage::Volume,
};
use heapless::Vec;

use crate::{Board, StatusScreen, ViewerError, ViewerResult, MAX_SCREEN_LINES};

/// Flavour of the viewer, each one keeps its own configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    /// CANI animation viewer.
    Animation,
    /// BMP stack viewer with the adjustable frame delay.
    Bitmap,
}

impl Viewer {
    pub const fn config_file(self) -> &'static str {
        match self {
            Viewer::Animation => ANIMATION_CONFIG_FILE,
            Viewer::Bitmap => BITMAP_CONFIG_FILE,
        }
    }

    /// Only the bitmap viewer stores the frame delay.
    const fn stores_frame_delay(self) -> bool {
        matches!(self, Viewer::Bitmap)
    }

    /// Lines shown when no file has been chosen yet.
    pub const fn info_lines(self) -> &'static [&'static str] {
        match self {
            Viewer::Animation => &["COLOR ANIMATION", "VIEWER", "", "No file", "selected"],
            Viewer::Bitmap => &["COLOR BITMAP", "NICK ANIMATION", "", "No file", "selected"],
        }
    }
}

/// Outcome of a single viewing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEnd {
    /// Key that ended the session, the caller dispatches it further.
    pub key: Key,
    /// Failure reported to the user during the session.
    pub error: Option<ViewerError>,
}

/// Image viewer application runner.
pub struct App<B: Board> {
    viewer: Viewer,
    volume: B::Volume,
    player: Player<B::Display, B::Input>,
    screen: B::Screen,
    config: Config,
}

impl<B: Board> App<B> {
    /// Creates a new application instance and loads its configuration.
    pub fn new(mut board: B, viewer: Viewer) -> Self {
        let (mut volume, display, input, screen) = board
            .take_components()
            .expect("Board components has been already taken");

        let config = read_config(&mut volume, viewer.config_file());
        log::info!("Starting {viewer:?} viewer with {config:?}");

        Self {
            viewer,
            volume,
            player: Player::new(display, input),
            screen,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the state of the most recent playback.
    pub fn playback_state(&self) -> &PlaybackState {
        self.player.state()
    }

    /// Runs a single viewing session and returns the key that ended it.
    ///
    /// Load and decode failures are shown to the user and acknowledged with
    /// a key press before returning.
    pub fn run(&mut self) -> SessionEnd {
        let Some(file_name) = self.config.file_name.clone() else {
            self.show(self.viewer.info_lines());
            let key = self.player.input_mut().wait();
            return SessionEnd { key, error: None };
        };

        match self.play_file(&file_name) {
            Ok(key) => SessionEnd { key, error: None },
            Err(err) => {
                log::warn!("Unable to show {file_name}: {err}");
                self.show_error(&file_name, err);
                let key = self.player.input_mut().wait();
                SessionEnd {
                    key,
                    error: Some(err),
                }
            }
        }
    }

    /// Chooses the file to show and stores the configuration.
    pub fn select_file(&mut self, file_name: FileName) -> ViewerResult<()> {
        self.config.file_name = Some(file_name);
        self.store_config()
    }

    /// Sets the bitmap frame delay and stores the configuration, zero means the default delay.
    pub fn set_frame_delay(&mut self, delay: Duration) -> ViewerResult<()> {
        self.config.set_frame_delay(delay);
        self.store_config()
    }

    /// Returns the board components back.
    #[allow(clippy::type_complexity)]
    pub fn into_components(self) -> (B::Volume, B::Display, B::Input, B::Screen) {
        let (display, input) = self.player.release();
        (self.volume, display, input, self.screen)
    }

    fn play_file(&mut self, file_name: &str) -> ViewerResult<Key> {
        let file = self.volume.open(file_name).map_err(|err| {
            log::warn!("Unable to open {file_name}: {err:?}");
            ViewerError::FileNotFound
        })?;

        let mut decoder = AnyDecoder::open(file, file_name, self.config.frame_delay)?;
        self.player.play(&mut decoder)
    }

    fn store_config(&mut self) -> ViewerResult<()> {
        let bytes = self.config.to_bytes(self.viewer.stores_frame_delay());
        self.volume
            .write(self.viewer.config_file(), &bytes)
            .map_err(ViewerError::storage_write)
    }

    fn show_error(&mut self, file_name: &str, err: ViewerError) {
        let lines: Vec<&str, MAX_SCREEN_LINES> = [
            "Error while",
            "loading:",
            file_name,
            "",
            err.short_message(),
            "Press any",
            "        key...",
        ]
        .into_iter()
        .collect();
        self.show(&lines);
    }

    fn show(&mut self, lines: &[&str]) {
        // The text screen is informational, a failure does not stop the session.
        if let Err(err) = self.screen.show_lines(lines) {
            log::error!("Unable to show a status screen: {err:?}");
        }
    }
}

/// Reads the viewer configuration, any failure means there is no configuration.
fn read_config<V: Volume>(volume: &mut V, name: &str) -> Config {
    let mut file = match volume.open(name) {
        Ok(file) => file,
        Err(err) => {
            log::info!("No configuration in {name}: {err:?}");
            return Config::default();
        }
    };

    Config::read_from(&mut file).unwrap_or_else(|err| {
        log::warn!("Unable to read {name}: {err}");
        Config::default()
    })
}
