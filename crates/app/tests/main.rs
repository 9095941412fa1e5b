use std::{convert::Infallible, time::Duration};

use cani_app::{
    cani_core::{
        cani::BlockWriter,
        config::{FileName, ANIMATION_CONFIG_FILE, BITMAP_CONFIG_FILE},
        display::Rgb565,
        input::Key,
        test_utils::{bmp_file, cani_file, InputRequest, RecordingSink, ScriptedInput},
    },
    App, Board, SessionEnd, StatusScreen, Viewer, ViewerError,
};
use cani_storage::test_utils::MemoryVolume;

/// Text console that remembers every shown screen.
#[derive(Debug, Default)]
struct ScreenStub {
    screens: Vec<Vec<String>>,
}

impl StatusScreen for ScreenStub {
    type Error = Infallible;

    fn show_lines(&mut self, lines: &[&str]) -> Result<(), Self::Error> {
        self.screens
            .push(lines.iter().map(|line| (*line).to_owned()).collect());
        Ok(())
    }
}

struct BoardStub {
    components: Option<(MemoryVolume, RecordingSink, ScriptedInput, ScreenStub)>,
}

impl BoardStub {
    fn new(volume: MemoryVolume, input: ScriptedInput) -> Self {
        Self {
            components: Some((volume, RecordingSink::new(), input, ScreenStub::default())),
        }
    }
}

impl Board for BoardStub {
    type Volume = MemoryVolume;
    type Display = RecordingSink;
    type Input = ScriptedInput;
    type Screen = ScreenStub;

    fn take_components(
        &mut self,
    ) -> Option<(Self::Volume, Self::Display, Self::Input, Self::Screen)> {
        self.components.take()
    }
}

fn white_animation() -> Vec<u8> {
    let mut writer = BlockWriter::new();
    writer.push_repeat(10, Rgb565::WHITE).unwrap();
    cani_file(&[&writer.finish(), &[0x80]])
}

#[test]
fn test_info_screen_without_config() {
    let _ = env_logger::try_init();

    let board = BoardStub::new(MemoryVolume::new(), ScriptedInput::key_after(0, Key::Enter));
    let mut app = App::new(board, Viewer::Bitmap);
    assert_eq!(app.config().file_name, None);

    let end = app.run();
    assert_eq!(
        end,
        SessionEnd {
            key: Key::Enter,
            error: None
        }
    );

    let (_, display, input, screen) = app.into_components();
    assert!(display.events.is_empty());
    assert_eq!(input.requests, vec![InputRequest::Wait]);
    assert_eq!(screen.screens.len(), 1);
    assert_eq!(screen.screens[0][0], "COLOR BITMAP");
}

#[test]
fn test_animation_session() {
    let volume = MemoryVolume::new()
        .with_file(ANIMATION_CONFIG_FILE, b"NYAN.PCA\n".to_vec())
        .with_file("NYAN.PCA", white_animation());
    let board = BoardStub::new(volume, ScriptedInput::key_after(1, Key::Right));

    let mut app = App::new(board, Viewer::Animation);
    let end = app.run();
    assert_eq!(end.key, Key::Right);
    assert_eq!(end.error, None);
    assert_eq!(app.playback_state().last_key, Some(Key::Right));

    let (_, display, input, screen) = app.into_components();
    assert_eq!(display.colors(), vec![Rgb565::WHITE; 10]);
    assert_eq!(input.requests, vec![InputRequest::Poll, InputRequest::Wait]);
    assert!(screen.screens.is_empty());
}

#[test]
fn test_bitmap_session_uses_configured_delay() {
    let volume = MemoryVolume::new()
        .with_file(BITMAP_CONFIG_FILE, b"CAT.BMP\r\n250\r\n".to_vec())
        .with_file("CAT.BMP", bmp_file(2, 24, |_, _, _| [1, 2, 3]));
    let board = BoardStub::new(volume, ScriptedInput::key_after(1, Key::Up));

    let mut app = App::new(board, Viewer::Bitmap);
    assert_eq!(app.config().frame_delay, Duration::from_millis(250));
    assert_eq!(app.run().key, Key::Up);

    let (_, _, input, _) = app.into_components();
    assert_eq!(
        input.requests,
        vec![
            InputRequest::WaitTimeout(Duration::from_millis(250)),
            InputRequest::WaitTimeout(Duration::from_millis(250)),
        ]
    );
}

#[test]
fn test_missing_file_error_screen() {
    let volume = MemoryVolume::new().with_file(ANIMATION_CONFIG_FILE, b"GONE.PCA\n".to_vec());
    let board = BoardStub::new(volume, ScriptedInput::key_after(0, Key::Left));

    let mut app = App::new(board, Viewer::Animation);
    let end = app.run();
    assert_eq!(end.key, Key::Left);
    assert_eq!(end.error, Some(ViewerError::FileNotFound));

    let (_, display, _, screen) = app.into_components();
    assert!(display.events.is_empty());
    assert_eq!(
        screen.screens,
        vec![vec![
            "Error while",
            "loading:",
            "GONE.PCA",
            "",
            ViewerError::FileNotFound.short_message(),
            "Press any",
            "        key...",
        ]]
    );
}

#[test]
fn test_invalid_bitmap_error_screen() {
    let mut bytes = bmp_file(1, 24, |_, _, _| [0, 0, 0]);
    // Make the bitmap 97 pixels wide.
    bytes[0x12] = 97;
    let volume = MemoryVolume::new()
        .with_file(BITMAP_CONFIG_FILE, b"NARROW.BMP\n100\n".to_vec())
        .with_file("NARROW.BMP", bytes);
    let board = BoardStub::new(volume, ScriptedInput::idle());

    let mut app = App::new(board, Viewer::Bitmap);
    let end = app.run();
    assert_eq!(end.error, Some(ViewerError::WidthMismatch));
    assert_eq!(app.playback_state().last_result, None);

    let (_, display, _, screen) = app.into_components();
    // Nothing is sent to the display for a rejected file.
    assert!(display.events.is_empty());
    assert_eq!(screen.screens[0][4], "ERR:width!=98");
}

#[test]
fn test_decode_error_during_playback() {
    let bytes = cani_file(&[&[0x01, 0xC7, 0x00]]);
    let volume = MemoryVolume::new()
        .with_file(ANIMATION_CONFIG_FILE, b"BAD.PCA\n".to_vec())
        .with_file("BAD.PCA", bytes);
    let board = BoardStub::new(volume, ScriptedInput::key_after(0, Key::Down));

    let mut app = App::new(board, Viewer::Animation);
    let end = app.run();
    assert_eq!(
        end,
        SessionEnd {
            key: Key::Down,
            error: Some(ViewerError::UnknownInstruction(0xC7)),
        }
    );
    assert_eq!(
        app.playback_state().last_result,
        Some(Err(ViewerError::UnknownInstruction(0xC7)))
    );
}

#[test]
fn test_select_file_and_delay_are_stored() {
    let volume = MemoryVolume::new().with_file("CAT.BMP", bmp_file(1, 32, |_, _, _| [9, 9, 9]));
    let board = BoardStub::new(volume, ScriptedInput::key_after(0, Key::Enter));

    let mut app = App::new(board, Viewer::Bitmap);
    app.select_file(FileName::from("CAT.BMP")).unwrap();
    app.set_frame_delay(Duration::from_millis(300)).unwrap();
    // A still bitmap waits for a key.
    assert_eq!(app.run().key, Key::Enter);

    let (volume, display, _, _) = app.into_components();
    assert_eq!(volume.file(BITMAP_CONFIG_FILE), Some(b"CAT.BMP\n300\n".as_slice()));
    assert_eq!(display.colors().len(), 98 * 70);
}

#[test]
fn test_animation_config_has_no_delay() {
    let board = BoardStub::new(MemoryVolume::new(), ScriptedInput::idle());

    let mut app = App::new(board, Viewer::Animation);
    app.select_file(FileName::from("NYAN.PCA")).unwrap();
    app.set_frame_delay(Duration::ZERO).unwrap();

    let (volume, ..) = app.into_components();
    assert_eq!(volume.file(ANIMATION_CONFIG_FILE), Some(b"NYAN.PCA\n".as_slice()));
}

#[test]
fn test_store_config_failure() {
    let mut volume = MemoryVolume::new();
    volume.set_read_only(true);
    let board = BoardStub::new(volume, ScriptedInput::idle());

    let mut app = App::new(board, Viewer::Bitmap);
    assert_eq!(
        app.select_file(FileName::from("CAT.BMP")),
        Err(ViewerError::StorageWrite)
    );
    // The choice is kept for the current session.
    assert_eq!(app.config().file_name.as_deref(), Some("CAT.BMP"));
}
