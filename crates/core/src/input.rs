//! User input collaborator.

use core::time::Duration;

/// Buttons of the device joystick.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
}

/// Source of user input events.
///
/// Input is the only way to interrupt a pause or to stop playback.
pub trait Input {
    /// Returns a pending key press without blocking.
    fn poll(&mut self) -> Option<Key>;
    /// Blocks until a key is pressed.
    fn wait(&mut self) -> Key;
    /// Blocks until a key is pressed or the timeout expires.
    fn wait_timeout(&mut self, timeout: Duration) -> Option<Key>;
}

impl<T: ?Sized + Input> Input for &mut T {
    fn poll(&mut self) -> Option<Key> {
        T::poll(self)
    }

    fn wait(&mut self) -> Key {
        T::wait(self)
    }

    fn wait_timeout(&mut self, timeout: Duration) -> Option<Key> {
        T::wait_timeout(self, timeout)
    }
}
