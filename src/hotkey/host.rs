use crate::errors::{AppResult, RegistrationError};

use super::event::HotkeyId;
use super::keys::{KeyCode, Modifiers};
use super::window::MessageWindow;

/// Platform capability behind the registrar: binds hotkeys to a hidden
/// window and services that window's message queue.
pub trait HotkeyHost {
    /// Asks the OS to post a notification to the host window whenever the
    /// combination is pressed, tagged with `id`.
    fn register(
        &mut self,
        id: HotkeyId,
        modifiers: Modifiers,
        key: KeyCode,
    ) -> Result<(), RegistrationError>;

    fn unregister(&mut self, id: HotkeyId) -> Result<(), RegistrationError>;

    /// Runs the message loop until the host is asked to quit. Notifications
    /// received meanwhile are routed through `window`.
    fn pump_messages(&mut self, window: &MessageWindow) -> AppResult<()>;

    /// Releases the native window. Called exactly once, after every binding
    /// has been unregistered.
    fn destroy_window(&mut self);
}
