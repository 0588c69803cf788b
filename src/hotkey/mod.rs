//! Global hotkey registration and dispatch.
//!
//! A [`HotkeyRegistrar`] owns one hidden message window and the bindings
//! issued against it. The OS side lives behind [`HotkeyHost`] so the
//! registrar and dispatcher stay platform-neutral.

mod dispatcher;
mod event;
#[cfg(test)]
pub(crate) mod fake;
mod host;
mod keys;
mod registrar;
mod window;

pub use dispatcher::{Dispatcher, Handler};
pub use event::{HotkeyBinding, HotkeyId, KeyPressedEvent};
pub use host::HotkeyHost;
pub use keys::{key_name, parse_key_name, KeyCode, Modifier, Modifiers};
pub use registrar::{BindingState, HotkeyRegistrar};
pub use window::{MessageWindow, Routing, WindowState, WM_HOTKEY};
