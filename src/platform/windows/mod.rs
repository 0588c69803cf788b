//! Win32 implementation: hidden hotkey window, registry-backed history,
//! environment expansion, shell launch, and the Run dialog.

mod dialog;
mod env;
mod host;
mod message_box;
mod registry;
mod shell;
mod wide;

pub use dialog::{DialogContext, RunDialog};
pub use env::expand_environment_strings;
pub use host::Win32HotkeyHost;
pub use message_box::show_error;
pub use registry::RegistryHistoryBackend;
pub use shell::shell_execute;
pub use wide::{from_wide_chars, to_wide_chars};
