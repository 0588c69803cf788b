//! PSRunner: a global hotkey that opens a "Run PowerShell" box, plus the
//! `pswrap` helper that runs PowerShell without a console window.

pub mod commands;
pub mod errors;
pub mod history;
pub mod hotkey;
pub mod launch;
pub mod platform;
pub mod settings;
pub mod state;
pub mod wrap;

pub use errors::{AppError, AppResult, RegistrationError};
pub use hotkey::{HotkeyHost, HotkeyRegistrar, KeyPressedEvent, Modifier, Modifiers};

/// Installs the global subscriber. `RUST_LOG` wins over the built-in filter.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("psrunner=info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter_layer)
        .with_target(false)
        .compact()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
