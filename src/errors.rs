use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

/// The OS refused to bind (or unbind) a global hotkey.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Couldn't register the hot key. Code: {code}, Error: {message}")]
pub struct RegistrationError {
    pub code: u32,
    pub message: String,
}

impl RegistrationError {
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error, Clone)]
pub enum AppError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    #[error("Message window error: {0}")]
    Window(String),
    #[error("Command launch failed: {0}")]
    Launch(String),
    #[error("History storage error: {0}")]
    History(String),
    #[error("Settings error: {0}")]
    Settings(String),
    #[error("Unknown key name: {0}")]
    UnknownKey(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Registration(_) => "REGISTRATION",
            AppError::Window(_) => "WINDOW",
            AppError::Launch(_) => "LAUNCH",
            AppError::History(_) => "HISTORY",
            AppError::Settings(_) => "SETTINGS",
            AppError::UnknownKey(_) => "UNKNOWN_KEY",
            AppError::Internal(_) => "INTERNAL",
        }
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for AppError {
    fn from(value: windows::core::Error) -> Self {
        AppError::Window(value.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_error_carries_code_and_message() {
        let err = RegistrationError::new(1409, "Hot key is already registered.");
        assert_eq!(
            err.to_string(),
            "Couldn't register the hot key. Code: 1409, Error: Hot key is already registered."
        );

        let app: AppError = err.into();
        assert_eq!(app.code(), "REGISTRATION");
        assert!(app.to_string().contains("1409"));
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(AppError::Launch("x".into()).code(), "LAUNCH");
        assert_eq!(AppError::History("x".into()).code(), "HISTORY");
        assert_eq!(AppError::UnknownKey("Q?".into()).code(), "UNKNOWN_KEY");
    }
}
