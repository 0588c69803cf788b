use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::hotkey::{parse_key_name, KeyCode, Modifier, Modifiers};

pub const DEFAULT_HOTKEY_KEY: &str = "N";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub hotkey_key: String,
    pub hotkey_modifiers: Vec<Modifier>,
    pub history_limit: usize,
    pub powershell_path: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            hotkey_key: DEFAULT_HOTKEY_KEY.into(),
            hotkey_modifiers: vec![Modifier::Super],
            history_limit: DEFAULT_HISTORY_LIMIT,
            powershell_path: None,
        }
    }
}

impl AppSettings {
    pub fn normalized(mut self) -> Self {
        if self.hotkey_key.trim().is_empty() || parse_key_name(&self.hotkey_key).is_err() {
            self.hotkey_key = DEFAULT_HOTKEY_KEY.into();
        }
        if self.hotkey_modifiers.is_empty() {
            self.hotkey_modifiers = vec![Modifier::Super];
        }
        if self.history_limit == 0 {
            self.history_limit = DEFAULT_HISTORY_LIMIT;
        }
        if self
            .powershell_path
            .as_deref()
            .is_some_and(|p| p.trim().is_empty())
        {
            self.powershell_path = None;
        }
        self
    }

    pub fn modifiers(&self) -> Modifiers {
        self.hotkey_modifiers.iter().copied().collect()
    }

    /// Key to bind: the command-line name when it parses, the configured one otherwise.
    pub fn resolve_key(&self, cli_arg: Option<&str>) -> KeyCode {
        if let Some(name) = cli_arg {
            match parse_key_name(name) {
                Ok(code) => return code,
                Err(err) => debug!(error = %err, "ignoring hotkey argument"),
            }
        }
        parse_key_name(&self.hotkey_key)
            .or_else(|_| parse_key_name(DEFAULT_HOTKEY_KEY))
            .unwrap_or(b'N' as KeyCode)
    }
}

/// First command-line argument (program name already skipped) as a key
/// name. An argument that is not valid Unicode counts as absent.
pub fn key_argument<I>(args: I) -> Option<String>
where
    I: IntoIterator<Item = OsString>,
{
    let arg = args.into_iter().next()?;
    match arg.into_string() {
        Ok(name) => Some(name),
        Err(raw) => {
            debug!(argument = ?raw, "ignoring non-Unicode hotkey argument");
            None
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    inner: RwLock<AppSettings>,
}

impl SettingsStore {
    pub fn load() -> AppResult<Self> {
        Self::load_from(settings_path()?)
    }

    pub fn load_from(path: PathBuf) -> AppResult<Self> {
        let data = if path.exists() {
            let raw =
                fs::read_to_string(&path).map_err(|err| AppError::Settings(err.to_string()))?;
            serde_json::from_str::<AppSettings>(&raw)
                .map_err(|err| AppError::Settings(err.to_string()))?
                .normalized()
        } else {
            let defaults = AppSettings::default();
            write_settings(&path, &defaults)?;
            defaults
        };
        debug!(path = %path.display(), "settings loaded");
        Ok(Self {
            path,
            inner: RwLock::new(data),
        })
    }

    pub fn get(&self) -> AppSettings {
        self.inner.read().clone()
    }

    pub fn update(&self, new_settings: AppSettings) -> AppResult<()> {
        let next = new_settings.normalized();
        *self.inner.write() = next.clone();
        write_settings(&self.path, &next)
    }
}

fn write_settings(path: &Path, settings: &AppSettings) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| AppError::Settings(err.to_string()))?;
    }
    let body = serde_json::to_string_pretty(settings)
        .map_err(|err| AppError::Settings(err.to_string()))?;
    fs::write(path, body).map_err(|err| AppError::Settings(err.to_string()))
}

fn settings_path() -> AppResult<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "psrunner", "PSRunner")
        .ok_or_else(|| AppError::Settings("unable to determine configuration directory".into()))?;
    Ok(proj_dirs.config_dir().join("settings.json"))
}
