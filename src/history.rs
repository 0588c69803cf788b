//! Most-recent-first command history, persisted as one delimited string.

use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use tracing::debug;

use crate::errors::{AppError, AppResult};

pub const HISTORY_DELIMITER: &str = "`";
pub const DEFAULT_HISTORY_LIMIT: usize = 15;

/// Where the flat history record lives.
pub trait HistoryBackend {
    fn load(&self) -> AppResult<Option<String>>;
    fn save(&self, record: &str) -> AppResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandHistory {
    entries: Vec<String>,
    limit: usize,
}

impl CommandHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Parses a stored record, skipping blank entries.
    pub fn from_record(record: &str, limit: usize) -> Self {
        let mut history = Self::new(limit);
        history.entries = record
            .split(HISTORY_DELIMITER)
            .filter(|item| !item.trim().is_empty())
            .take(history.limit)
            .map(str::to_string)
            .collect();
        history
    }

    pub fn load(backend: &dyn HistoryBackend, limit: usize) -> AppResult<Self> {
        let history = match backend.load()? {
            Some(record) => Self::from_record(&record, limit),
            None => Self::new(limit),
        };
        debug!(entries = history.len(), "loaded command history");
        Ok(history)
    }

    pub fn to_record(&self) -> String {
        self.entries.join(HISTORY_DELIMITER)
    }

    /// Moves `command` to the front, dropping an earlier identical entry and
    /// anything beyond the limit.
    pub fn record(&mut self, command: &str) {
        self.entries.retain(|item| item != command);
        self.entries.insert(0, command.to_string());
        self.entries.truncate(self.limit);
    }

    pub fn save(&self, backend: &dyn HistoryBackend) -> AppResult<()> {
        backend.save(&self.to_record())
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

/// Stores the record in a plain text file; used where there is no registry.
pub struct FileHistoryBackend {
    path: PathBuf,
}

impl FileHistoryBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_data_dir() -> AppResult<Self> {
        let dirs = ProjectDirs::from("com", "psrunner", "PSRunner")
            .ok_or_else(|| AppError::History("unable to locate data directory".into()))?;
        Ok(Self::new(dirs.data_local_dir().join("history.txt")))
    }
}

impl HistoryBackend for FileHistoryBackend {
    fn load(&self) -> AppResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&self.path)
            .map(Some)
            .map_err(|err| AppError::History(err.to_string()))
    }

    fn save(&self, record: &str) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::History(err.to_string()))?;
        }
        fs::write(&self.path, record).map_err(|err| AppError::History(err.to_string()))
    }
}

/// Platform default: the registry on Windows, a data-dir file elsewhere.
pub fn default_backend() -> AppResult<Box<dyn HistoryBackend>> {
    #[cfg(windows)]
    {
        Ok(Box::new(crate::platform::windows::RegistryHistoryBackend::new()))
    }
    #[cfg(not(windows))]
    {
        Ok(Box::new(FileHistoryBackend::in_data_dir()?))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    pub(crate) struct MemoryBackend {
        pub record: RefCell<Option<String>>,
    }

    impl HistoryBackend for MemoryBackend {
        fn load(&self) -> AppResult<Option<String>> {
            Ok(self.record.borrow().clone())
        }

        fn save(&self, record: &str) -> AppResult<()> {
            *self.record.borrow_mut() = Some(record.to_string());
            Ok(())
        }
    }

    #[test]
    fn new_command_goes_to_front() {
        let mut history = CommandHistory::from_record("Get-Date`Get-Process", 15);
        history.record("Get-ChildItem");
        assert_eq!(
            history.entries(),
            ["Get-ChildItem", "Get-Date", "Get-Process"]
        );
        assert_eq!(history.latest(), Some("Get-ChildItem"));
    }

    #[test]
    fn duplicate_moves_to_front_instead_of_repeating() {
        let mut history = CommandHistory::from_record("a`b`c", 15);
        history.record("c");
        assert_eq!(history.to_record(), "c`a`b");
    }

    #[test]
    fn history_is_capped_at_limit() {
        let mut history = CommandHistory::new(DEFAULT_HISTORY_LIMIT);
        for i in 0..20 {
            history.record(&format!("cmd {i}"));
        }
        assert_eq!(history.len(), 15);
        assert_eq!(history.latest(), Some("cmd 19"));
        assert_eq!(history.entries().last().map(String::as_str), Some("cmd 5"));
    }

    #[test]
    fn blank_entries_are_skipped_when_reading() {
        let history = CommandHistory::from_record("``ls` `dir`", 15);
        assert_eq!(history.entries(), ["ls", "dir"]);
        assert!(CommandHistory::from_record("", 15).is_empty());
    }

    #[test]
    fn match_is_exact() {
        let mut history = CommandHistory::from_record("ls", 15);
        history.record("LS");
        assert_eq!(history.entries(), ["LS", "ls"]);
    }

    #[test]
    fn load_and_save_through_backend() {
        let backend = MemoryBackend::default();
        let mut history = CommandHistory::load(&backend, 15).unwrap();
        assert!(history.is_empty());

        history.record("Get-Service");
        history.record("Stop-Service spooler");
        history.save(&backend).unwrap();

        assert_eq!(
            backend.record.borrow().as_deref(),
            Some("Stop-Service spooler`Get-Service")
        );
        let reloaded = CommandHistory::load(&backend, 15).unwrap();
        assert_eq!(reloaded, history);
    }

    #[test]
    fn file_backend_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileHistoryBackend::new(dir.path().join("nested").join("history.txt"));
        assert_eq!(backend.load().unwrap(), None);

        backend.save("a`b").unwrap();
        assert_eq!(backend.load().unwrap().as_deref(), Some("a`b"));
    }
}
