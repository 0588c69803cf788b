//! What happens when the user submits the Run dialog.

use tracing::{debug, warn};

use crate::errors::AppResult;
use crate::history::{CommandHistory, HistoryBackend};
use crate::launch::{LaunchRequest, Launcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Launched,
    /// Blank input: nothing recorded, nothing started.
    Skipped,
}

pub struct CommandRunner<'a> {
    history: &'a mut CommandHistory,
    backend: &'a dyn HistoryBackend,
    launcher: &'a dyn Launcher,
    powershell_path: Option<&'a str>,
}

impl<'a> CommandRunner<'a> {
    pub fn new(
        history: &'a mut CommandHistory,
        backend: &'a dyn HistoryBackend,
        launcher: &'a dyn Launcher,
        powershell_path: Option<&'a str>,
    ) -> Self {
        Self {
            history,
            backend,
            launcher,
            powershell_path,
        }
    }

    /// Records `command` in the history, persists it, then launches it.
    ///
    /// A history write failure is logged and does not stop the launch.
    pub fn submit(&mut self, command: &str, elevate: bool) -> AppResult<Submission> {
        if command.trim().is_empty() {
            debug!("blank command ignored");
            return Ok(Submission::Skipped);
        }

        self.history.record(command);
        if let Err(err) = self.history.save(self.backend) {
            warn!(error = %err, "failed to persist command history");
        }

        let request = LaunchRequest::powershell(command, elevate, self.powershell_path);
        self.launcher.launch(&request)?;
        Ok(Submission::Launched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::history::tests::MemoryBackend;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingLauncher {
        launched: RefCell<Vec<LaunchRequest>>,
        fail: bool,
    }

    impl Launcher for RecordingLauncher {
        fn launch(&self, request: &LaunchRequest) -> AppResult<()> {
            if self.fail {
                return Err(AppError::Launch("The system cannot find the file specified.".into()));
            }
            self.launched.borrow_mut().push(request.clone());
            Ok(())
        }
    }

    #[test]
    fn submit_records_persists_and_launches() {
        let backend = MemoryBackend::default();
        let launcher = RecordingLauncher::default();
        let mut history = CommandHistory::from_record("Get-Date", 15);

        let outcome = CommandRunner::new(&mut history, &backend, &launcher, Some("pwsh"))
            .submit("Get-Process", true)
            .unwrap();

        assert_eq!(outcome, Submission::Launched);
        assert_eq!(backend.record.borrow().as_deref(), Some("Get-Process`Get-Date"));
        let launched = launcher.launched.borrow();
        assert_eq!(launched.len(), 1);
        assert_eq!(launched[0].arguments, "Get-Process");
        assert!(launched[0].elevate);
    }

    #[test]
    fn blank_command_is_skipped() {
        let backend = MemoryBackend::default();
        let launcher = RecordingLauncher::default();
        let mut history = CommandHistory::default();

        let outcome = CommandRunner::new(&mut history, &backend, &launcher, None)
            .submit("   ", false)
            .unwrap();

        assert_eq!(outcome, Submission::Skipped);
        assert!(history.is_empty());
        assert!(backend.record.borrow().is_none());
        assert!(launcher.launched.borrow().is_empty());
    }

    #[test]
    fn launch_failure_still_keeps_history() {
        let backend = MemoryBackend::default();
        let launcher = RecordingLauncher {
            fail: true,
            ..Default::default()
        };
        let mut history = CommandHistory::default();

        let err = CommandRunner::new(&mut history, &backend, &launcher, None)
            .submit("notepad", false)
            .unwrap_err();

        assert_eq!(err.code(), "LAUNCH");
        assert_eq!(history.latest(), Some("notepad"));
        assert_eq!(backend.record.borrow().as_deref(), Some("notepad"));
    }
}
