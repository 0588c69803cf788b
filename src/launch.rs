//! Starting PowerShell for a submitted command.

use std::path::PathBuf;

use tracing::info;

use crate::errors::AppResult;

pub const POWERSHELL_PATH: &str = r"%SystemRoot%\System32\WindowsPowerShell\v1.0\powershell.exe";

/// Verb that asks the shell for an elevated (administrator) process.
pub const ELEVATE_VERB: &str = "runas";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub program: String,
    /// Passed through verbatim as the PowerShell argument string.
    pub arguments: String,
    pub elevate: bool,
    pub working_dir: Option<PathBuf>,
}

impl LaunchRequest {
    /// Builds a request for `command` run by `override_path` or the stock
    /// PowerShell. `%NAME%` references in the program are expanded at launch.
    pub fn powershell(command: &str, elevate: bool, override_path: Option<&str>) -> Self {
        Self {
            program: override_path.unwrap_or(POWERSHELL_PATH).to_string(),
            arguments: command.to_string(),
            elevate,
            working_dir: None,
        }
    }

    pub fn verb(&self) -> Option<&'static str> {
        self.elevate.then_some(ELEVATE_VERB)
    }
}

/// Expands `%NAME%` references where `ExpandEnvironmentStringsW` is not
/// available. Unknown names and a lone `%` are kept as written, as Win32 does.
#[cfg(not(windows))]
pub fn expand_env_vars<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(end) => {
                let name = &after[..end];
                match (!name.is_empty()).then(|| lookup(name)).flatten() {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('%');
                        out.push_str(name);
                        out.push('%');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

pub trait Launcher {
    fn launch(&self, request: &LaunchRequest) -> AppResult<()>;
}

/// Hands the request to the OS shell without waiting for the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellLauncher;

impl Launcher for ShellLauncher {
    fn launch(&self, request: &LaunchRequest) -> AppResult<()> {
        info!(
            program = %request.program,
            elevate = request.elevate,
            "launching command"
        );
        spawn(request)
    }
}

#[cfg(windows)]
fn spawn(request: &LaunchRequest) -> AppResult<()> {
    use crate::platform::windows::{expand_environment_strings, shell_execute};

    let resolved = LaunchRequest {
        program: expand_environment_strings(&request.program)?,
        ..request.clone()
    };
    shell_execute(&resolved)
}

#[cfg(not(windows))]
fn spawn(request: &LaunchRequest) -> AppResult<()> {
    use crate::errors::AppError;
    use std::process::Command;

    // No shell verbs off Windows; elevation is not available here.
    let program = expand_env_vars(&request.program, |name| std::env::var(name).ok());
    let mut command = Command::new(&program);
    command.arg("-Command").arg(&request.arguments);
    if let Some(dir) = &request.working_dir {
        command.current_dir(dir);
    }
    command
        .spawn()
        .map(drop)
        .map_err(|err| AppError::Launch(format!("{program}: {err}")))
}
