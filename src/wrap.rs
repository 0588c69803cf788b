//! Silent PowerShell wrapper used by the `pswrap` binary.

use std::ffi::{OsStr, OsString};
use std::process::{Command, ExitStatus};

use tracing::{debug, error};

use crate::errors::{AppError, AppResult};

#[cfg(windows)]
pub const WRAPPED_PROGRAM: &str = "powershell.exe";
#[cfg(not(windows))]
pub const WRAPPED_PROGRAM: &str = "pwsh";

/// Exit code reported when the child never produced one.
pub const FALLBACK_EXIT_CODE: i32 = 1;

/// Joins the wrapper's own arguments into the single argument string handed
/// to PowerShell. Arguments are forwarded as-is, valid Unicode or not.
pub fn joined_arguments<I, S>(args: I) -> OsString
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut joined = OsString::new();
    for (i, arg) in args.into_iter().enumerate() {
        if i > 0 {
            joined.push(" ");
        }
        joined.push(arg);
    }
    joined
}

/// Builds a hidden, console-less PowerShell invocation in the current directory.
pub fn build_command(program: &str, arguments: &OsStr) -> Command {
    let mut command = Command::new(program);
    apply_arguments(&mut command, arguments);
    if let Ok(dir) = std::env::current_dir() {
        command.current_dir(dir);
    }
    command
}

#[cfg(windows)]
fn apply_arguments(command: &mut Command, arguments: &OsStr) {
    use std::os::windows::process::CommandExt;
    use windows::Win32::System::Threading::CREATE_NO_WINDOW;

    command.raw_arg(arguments).creation_flags(CREATE_NO_WINDOW.0);
}

#[cfg(not(windows))]
fn apply_arguments(command: &mut Command, arguments: &OsStr) {
    if !arguments.is_empty() {
        command.arg("-Command").arg(arguments);
    }
}

/// Runs the command to completion and returns the exit code to propagate.
pub fn run_to_exit_code(mut command: Command) -> AppResult<i32> {
    let status: ExitStatus = command
        .status()
        .map_err(|err| AppError::Launch(err.to_string()))?;
    debug!(?status, "wrapped process exited");
    Ok(status.code().unwrap_or(FALLBACK_EXIT_CODE))
}

/// Entry point logic: wrap `args`, wait, and produce the process exit code.
pub fn wrap<I, S>(args: I) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let arguments = joined_arguments(args);
    match run_to_exit_code(build_command(WRAPPED_PROGRAM, &arguments)) {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, program = WRAPPED_PROGRAM, "failed to start wrapped process");
            FALLBACK_EXIT_CODE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_are_joined_with_spaces() {
        assert_eq!(
            joined_arguments(["-File", "C:\\jobs\\nightly.ps1", "-Verbose"]),
            "-File C:\\jobs\\nightly.ps1 -Verbose"
        );
        assert_eq!(joined_arguments(Vec::<String>::new()), "");
    }

    #[test]
    fn missing_program_is_a_launch_error() {
        let command = build_command("psrunner-definitely-not-installed", OsStr::new(""));
        let err = run_to_exit_code(command).unwrap_err();
        assert_eq!(err.code(), "LAUNCH");
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_arguments_are_forwarded_untouched() {
        use std::os::unix::ffi::{OsStrExt, OsStringExt};

        let args = [
            OsString::from("-File"),
            OsString::from_vec(vec![b'j', 0xFF, 0xFE, b'.', b'p', b's', b'1']),
        ];
        let joined = joined_arguments(&args);
        assert_eq!(joined.as_bytes(), b"-File j\xFF\xFE.ps1".as_slice());

        let command = build_command("pwsh", &joined);
        let forwarded: Vec<&OsStr> = command.get_args().collect();
        assert_eq!(forwarded, vec![OsStr::new("-Command"), joined.as_os_str()]);
    }

    #[cfg(unix)]
    #[test]
    fn child_exit_code_is_propagated() {
        let mut command = Command::new("sh");
        command.arg("-c").arg("exit 3");
        assert_eq!(run_to_exit_code(command).unwrap(), 3);
    }
}
