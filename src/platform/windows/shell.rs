use windows::Win32::UI::Shell::{ShellExecuteExW, SEE_MASK_NOASYNC, SHELLEXECUTEINFOW};
use windows::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;
use windows::core::PCWSTR;

use crate::errors::{AppError, AppResult};
use crate::launch::LaunchRequest;

use super::wide::to_wide_chars;

/// Starts the request through the shell, like the Explorer Run box does.
/// Returns once the process has been created; never waits for it.
pub fn shell_execute(request: &LaunchRequest) -> AppResult<()> {
    let verb = request.verb().map(to_wide_chars);
    let file = to_wide_chars(&request.program);
    let parameters = to_wide_chars(&request.arguments);
    let directory = request
        .working_dir
        .as_ref()
        .map(|dir| to_wide_chars(&dir.to_string_lossy()));

    let mut info = SHELLEXECUTEINFOW {
        cbSize: std::mem::size_of::<SHELLEXECUTEINFOW>() as u32,
        fMask: SEE_MASK_NOASYNC,
        lpVerb: verb.as_ref().map_or(PCWSTR::null(), |v| PCWSTR(v.as_ptr())),
        lpFile: PCWSTR(file.as_ptr()),
        lpParameters: PCWSTR(parameters.as_ptr()),
        lpDirectory: directory
            .as_ref()
            .map_or(PCWSTR::null(), |d| PCWSTR(d.as_ptr())),
        nShow: SW_SHOWNORMAL.0,
        ..Default::default()
    };

    unsafe { ShellExecuteExW(&mut info) }
        .map_err(|err| AppError::Launch(format!("{}: {}", request.program, err.message())))
}
