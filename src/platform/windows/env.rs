use windows::Win32::Foundation::GetLastError;
use windows::Win32::System::Environment::ExpandEnvironmentStringsW;
use windows::core::{HRESULT, PCWSTR};

use crate::errors::{AppError, AppResult};

use super::wide::{from_wide_chars, to_wide_chars};

/// `%NAME%` expansion as the shell does it. Unknown names stay as written.
pub fn expand_environment_strings(input: &str) -> AppResult<String> {
    let source = to_wide_chars(input);
    let mut buf: Vec<u16> = Vec::new();
    loop {
        let needed = unsafe {
            ExpandEnvironmentStringsW(PCWSTR(source.as_ptr()), Some(buf.as_mut_slice()))
        };
        if needed == 0 {
            let code = unsafe { GetLastError() };
            return Err(AppError::Launch(format!(
                "cannot expand {input}: {}",
                HRESULT::from_win32(code.0).message()
            )));
        }
        if needed as usize <= buf.len() {
            return Ok(from_wide_chars(&buf));
        }
        // Variables can change between calls; retry with the size just reported.
        buf.resize(needed as usize, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_system_root_and_keeps_unknown_names() {
        let expanded = expand_environment_strings(r"%SystemRoot%\System32").unwrap();
        assert!(!expanded.contains('%'));
        assert!(expanded.to_ascii_lowercase().ends_with(r"\system32"));

        let kept = expand_environment_strings("%PSRUNNER_UNSET_FOR_TESTS%").unwrap();
        assert_eq!(kept, "%PSRUNNER_UNSET_FOR_TESTS%");
    }
}
