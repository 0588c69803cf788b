use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::{MessageBoxW, MB_ICONERROR, MB_OK};
use windows::core::PCWSTR;

use super::wide::to_wide_chars;

/// Modal error box; pumps messages until dismissed.
pub fn show_error(owner: Option<HWND>, title: &str, message: &str) {
    let title_w = to_wide_chars(title);
    let message_w = to_wide_chars(message);

    unsafe {
        let _ = MessageBoxW(
            owner,
            PCWSTR(message_w.as_ptr()),
            PCWSTR(title_w.as_ptr()),
            MB_OK | MB_ICONERROR,
        );
    }
}
