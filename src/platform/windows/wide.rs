use std::ffi::OsStr;
use std::iter::once;
use std::os::windows::ffi::OsStrExt;

/// NUL-terminated UTF-16 copy of `s` for `PCWSTR` parameters.
pub fn to_wide_chars(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(once(0)).collect()
}

/// Reads UTF-16 up to the first NUL (or the end of the buffer).
pub fn from_wide_chars(buf: &[u16]) -> String {
    let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..end])
}
