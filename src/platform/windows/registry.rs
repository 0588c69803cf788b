use std::ffi::c_void;

use tracing::debug;
use windows::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_SUCCESS, WIN32_ERROR};
use windows::Win32::System::Registry::{
    RegGetValueW, RegSetKeyValueW, HKEY_CURRENT_USER, REG_SZ, RRF_RT_REG_SZ,
};
use windows::core::{HRESULT, PCWSTR};

use crate::errors::{AppError, AppResult};
use crate::history::HistoryBackend;

use super::wide::{from_wide_chars, to_wide_chars};

pub const HISTORY_KEY: &str = r"Software\PSRunner";
pub const HISTORY_VALUE: &str = "AutocompleteList";

/// `HKCU\Software\PSRunner\AutocompleteList`, a `REG_SZ` value.
#[derive(Debug, Clone)]
pub struct RegistryHistoryBackend {
    key: Vec<u16>,
    value: Vec<u16>,
}

impl RegistryHistoryBackend {
    pub fn new() -> Self {
        Self {
            key: to_wide_chars(HISTORY_KEY),
            value: to_wide_chars(HISTORY_VALUE),
        }
    }

    fn query(&self, data: Option<&mut [u16]>, size: &mut u32) -> WIN32_ERROR {
        let data = data.map(|buf| buf.as_mut_ptr() as *mut c_void);
        unsafe {
            RegGetValueW(
                HKEY_CURRENT_USER,
                PCWSTR(self.key.as_ptr()),
                PCWSTR(self.value.as_ptr()),
                RRF_RT_REG_SZ,
                None,
                data,
                Some(size as *mut u32),
            )
        }
    }
}

impl Default for RegistryHistoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryBackend for RegistryHistoryBackend {
    fn load(&self) -> AppResult<Option<String>> {
        let mut size = 0u32;
        match self.query(None, &mut size) {
            ERROR_SUCCESS => {}
            ERROR_FILE_NOT_FOUND => return Ok(None),
            status => return Err(registry_error("read", status)),
        }

        let mut buf = vec![0u16; size as usize / 2 + 1];
        let mut size = (buf.len() * 2) as u32;
        match self.query(Some(&mut buf), &mut size) {
            ERROR_SUCCESS => {}
            ERROR_FILE_NOT_FOUND => return Ok(None),
            status => return Err(registry_error("read", status)),
        }
        let record = from_wide_chars(&buf);
        debug!(bytes = size, "history read from registry");
        Ok(Some(record))
    }

    fn save(&self, record: &str) -> AppResult<()> {
        let data = to_wide_chars(record);
        let status = unsafe {
            RegSetKeyValueW(
                HKEY_CURRENT_USER,
                PCWSTR(self.key.as_ptr()),
                PCWSTR(self.value.as_ptr()),
                REG_SZ.0,
                Some(data.as_ptr() as *const c_void),
                (data.len() * 2) as u32,
            )
        };
        if status != ERROR_SUCCESS {
            return Err(registry_error("write", status));
        }
        Ok(())
    }
}

fn registry_error(op: &str, status: WIN32_ERROR) -> AppError {
    AppError::History(format!(
        "registry {op} of {HISTORY_KEY}\\{HISTORY_VALUE} failed: {}",
        HRESULT::from_win32(status.0).message()
    ))
}
