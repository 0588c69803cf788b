use tracing::{debug, warn};
use windows::Win32::Foundation::{GetLastError, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW,
    GetWindowLongPtrW, RegisterClassW, SetWindowLongPtrW, TranslateMessage,
    GWLP_USERDATA, HWND_MESSAGE, MSG, WINDOW_EX_STYLE, WINDOW_STYLE, WNDCLASSW,
};
use windows::core::{HRESULT, PCWSTR};

use crate::errors::{AppError, AppResult, RegistrationError};
use crate::hotkey::{HotkeyHost, HotkeyId, KeyCode, MessageWindow, Modifiers, Routing};

use super::wide::to_wide_chars;

const CLASS_NAME: &str = "PSRunnerHotkeyWindow";

/// Message-only window that receives `WM_HOTKEY` for the registrar.
pub struct Win32HotkeyHost {
    hwnd: HWND,
    destroyed: bool,
}

impl Win32HotkeyHost {
    pub fn new() -> AppResult<Self> {
        let instance = unsafe { GetModuleHandleW(None) }?;
        let class_name = to_wide_chars(CLASS_NAME);

        let window_class = WNDCLASSW {
            lpfnWndProc: Some(hotkey_window_proc),
            hInstance: instance.into(),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            ..Default::default()
        };
        // Fails harmlessly if the class already exists.
        unsafe { RegisterClassW(&window_class) };

        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                PCWSTR(class_name.as_ptr()),
                PCWSTR::null(),
                WINDOW_STYLE::default(),
                0,
                0,
                0,
                0,
                Some(HWND_MESSAGE),
                None,
                Some(instance.into()),
                None,
            )
        }?;
        debug!(hwnd = ?hwnd.0, "hotkey window created");

        Ok(Self {
            hwnd,
            destroyed: false,
        })
    }
}

impl HotkeyHost for Win32HotkeyHost {
    fn register(
        &mut self,
        id: HotkeyId,
        modifiers: Modifiers,
        key: KeyCode,
    ) -> Result<(), RegistrationError> {
        // SAFETY: plain OS call against the window this host owns.
        unsafe {
            RegisterHotKey(
                Some(self.hwnd),
                id as i32,
                HOT_KEY_MODIFIERS(modifiers.bits() as u32),
                key as u32,
            )
        }
        .map_err(registration_error)
    }

    fn unregister(&mut self, id: HotkeyId) -> Result<(), RegistrationError> {
        // SAFETY: plain OS call against the window this host owns.
        unsafe { UnregisterHotKey(Some(self.hwnd), id as i32) }.map_err(registration_error)
    }

    fn pump_messages(&mut self, window: &MessageWindow) -> AppResult<()> {
        let _route = RouteGuard::install(self.hwnd, window);
        let mut msg = MSG::default();
        loop {
            let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) };
            match ret.0 {
                0 => {
                    debug!(code = msg.wParam.0, "message loop received WM_QUIT");
                    return Ok(());
                }
                -1 => {
                    let code = unsafe { GetLastError() };
                    return Err(AppError::Window(format!(
                        "GetMessageW failed: {}",
                        HRESULT::from_win32(code.0).message()
                    )));
                }
                _ => unsafe {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                },
            }
        }
    }

    fn destroy_window(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        if let Err(err) = unsafe { DestroyWindow(self.hwnd) } {
            warn!(error = %err, "failed to destroy hotkey window");
        }
    }
}

impl Drop for Win32HotkeyHost {
    fn drop(&mut self) {
        self.destroy_window();
    }
}

fn registration_error(err: windows::core::Error) -> RegistrationError {
    // Win32 failures arrive as HRESULT_FROM_WIN32; the low word is the error code.
    RegistrationError::new((err.code().0 as u32) & 0xFFFF, err.message())
}

/// Points the window procedure at `window` for as long as the loop runs.
struct RouteGuard {
    hwnd: HWND,
}

impl RouteGuard {
    fn install(hwnd: HWND, window: &MessageWindow) -> Self {
        unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, window as *const _ as isize) };
        Self { hwnd }
    }
}

impl Drop for RouteGuard {
    fn drop(&mut self) {
        unsafe { SetWindowLongPtrW(self.hwnd, GWLP_USERDATA, 0) };
    }
}

unsafe extern "system" fn hotkey_window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    unsafe {
        let window = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const MessageWindow;
        // SAFETY: set by RouteGuard from a borrow that outlives the message loop.
        if let Some(window) = window.as_ref() {
            if window.route(msg, lparam.0 as u32) == Routing::Handled {
                return LRESULT(0);
            }
        }
        DefWindowProcW(hwnd, msg, wparam, lparam)
    }
}
