//! The "Run PowerShell" dialog.

use std::cell::{Cell, RefCell};
use std::ffi::c_void;
use std::rc::Rc;

use tracing::{debug, error, warn};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{GetStockObject, COLOR_BTNFACE, DEFAULT_GUI_FONT, HBRUSH};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetKeyState, SetFocus, VIRTUAL_KEY, VK_CONTROL, VK_ESCAPE, VK_RETURN, VK_SHIFT,
};
use windows::Win32::UI::WindowsAndMessaging::{
    AdjustWindowRectEx, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
    GetMessageW, GetWindowLongPtrW, GetWindowTextLengthW, GetWindowTextW, IsChild,
    IsDialogMessageW, IsWindow, LoadCursorW, PostQuitMessage, RegisterClassW, SendMessageW,
    SetForegroundWindow, SetWindowLongPtrW, SetWindowTextW, ShowWindow,
    SystemParametersInfoW, TranslateMessage, CREATESTRUCTW, GWLP_USERDATA,
    HMENU, IDC_ARROW, MSG, SPI_GETWORKAREA, SW_SHOW, SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS,
    WINDOW_EX_STYLE, WINDOW_STYLE, WM_COMMAND, WM_CREATE, WM_DESTROY, WM_KEYDOWN,
    WM_NCCREATE, WM_SETFONT, WNDCLASSW, WS_CAPTION, WS_CHILD, WS_EX_CONTROLPARENT,
    WS_EX_DLGMODALFRAME, WS_OVERLAPPED, WS_SYSMENU, WS_TABSTOP, WS_VISIBLE, WS_VSCROLL,
};
use windows::core::PCWSTR;

use crate::commands::{CommandRunner, Submission};
use crate::errors::AppResult;
use crate::history::{CommandHistory, HistoryBackend};
use crate::launch::Launcher;
use crate::state::ReentryGuard;

use super::message_box::show_error;
use super::wide::{from_wide_chars, to_wide_chars};

const CLASS_NAME: &str = "PSRunnerRunDialog";
const TITLE: &str = "Run PowerShell";
const PROMPT: &str = "Type the name of a PowerShell cmdlet or console command, followed by \
                      any arguments. Press Enter to run the command, or Ctrl+Shift+Enter to \
                      run the command as an administrator.";

const CLIENT_WIDTH: i32 = 469;
const CLIENT_HEIGHT: i32 = 182;
const SCREEN_LEFT: i32 = 8;
const SCREEN_BOTTOM_GAP: i32 = 4;

const ID_OK: usize = 1;
const ID_CANCEL: usize = 2;
const ID_RUN_ELEVATED: usize = 100;
const ID_COMMAND_BOX: usize = 101;

// Control styles and messages not worth a feature flag.
const CBS_DROPDOWN: u32 = 0x0002;
const CBS_AUTOHSCROLL: u32 = 0x0040;
const BS_DEFPUSHBUTTON: u32 = 0x0001;
const CB_SETEDITSEL: u32 = 0x0142;
const CB_ADDSTRING: u32 = 0x0143;
const BN_CLICKED: usize = 0;

/// Everything a dialog needs to run a command.
#[derive(Clone)]
pub struct DialogContext {
    pub backend: Rc<dyn HistoryBackend>,
    pub launcher: Rc<dyn Launcher>,
    pub history_limit: usize,
    pub powershell_path: Option<String>,
}

/// Per-window state behind `GWLP_USERDATA`. The window owns one strong
/// reference; message handlers hold their own while they run.
struct DialogState {
    context: DialogContext,
    history: RefCell<CommandHistory>,
    command_box: Cell<HWND>,
    submitting: ReentryGuard,
}

/// Handle to an open Run dialog. Cheap to copy; becomes stale once closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunDialog {
    hwnd: HWND,
}

impl RunDialog {
    pub fn create(context: DialogContext) -> AppResult<Self> {
        let history = match CommandHistory::load(context.backend.as_ref(), context.history_limit)
        {
            Ok(history) => history,
            Err(err) => {
                warn!(error = %err, "starting with empty history");
                CommandHistory::new(context.history_limit)
            }
        };

        let instance = unsafe { GetModuleHandleW(None) }?;
        let class_name = to_wide_chars(CLASS_NAME);
        let window_class = WNDCLASSW {
            lpfnWndProc: Some(dialog_proc),
            hInstance: instance.into(),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            hbrBackground: HBRUSH((COLOR_BTNFACE.0 + 1) as isize as *mut c_void),
            hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }?,
            ..Default::default()
        };
        unsafe { RegisterClassW(&window_class) };

        let style = WS_OVERLAPPED | WS_CAPTION | WS_SYSMENU;
        let ex_style = WS_EX_DLGMODALFRAME | WS_EX_CONTROLPARENT;
        let mut frame = RECT {
            left: 0,
            top: 0,
            right: CLIENT_WIDTH,
            bottom: CLIENT_HEIGHT,
        };
        unsafe { AdjustWindowRectEx(&mut frame, style, false, ex_style) }?;
        let width = frame.right - frame.left;
        let height = frame.bottom - frame.top;
        let (x, y) = bottom_left_position(height);

        let state = Rc::new(DialogState {
            context,
            history: RefCell::new(history),
            command_box: Cell::new(HWND::default()),
            submitting: ReentryGuard::new(),
        });
        let state_ptr = Rc::into_raw(state);
        let title = to_wide_chars(TITLE);

        let created = unsafe {
            CreateWindowExW(
                ex_style,
                PCWSTR(class_name.as_ptr()),
                PCWSTR(title.as_ptr()),
                style,
                x,
                y,
                width,
                height,
                None,
                None,
                Some(instance.into()),
                Some(state_ptr as *const c_void),
            )
        };
        let hwnd = match created {
            Ok(hwnd) => hwnd,
            Err(err) => {
                // The window never took ownership of the state.
                drop(unsafe { Rc::from_raw(state_ptr) });
                return Err(err.into());
            }
        };

        let dialog = Self { hwnd };
        unsafe {
            let _ = ShowWindow(hwnd, SW_SHOW);
        }
        dialog.activate();
        debug!("run dialog opened");
        Ok(dialog)
    }

    /// Brings the dialog to the front with the command box focused.
    pub fn activate(&self) {
        unsafe {
            let _ = SetForegroundWindow(self.hwnd);
            if let Some(state) = state_of(self.hwnd) {
                let _ = SetFocus(Some(state.command_box.get()));
            }
        }
    }

    pub fn is_open(&self) -> bool {
        unsafe { IsWindow(Some(self.hwnd)).as_bool() }
    }

    /// Services messages until the dialog is closed. Other windows of the
    /// thread (the hotkey window included) keep receiving their messages.
    pub fn run_modal(&self) {
        let mut msg = MSG::default();
        while self.is_open() {
            let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) };
            match ret.0 {
                0 => {
                    // Leave WM_QUIT for the outer loop.
                    unsafe { PostQuitMessage(msg.wParam.0 as i32) };
                    break;
                }
                -1 => break,
                _ => {}
            }

            if msg.message == WM_KEYDOWN && self.owns(msg.hwnd) {
                match VIRTUAL_KEY(msg.wParam.0 as u16) {
                    VK_RETURN => {
                        let id = if modifier_down(VK_CONTROL) && modifier_down(VK_SHIFT) {
                            ID_RUN_ELEVATED
                        } else {
                            ID_OK
                        };
                        self.command(id);
                        continue;
                    }
                    VK_ESCAPE => {
                        self.command(ID_CANCEL);
                        continue;
                    }
                    _ => {}
                }
            }

            unsafe {
                if IsDialogMessageW(self.hwnd, &msg).as_bool() {
                    continue;
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
        debug!("run dialog closed");
    }

    fn owns(&self, hwnd: HWND) -> bool {
        hwnd == self.hwnd || unsafe { IsChild(self.hwnd, hwnd).as_bool() }
    }

    fn command(&self, id: usize) {
        unsafe {
            SendMessageW(self.hwnd, WM_COMMAND, Some(WPARAM(id)), Some(LPARAM(0)));
        }
    }
}

fn modifier_down(key: VIRTUAL_KEY) -> bool {
    unsafe { GetKeyState(key.0 as i32) < 0 }
}

/// Bottom-left corner of the work area, where the Explorer Run box appears.
fn bottom_left_position(window_height: i32) -> (i32, i32) {
    let mut work_area = RECT::default();
    let found = unsafe {
        SystemParametersInfoW(
            SPI_GETWORKAREA,
            0,
            Some(&mut work_area as *mut RECT as *mut c_void),
            SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
        )
    };
    if found.is_err() {
        return (SCREEN_LEFT, 0);
    }
    (
        SCREEN_LEFT,
        work_area.bottom - window_height - SCREEN_BOTTOM_GAP,
    )
}

/// A new strong reference to the window's state, so `WM_DESTROY` cannot
/// free it under a handler that is still running.
unsafe fn state_of(hwnd: HWND) -> Option<Rc<DialogState>> {
    unsafe {
        let ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const DialogState;
        if ptr.is_null() {
            return None;
        }
        Rc::increment_strong_count(ptr);
        Some(Rc::from_raw(ptr))
    }
}

unsafe extern "system" fn dialog_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    unsafe {
        match msg {
            WM_NCCREATE => {
                let create = &*(lparam.0 as *const CREATESTRUCTW);
                SetWindowLongPtrW(hwnd, GWLP_USERDATA, create.lpCreateParams as isize);
            }
            WM_CREATE => {
                if let Some(state) = state_of(hwnd) {
                    state.create_controls(hwnd);
                }
                return LRESULT(0);
            }
            WM_COMMAND => {
                let id = wparam.0 & 0xFFFF;
                let notification = (wparam.0 >> 16) & 0xFFFF;
                let closes = state_of(hwnd)
                    .is_some_and(|state| state.handle_command(hwnd, id, notification));
                if closes {
                    let _ = DestroyWindow(hwnd);
                    return LRESULT(0);
                }
            }
            WM_DESTROY => {
                let ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const DialogState;
                SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
                if !ptr.is_null() {
                    drop(Rc::from_raw(ptr));
                }
                return LRESULT(0);
            }
            _ => {}
        }
        DefWindowProcW(hwnd, msg, wparam, lparam)
    }
}

impl DialogState {
    fn create_controls(&self, hwnd: HWND) {
        let font = unsafe { GetStockObject(DEFAULT_GUI_FONT) };
        let child = |class: &str, text: &str, style: u32, rect: (i32, i32, i32, i32), id: usize| {
            let class_w = to_wide_chars(class);
            let text_w = to_wide_chars(text);
            let control = unsafe {
                CreateWindowExW(
                    WINDOW_EX_STYLE::default(),
                    PCWSTR(class_w.as_ptr()),
                    PCWSTR(text_w.as_ptr()),
                    WINDOW_STYLE(WS_CHILD.0 | WS_VISIBLE.0 | style),
                    rect.0,
                    rect.1,
                    rect.2,
                    rect.3,
                    Some(hwnd),
                    Some(HMENU(id as *mut c_void)),
                    None,
                    None,
                )
            }
            .unwrap_or_else(|err| {
                warn!(class, error = %err, "failed to create dialog control");
                HWND::default()
            });
            unsafe {
                SendMessageW(
                    control,
                    WM_SETFONT,
                    Some(WPARAM(font.0 as usize)),
                    Some(LPARAM(1)),
                );
            }
            control
        };

        child("STATIC", PROMPT, 0, (66, 12, 391, 48), 0);
        child("STATIC", "&Run:", 0, (29, 79, 36, 15), 0);
        self.command_box.set(child(
            "COMBOBOX",
            "",
            WS_TABSTOP.0 | WS_VSCROLL.0 | CBS_DROPDOWN | CBS_AUTOHSCROLL,
            (69, 76, 388, 200),
            ID_COMMAND_BOX,
        ));
        child(
            "BUTTON",
            "OK",
            WS_TABSTOP.0 | BS_DEFPUSHBUTTON,
            (256, 140, 98, 25),
            ID_OK,
        );
        child("BUTTON", "Cancel", WS_TABSTOP.0, (363, 140, 98, 25), ID_CANCEL);

        self.fill_history();
    }

    fn fill_history(&self) {
        let history = self.history.borrow();
        let command_box = self.command_box.get();
        for entry in history.entries() {
            let text = to_wide_chars(entry);
            unsafe {
                SendMessageW(
                    command_box,
                    CB_ADDSTRING,
                    Some(WPARAM(0)),
                    Some(LPARAM(text.as_ptr() as isize)),
                );
            }
        }
        if let Some(latest) = history.latest() {
            let text = to_wide_chars(latest);
            unsafe {
                let _ = SetWindowTextW(command_box, PCWSTR(text.as_ptr()));
                // Select the whole prefilled command.
                SendMessageW(
                    command_box,
                    CB_SETEDITSEL,
                    Some(WPARAM(0)),
                    Some(LPARAM(0xFFFF_0000)),
                );
            }
        }
    }

    fn command_text(&self) -> String {
        unsafe {
            let command_box = self.command_box.get();
            let len = GetWindowTextLengthW(command_box).max(0) as usize;
            let mut buf = vec![0u16; len + 1];
            let copied = GetWindowTextW(command_box, &mut buf).max(0) as usize;
            from_wide_chars(&buf[..copied])
        }
    }

    /// Returns true when the command closes the dialog. Commands arriving
    /// while a submit is still reporting an error are dropped.
    fn handle_command(&self, owner: HWND, id: usize, notification: usize) -> bool {
        if self.submitting.is_busy() {
            return false;
        }
        match (id, notification) {
            (ID_OK, BN_CLICKED) => self.submit(owner, false),
            (ID_RUN_ELEVATED, _) => self.submit(owner, true),
            (ID_CANCEL, BN_CLICKED) => {}
            _ => return false,
        }
        true
    }

    fn submit(&self, hwnd: HWND, elevate: bool) {
        let Some(_entered) = self.submitting.enter() else {
            return;
        };
        let command = self.command_text();
        let outcome = {
            let mut history = self.history.borrow_mut();
            let context = &self.context;
            let mut runner = CommandRunner::new(
                &mut history,
                context.backend.as_ref(),
                context.launcher.as_ref(),
                context.powershell_path.as_deref(),
            );
            runner.submit(&command, elevate)
        };
        match outcome {
            Ok(Submission::Launched) => debug!(elevate, "command submitted"),
            Ok(Submission::Skipped) => {}
            Err(err) => {
                error!(code = err.code(), error = %err, "command failed to start");
                // Pumps messages; the history borrow above has ended.
                show_error(Some(hwnd), TITLE, &err.to_string());
            }
        }
    }
}
