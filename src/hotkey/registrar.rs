use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::errors::{AppResult, RegistrationError};

use super::dispatcher::Dispatcher;
use super::event::{HotkeyBinding, HotkeyId, KeyPressedEvent};
use super::host::HotkeyHost;
use super::keys::{KeyCode, Modifiers};
use super::window::{MessageWindow, WindowState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    Active,
    Released,
    /// The OS refused the binding; the id stays consumed.
    Rejected,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    binding: HotkeyBinding,
    state: BindingState,
}

/// Owns the hidden hotkey window and every binding issued against it.
///
/// All methods are expected to run on the thread that owns the message loop.
pub struct HotkeyRegistrar<H: HotkeyHost> {
    host: H,
    window: MessageWindow,
    last_id: HotkeyId,
    entries: BTreeMap<HotkeyId, Entry>,
}

impl<H: HotkeyHost> HotkeyRegistrar<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            window: MessageWindow::new(Rc::new(Dispatcher::new())),
            last_id: 0,
            entries: BTreeMap::new(),
        }
    }

    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&KeyPressedEvent) + 'static,
    {
        self.window.dispatcher().subscribe(handler);
    }

    pub fn register(
        &mut self,
        modifiers: Modifiers,
        key: KeyCode,
    ) -> Result<HotkeyId, RegistrationError> {
        self.last_id += 1;
        let binding = HotkeyBinding {
            id: self.last_id,
            modifiers,
            key,
        };

        let outcome = if self.window.state() == WindowState::Destroyed {
            Err(RegistrationError::new(0, "hotkey window has been destroyed"))
        } else {
            self.host.register(binding.id, modifiers, key)
        };

        let state = match &outcome {
            Ok(()) => {
                info!(id = binding.id, hotkey = %binding, "registered global hotkey");
                BindingState::Active
            }
            Err(err) => {
                warn!(id = binding.id, hotkey = %binding, code = err.code, "hotkey registration rejected");
                BindingState::Rejected
            }
        };
        self.entries.insert(binding.id, Entry { binding, state });
        outcome.map(|()| binding.id)
    }

    /// Unregisters one active binding ahead of disposal.
    pub fn release(&mut self, id: HotkeyId) -> Result<(), RegistrationError> {
        let entry = match self.entries.get_mut(&id) {
            Some(entry) if entry.state == BindingState::Active => entry,
            _ => return Ok(()),
        };
        entry.state = BindingState::Released;
        debug!(id, "releasing hotkey");
        self.host.unregister(id)
    }

    /// Services the message loop until the host quits.
    pub fn run(&mut self) -> AppResult<()> {
        self.host.pump_messages(&self.window)
    }

    /// Unregisters every outstanding id, newest first, then destroys the
    /// window. Failures are logged and skipped. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.window.state() == WindowState::Destroyed {
            return;
        }
        for (id, entry) in self.entries.iter_mut().rev() {
            if entry.state == BindingState::Released {
                continue;
            }
            if let Err(err) = self.host.unregister(*id) {
                debug!(id, code = err.code, "unregister failed during dispose");
                if entry.state == BindingState::Active {
                    warn!(id, error = %err, "failed to unregister hotkey");
                }
            }
            entry.state = BindingState::Released;
        }
        self.host.destroy_window();
        self.window.mark_destroyed();
        debug!("hotkey window destroyed");
    }

    pub fn binding(&self, id: HotkeyId) -> Option<(HotkeyBinding, BindingState)> {
        self.entries.get(&id).map(|e| (e.binding, e.state))
    }

    pub fn active_bindings(&self) -> impl Iterator<Item = HotkeyBinding> + '_ {
        self.entries
            .values()
            .filter(|e| e.state == BindingState::Active)
            .map(|e| e.binding)
    }

    pub fn window_state(&self) -> WindowState {
        self.window.state()
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

impl<H: HotkeyHost> Drop for HotkeyRegistrar<H> {
    fn drop(&mut self) {
        self.dispose();
    }
}
