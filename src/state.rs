use std::cell::{Cell, RefCell};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Focused,
    Opened,
    /// `create` produced no dialog.
    Failed,
}

/// Tracks the one open Run dialog so a repeated hotkey focuses it instead of
/// stacking a second one.
///
/// Owned by the entry point and captured by the hotkey handler; lives on the
/// message-loop thread.
pub struct DialogSlot<D> {
    current: RefCell<Option<D>>,
}

impl<D: Clone> DialogSlot<D> {
    pub fn new() -> Self {
        Self {
            current: RefCell::new(None),
        }
    }

    pub fn is_open(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Focuses the open dialog, or creates one and runs it modally. `run`
    /// may pump messages and re-enter this method; the slot borrow is not
    /// held across it.
    pub fn show_or_focus<C, F, R>(&self, create: C, focus: F, run: R) -> Activation
    where
        C: FnOnce() -> Option<D>,
        F: FnOnce(&D),
        R: FnOnce(&D),
    {
        let existing = self.current.borrow().clone();
        if let Some(dialog) = existing {
            focus(&dialog);
            return Activation::Focused;
        }

        let Some(dialog) = create() else {
            return Activation::Failed;
        };
        *self.current.borrow_mut() = Some(dialog.clone());
        run(&dialog);
        *self.current.borrow_mut() = None;
        Activation::Opened
    }
}

impl<D: Clone> Default for DialogSlot<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Refuses nested entry into a section that may pump messages, such as a
/// submit that ends in an error box.
#[derive(Debug, Default)]
pub struct ReentryGuard {
    busy: Cell<bool>,
}

impl ReentryGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while another entry is still in progress.
    pub fn enter(&self) -> Option<Entered<'_>> {
        if self.busy.replace(true) {
            return None;
        }
        Some(Entered { guard: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }
}

/// Leaves the guarded section on drop.
pub struct Entered<'a> {
    guard: &'a ReentryGuard,
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        self.guard.busy.set(false);
    }
}
