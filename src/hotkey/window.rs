use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, trace};

use super::dispatcher::Dispatcher;
use super::event::KeyPressedEvent;

/// The only message the hidden window acts on.
pub const WM_HOTKEY: u32 = 0x0312;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Created,
    Destroyed,
}

/// What the platform window procedure should do after routing a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    Handled,
    PassThrough,
}

/// Platform-neutral half of the hidden hotkey window: decodes notifications
/// and forwards them to the dispatcher. The platform host owns the native
/// handle and feeds raw messages in through [`MessageWindow::route`].
pub struct MessageWindow {
    state: Cell<WindowState>,
    dispatcher: Rc<Dispatcher>,
}

impl MessageWindow {
    pub fn new(dispatcher: Rc<Dispatcher>) -> Self {
        Self {
            state: Cell::new(WindowState::Created),
            dispatcher,
        }
    }

    pub fn state(&self) -> WindowState {
        self.state.get()
    }

    pub fn dispatcher(&self) -> &Rc<Dispatcher> {
        &self.dispatcher
    }

    pub fn route(&self, message: u32, payload: u32) -> Routing {
        if message != WM_HOTKEY {
            return Routing::PassThrough;
        }
        if self.state.get() == WindowState::Destroyed {
            trace!(payload, "hotkey notification after destroy ignored");
            return Routing::Handled;
        }
        let event = KeyPressedEvent::from_payload(payload);
        debug!(hotkey = %event, "hotkey pressed");
        self.dispatcher.fire(&event);
        Routing::Handled
    }

    pub(crate) fn mark_destroyed(&self) {
        self.state.set(WindowState::Destroyed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotkey::keys::Modifiers;
    use std::cell::RefCell;

    #[test]
    fn other_messages_pass_through() {
        let dispatcher = Rc::new(Dispatcher::new());
        let hits = Rc::new(Cell::new(0));
        {
            let hits = Rc::clone(&hits);
            dispatcher.subscribe(move |_| hits.set(hits.get() + 1));
        }
        let window = MessageWindow::new(dispatcher);

        // WM_PAINT, WM_TIMER
        assert_eq!(window.route(0x000F, 0), Routing::PassThrough);
        assert_eq!(window.route(0x0113, 0x0046_0008), Routing::PassThrough);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn hotkey_message_is_decoded_and_dispatched() {
        let dispatcher = Rc::new(Dispatcher::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = Rc::clone(&seen);
            dispatcher.subscribe(move |e| seen.borrow_mut().push(*e));
        }
        let window = MessageWindow::new(dispatcher);

        assert_eq!(window.route(WM_HOTKEY, 0x004E_000A), Routing::Handled);
        assert_eq!(
            *seen.borrow(),
            vec![KeyPressedEvent {
                modifiers: Modifiers::SUPER | Modifiers::CONTROL,
                key: 'N' as u16,
            }]
        );
    }

    #[test]
    fn destroyed_window_drops_notifications() {
        let dispatcher = Rc::new(Dispatcher::new());
        let hits = Rc::new(Cell::new(0));
        {
            let hits = Rc::clone(&hits);
            dispatcher.subscribe(move |_| hits.set(hits.get() + 1));
        }
        let window = MessageWindow::new(dispatcher);
        window.mark_destroyed();

        assert_eq!(window.state(), WindowState::Destroyed);
        window.route(WM_HOTKEY, 0x004E_0008);
        assert_eq!(hits.get(), 0);
    }
}
