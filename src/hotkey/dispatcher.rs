use std::cell::RefCell;
use std::rc::Rc;

use super::event::KeyPressedEvent;

pub type Handler = Rc<dyn Fn(&KeyPressedEvent)>;

/// Ordered list of hotkey subscribers.
///
/// Handlers run on the message-loop thread. `fire` iterates over a snapshot,
/// so a handler may pump a nested message loop (a modal dialog) that fires
/// the dispatcher again. Panics are not caught.
#[derive(Default)]
pub struct Dispatcher {
    handlers: RefCell<Vec<Handler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&KeyPressedEvent) + 'static,
    {
        self.handlers.borrow_mut().push(Rc::new(handler));
    }

    pub fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.borrow().is_empty()
    }

    pub fn fire(&self, event: &KeyPressedEvent) {
        let snapshot: Vec<Handler> = self.handlers.borrow().clone();
        for handler in snapshot {
            handler(event);
        }
    }
}
