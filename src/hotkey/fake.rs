//! In-memory [`HotkeyHost`] used by the unit tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::rc::Rc;

use crate::errors::{AppResult, RegistrationError};

use super::event::HotkeyId;
use super::host::HotkeyHost;
use super::keys::{KeyCode, Modifiers};
use super::window::{MessageWindow, Routing};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    Register(HotkeyId),
    Unregister(HotkeyId),
    DestroyWindow,
}

#[derive(Default)]
pub struct Ledger {
    pub active: BTreeMap<HotkeyId, (Modifiers, KeyCode)>,
    pub calls: Vec<HostCall>,
    pub queue: VecDeque<(u32, u32)>,
    pub failing: BTreeSet<HotkeyId>,
    pub passed_through: usize,
}

impl Ledger {
    pub fn post(&mut self, message: u32, payload: u32) {
        self.queue.push_back((message, payload));
    }
}

pub struct FakeHost {
    ledger: Rc<RefCell<Ledger>>,
}

impl FakeHost {
    pub const ALREADY_REGISTERED: u32 = 1409;
    pub const NOT_REGISTERED: u32 = 1419;

    pub fn new() -> Self {
        Self {
            ledger: Rc::new(RefCell::new(Ledger::default())),
        }
    }

    pub fn ledger(&self) -> Rc<RefCell<Ledger>> {
        Rc::clone(&self.ledger)
    }

    pub fn post(&mut self, message: u32, payload: u32) {
        self.ledger.borrow_mut().post(message, payload);
    }

    pub fn fail_unregister(&mut self, id: HotkeyId) {
        self.ledger.borrow_mut().failing.insert(id);
    }

    pub fn active(&self) -> BTreeMap<HotkeyId, (Modifiers, KeyCode)> {
        self.ledger.borrow().active.clone()
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.ledger.borrow().calls.clone()
    }

    pub fn unregister_order(&self) -> Vec<HotkeyId> {
        self.ledger
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                HostCall::Unregister(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn passed_through(&self) -> usize {
        self.ledger.borrow().passed_through
    }
}

impl HotkeyHost for FakeHost {
    fn register(
        &mut self,
        id: HotkeyId,
        modifiers: Modifiers,
        key: KeyCode,
    ) -> Result<(), RegistrationError> {
        let mut ledger = self.ledger.borrow_mut();
        ledger.calls.push(HostCall::Register(id));
        if ledger.active.values().any(|combo| *combo == (modifiers, key)) {
            return Err(RegistrationError::new(
                Self::ALREADY_REGISTERED,
                "Hot key is already registered.",
            ));
        }
        ledger.active.insert(id, (modifiers, key));
        Ok(())
    }

    fn unregister(&mut self, id: HotkeyId) -> Result<(), RegistrationError> {
        let mut ledger = self.ledger.borrow_mut();
        ledger.calls.push(HostCall::Unregister(id));
        if ledger.failing.contains(&id) || ledger.active.remove(&id).is_none() {
            return Err(RegistrationError::new(
                Self::NOT_REGISTERED,
                "Hot key is not registered.",
            ));
        }
        Ok(())
    }

    fn pump_messages(&mut self, window: &MessageWindow) -> AppResult<()> {
        loop {
            // Release the borrow before routing; handlers may post more messages.
            let next = self.ledger.borrow_mut().queue.pop_front();
            let Some((message, payload)) = next else {
                return Ok(());
            };
            if window.route(message, payload) == Routing::PassThrough {
                self.ledger.borrow_mut().passed_through += 1;
            }
        }
    }

    fn destroy_window(&mut self) {
        self.ledger.borrow_mut().calls.push(HostCall::DestroyWindow);
    }
}
