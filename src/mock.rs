//! Recording mock collaborators for testing the engine without a bus.

use std::sync::{Arc, Mutex};

use crate::error::LinTpError;
use crate::types::{Channel, ScheduleManager, TransportCallbacks};

/// Notification recorded by [`MockCallbacks`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    TxComplete(Channel),
    RxComplete(Channel, Vec<u8>),
    RxFailed(Channel, LinTpError),
}

/// Schedule manager that records every request.
///
/// Clones share the same recording, so tests can keep a handle after
/// moving the mock into the engine.
#[derive(Debug, Default, Clone)]
pub struct MockSchedule {
    requests: Arc<Mutex<Vec<(u8, u8)>>>,
}

impl MockSchedule {
    pub fn requests(&self) -> Vec<(u8, u8)> {
        self.requests.lock().unwrap().clone()
    }
}

impl ScheduleManager for MockSchedule {
    fn request_schedule(&mut self, network: u8, schedule: u8) {
        self.requests.lock().unwrap().push((network, schedule));
    }
}

/// Notification sink that records every callback in order.
#[derive(Debug, Default, Clone)]
pub struct MockCallbacks {
    events: Arc<Mutex<Vec<Event>>>,
}

impl MockCallbacks {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl TransportCallbacks for MockCallbacks {
    fn transmit_complete(&mut self, channel: Channel) {
        self.events.lock().unwrap().push(Event::TxComplete(channel));
    }

    fn reception_complete(&mut self, channel: Channel, data: &[u8]) {
        self.events
            .lock()
            .unwrap()
            .push(Event::RxComplete(channel, data.to_vec()));
    }

    fn reception_failed(&mut self, channel: Channel, reason: LinTpError) {
        self.events
            .lock()
            .unwrap()
            .push(Event::RxFailed(channel, reason));
    }
}
