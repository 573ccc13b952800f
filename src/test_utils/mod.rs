use std::sync::Arc;

use parking_lot::Mutex;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    env_logger::init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for unit test.");
}

/// Payload used across dispatcher unit tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPayload {
    pub sum: u64,
}

pub fn payload(sum: u64) -> TestPayload {
    TestPayload { sum }
}

/// Shared, ordered record of observable test events.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn new_event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn record(
    log: &EventLog,
    event: impl Into<String>,
) {
    log.lock().push(event.into());
}
