//! Time source for timestamps and backup names.
//!
//! Everything that stamps a store goes through [`Clock`] so tests can drive
//! backup rotation with a deterministic, incrementing time.

use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone};
use std::sync::Mutex;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock that returns `start`, then advances by `step` on every call
#[derive(Debug)]
pub struct StepClock {
    next: Mutex<DateTime<Local>>,
    step: Duration,
}

impl StepClock {
    pub fn new(start: DateTime<Local>, step: Duration) -> Self {
        Self {
            next: Mutex::new(start),
            step,
        }
    }

    /// Start at a local wall-clock time, one second per tick
    pub fn from_naive(start: NaiveDateTime) -> Self {
        let start = Local
            .from_local_datetime(&start)
            .earliest()
            .unwrap_or_else(Local::now);
        Self::new(start, Duration::seconds(1))
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Local> {
        let mut next = match self.next.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let current = *next;
        *next = current + self.step;
        current
    }
}

/// ISO 8601 timestamp used in the persisted document
pub fn timestamp(clock: &dyn Clock) -> String {
    clock.now().to_rfc3339()
}
