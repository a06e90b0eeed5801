//! Shared fixtures for unit and integration tests.

use std::sync::Mutex;

use chrono::{DateTime, Local, Utc};
use mockable::Clock;

/// A [`Clock`] fixture whose notion of "now" can be advanced by tests.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn fixed(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        match self.0.lock() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        match self.0.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.now().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.now()
    }
}
