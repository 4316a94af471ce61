//! Clock abstraction for determinism.

use chrono::{DateTime, Utc};

/// Abstraction over system time. Record timestamps and asset keys are derived
/// from it so tests can pin them.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Milliseconds since the Unix epoch, used to make asset keys unique.
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
