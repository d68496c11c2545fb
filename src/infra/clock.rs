use chrono::{DateTime, Utc};

use crate::app::ports::Clock;

/// Wall-clock time for production use; tests inject their own `Clock`.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
