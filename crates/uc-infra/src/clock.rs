//! Wall-clock adapter for [`uc_core::ports::ClockPort`]: the only concrete
//! implementation the daemon runs with. Tests inject their own fakes
//! instead of depending on this one, the way the teacher's use-case tests
//! hand-roll mock ports rather than reach for the real adapter.

use chrono::{DateTime, Utc};
use uc_core::ports::ClockPort;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
