use chrono::{DateTime, Utc};

/// Wall-clock source, injected so the monitor and store stay testable
/// without sleeping real time (Design Note: explicit `CoreContext`).
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
