//! Time source for status resolution and reconciliation

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Source of the current instant plus the zone appointments are written in.
///
/// Appointment dates and times carry no zone of their own; they are always
/// read as wall-clock time at the shop.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn shop_tz(&self) -> Tz;
}

/// Wall clock
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn shop_tz(&self) -> Tz {
        self.tz
    }
}

/// Manually driven clock, used to freeze time in tests
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<RwLock<DateTime<Utc>>>,
    tz: Tz,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, tz: Tz) -> Self {
        Self {
            now: Arc::new(RwLock::new(now)),
            tz,
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.write() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        if let Ok(mut guard) = self.now.write() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.read().map(|guard| *guard).unwrap_or_else(|e| *e.into_inner())
    }

    fn shop_tz(&self) -> Tz {
        self.tz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_advance() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let clock = FixedClock::new(start, Tz::UTC);
        clock.advance(chrono::Duration::minutes(90));
        assert_eq!(clock.now(), Utc.with_ymd_and_hms(2025, 3, 1, 10, 30, 0).unwrap());

        // Clones share the same reading
        let other = clock.clone();
        other.set(start);
        assert_eq!(clock.now(), start);
    }
}
