//! Display status resolution

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{
    clock::Clock,
    models::{Appointment, AppointmentStatus, ResolvedStatus},
};

/// Instant an appointment is scheduled for, if its date and time make sense.
///
/// Local times that fall in a DST gap have no instant and yield `None`;
/// ambiguous ones (DST overlap) take the earlier reading.
pub fn scheduled_instant(date: NaiveDate, time: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let time = time.trim();
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .ok()?;
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

/// Status to display for an appointment at the clock's current reading.
///
/// Stored `Completed` and `Cancelled` win; a booked appointment whose
/// scheduled instant is strictly in the past shows as `Completed`. An
/// unreadable time never expires.
pub fn resolve(appointment: &Appointment, clock: &dyn Clock) -> ResolvedStatus {
    match appointment.status {
        AppointmentStatus::Completed => ResolvedStatus::Completed,
        AppointmentStatus::Cancelled => ResolvedStatus::Cancelled,
        AppointmentStatus::Booked => {
            match scheduled_instant(appointment.date, &appointment.time, clock.shop_tz()) {
                Some(at) if at < clock.now() => ResolvedStatus::Completed,
                _ => ResolvedStatus::Upcoming,
            }
        }
    }
}

/// Booked in storage but already over by the clock
pub fn is_silently_completed(appointment: &Appointment, clock: &dyn Clock) -> bool {
    appointment.status == AppointmentStatus::Booked
        && resolve(appointment, clock) == ResolvedStatus::Completed
}
