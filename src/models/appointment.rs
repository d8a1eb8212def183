//! Grooming appointment model and related types

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{AppointmentStatus, DayCareType, PetType, ResolvedStatus};
use super::user::MemberRef;
use crate::services::pricing::PriceBreakdown;

/// Appointment as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i32,
    pub pet_name: String,
    pub pet_type: PetType,
    /// Contact snapshot taken at booking time
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: Option<String>,
    /// Name of the grooming service in the catalog
    pub service_type: String,
    /// Calendar day, shop local
    pub date: NaiveDate,
    /// Shop local time (HH:MM, 24-hour)
    pub time: String,
    pub status: AppointmentStatus,
    pub day_care_options: Option<DayCareOptions>,
    pub notes: Option<String>,
    /// Price computed at the last write; never authoritative
    pub total_price: Option<f64>,
    /// Registered member who booked, if any
    pub user: Option<MemberRef>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Appointment {
    /// Slot the appointment currently occupies, used to disambiguate writes
    pub fn slot(&self) -> SlotKey {
        SlotKey {
            date: self.date,
            time: self.time.clone(),
            service_type: self.service_type.clone(),
        }
    }

    /// Normalized day-care add-on, `None` when absent or malformed
    pub fn day_care(&self) -> Option<DayCarePlan> {
        self.day_care_options.as_ref().and_then(DayCareOptions::normalize)
    }

    pub fn is_member(&self) -> bool {
        self.user.is_some()
    }
}

// ---------------------------------------------------------------------------
// Day-care add-on
// ---------------------------------------------------------------------------

/// Day-care add-on as submitted or stored; may be incomplete
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayCareOptions {
    #[serde(rename = "type", default, deserialize_with = "lenient_day_care_type")]
    pub care_type: Option<DayCareType>,
    #[serde(default)]
    pub days: Option<i32>,
    #[serde(default)]
    pub morning: bool,
    #[serde(default)]
    pub afternoon: bool,
    #[serde(default)]
    pub evening: bool,
}

/// Day-care add-on that passed normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayCarePlan {
    #[serde(rename = "type")]
    pub care_type: DayCareType,
    pub days: u32,
    pub morning: bool,
    pub afternoon: bool,
    pub evening: bool,
}

impl DayCareOptions {
    /// An add-on without a type, with fewer than one day, or with no
    /// time-of-day slot selected counts as no add-on at all.
    pub fn normalize(&self) -> Option<DayCarePlan> {
        let care_type = self.care_type?;
        let days = u32::try_from(self.days?).ok().filter(|d| *d >= 1)?;
        if !(self.morning || self.afternoon || self.evening) {
            return None;
        }
        Some(DayCarePlan {
            care_type,
            days,
            morning: self.morning,
            afternoon: self.afternoon,
            evening: self.evening,
        })
    }
}

impl From<DayCarePlan> for DayCareOptions {
    fn from(plan: DayCarePlan) -> Self {
        Self {
            care_type: Some(plan.care_type),
            days: i32::try_from(plan.days).ok(),
            morning: plan.morning,
            afternoon: plan.afternoon,
            evening: plan.evening,
        }
    }
}

/// Unknown type names become `None` instead of failing the whole record
fn lenient_day_care_type<'de, D>(deserializer: D) -> Result<Option<DayCareType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

// ---------------------------------------------------------------------------
// Store contract types
// ---------------------------------------------------------------------------

/// Previous slot of an appointment, sent alongside its id on writes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub time: String,
    pub service_type: String,
}

/// Fields to insert for a new booking
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub pet_name: String,
    pub pet_type: PetType,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: Option<String>,
    pub service_type: String,
    pub date: NaiveDate,
    pub time: String,
    pub status: AppointmentStatus,
    pub day_care_options: Option<DayCareOptions>,
    pub notes: Option<String>,
    pub total_price: Option<f64>,
    pub user: Option<MemberRef>,
}

/// Partial update; `None` leaves a column untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentPatch {
    pub service_type: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub day_care_options: Option<Option<DayCareOptions>>,
    pub notes: Option<Option<String>>,
    pub total_price: Option<f64>,
}

impl AppointmentPatch {
    pub fn status(status: AppointmentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Apply the patch to an in-memory copy
    pub fn apply_to(&self, appointment: &mut Appointment) {
        if let Some(ref service_type) = self.service_type {
            appointment.service_type = service_type.clone();
        }
        if let Some(date) = self.date {
            appointment.date = date;
        }
        if let Some(ref time) = self.time {
            appointment.time = time.clone();
        }
        if let Some(status) = self.status {
            appointment.status = status;
        }
        if let Some(ref day_care) = self.day_care_options {
            appointment.day_care_options = day_care.clone();
        }
        if let Some(ref notes) = self.notes {
            appointment.notes = notes.clone();
        }
        if let Some(total) = self.total_price {
            appointment.total_price = Some(total);
        }
    }
}

// ---------------------------------------------------------------------------
// API request / response types
// ---------------------------------------------------------------------------

/// Book an appointment
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointment {
    #[validate(length(min = 1, max = 100, message = "Pet name is required"))]
    pub pet_name: String,
    pub pet_type: PetType,
    #[validate(length(min = 1, max = 200, message = "Owner name is required"))]
    pub owner_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub owner_email: String,
    pub owner_phone: Option<String>,
    #[validate(length(min = 1, message = "Service type is required"))]
    pub service_type: String,
    /// Date (YYYY-MM-DD or RFC 3339 timestamp)
    pub date: String,
    /// Time (HH:MM)
    pub time: String,
    pub day_care_options: Option<DayCareOptions>,
    pub notes: Option<String>,
}

/// Admin edit of an appointment
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointment {
    pub service_type: Option<String>,
    /// Date (YYYY-MM-DD or RFC 3339 timestamp)
    pub date: Option<String>,
    /// Time (HH:MM)
    pub time: Option<String>,
    /// Replaces the add-on; an incomplete add-on removes it
    pub day_care_options: Option<DayCareOptions>,
    /// Empty string clears the notes
    pub notes: Option<String>,
    /// Explicit status override (e.g. Cancelled)
    pub status: Option<AppointmentStatus>,
}

/// Appointment with its display status and freshly computed price
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub resolved_status: ResolvedStatus,
    pub price: PriceBreakdown,
}

/// Query parameters for appointment listings
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AppointmentQuery {
    /// Filter on display status (upcoming, completed, cancelled)
    pub status: Option<String>,
}

/// Admin dashboard figures
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSummary {
    pub upcoming: usize,
    pub completed: usize,
    pub cancelled: usize,
    /// Revenue of completed appointments, recomputed from the catalog
    #[serde(serialize_with = "crate::services::pricing::serialize_amount")]
    #[schema(value_type = f64)]
    pub completed_revenue: f64,
}

/// Parse a calendar date written either as `YYYY-MM-DD` or as a timestamp.
///
/// A timestamp with an offset (`2025-03-01T23:00:00Z`) names an instant and
/// is read as the shop-local day it falls on; one without an offset keeps its
/// leading date as written.
pub fn parse_calendar_date(raw: &str, tz: Tz) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&tz).date_naive());
    }
    let head = raw.get(..10)?;
    match raw.as_bytes().get(10) {
        None | Some(b'T') | Some(b't') | Some(b' ') => {
            NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
        }
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(days: i32, morning: bool) -> DayCareOptions {
        DayCareOptions {
            care_type: Some(DayCareType::Daily),
            days: Some(days),
            morning,
            afternoon: false,
            evening: false,
        }
    }

    #[test]
    fn test_day_care_normalize() {
        let plan = options(3, true).normalize().unwrap();
        assert_eq!(plan.days, 3);
        assert_eq!(plan.care_type, DayCareType::Daily);

        assert!(options(0, true).normalize().is_none());
        assert!(options(-2, true).normalize().is_none());
        assert!(options(3, false).normalize().is_none());
        assert!(DayCareOptions { care_type: None, ..options(3, true) }.normalize().is_none());
        assert!(DayCareOptions { days: None, ..options(3, true) }.normalize().is_none());
    }

    #[test]
    fn test_day_care_unknown_type_is_absent() {
        let raw: DayCareOptions =
            serde_json::from_str(r#"{"type":"weekly","days":2,"morning":true}"#).unwrap();
        assert_eq!(raw.care_type, None);
        assert!(raw.normalize().is_none());

        let raw: DayCareOptions =
            serde_json::from_str(r#"{"type":"longTerm","days":10,"evening":true}"#).unwrap();
        assert_eq!(raw.normalize().map(|p| p.care_type), Some(DayCareType::LongTerm));
    }

    #[test]
    fn test_parse_calendar_date() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1);
        assert_eq!(parse_calendar_date("2025-03-01", Tz::UTC), expected);
        assert_eq!(parse_calendar_date("2025-03-01T00:00:00.000Z", Tz::UTC), expected);
        assert_eq!(parse_calendar_date(" 2025-03-01 10:00:00 ", Tz::UTC), expected);
        assert_eq!(parse_calendar_date("2025-03-01T10:00:00", Tz::UTC), expected);
        assert_eq!(parse_calendar_date("2025-03-011", Tz::UTC), None);
        assert_eq!(parse_calendar_date("01/03/2025", Tz::UTC), None);
        assert_eq!(parse_calendar_date("", Tz::UTC), None);
    }

    #[test]
    fn test_parse_calendar_date_reads_instants_in_shop_zone() {
        let paris = chrono_tz::Europe::Paris;
        // Local midnight in Paris, sent as UTC
        assert_eq!(
            parse_calendar_date("2025-03-01T23:00:00Z", paris),
            NaiveDate::from_ymd_opt(2025, 3, 2)
        );
        assert_eq!(
            parse_calendar_date("2025-03-02T00:00:00+01:00", paris),
            NaiveDate::from_ymd_opt(2025, 3, 2)
        );
        // Plain dates and offset-free timestamps are taken as written
        assert_eq!(parse_calendar_date("2025-03-01", paris), NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(
            parse_calendar_date("2025-03-01T23:00:00", paris),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
    }

    #[test]
    fn test_patch_apply() {
        let mut appointment = crate::services::status::tests::appointment("2025-03-01", "10:00");
        let patch = AppointmentPatch {
            time: Some("15:30".to_string()),
            day_care_options: Some(None),
            notes: Some(Some("nervous around dryers".to_string())),
            ..AppointmentPatch::default()
        };
        patch.apply_to(&mut appointment);
        assert_eq!(appointment.time, "15:30");
        assert_eq!(appointment.day_care_options, None);
        assert_eq!(appointment.notes.as_deref(), Some("nervous around dryers"));
        assert_eq!(appointment.status, AppointmentStatus::Booked);
    }
}
