//! Appointment pricing.
//!
//! Amounts are plain `f64` currency units. Nothing here rounds: rounding to
//! cents happens once, when an amount is displayed or serialized
//! ([`round_amount`], [`format_amount`], [`serialize_amount`]).

use serde::{Serialize, Serializer};
use utoipa::ToSchema;

use crate::models::{Appointment, Catalog, DayCareType};

/// Fallback for appointments whose service is no longer in the catalog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultRate {
    pub price: f64,
    pub discount: f64,
}

const BASIC_GROOMING: DefaultRate = DefaultRate { price: 50.0, discount: 5.0 };
const PREMIUM_GROOMING: DefaultRate = DefaultRate { price: 80.0, discount: 10.0 };
const SPA_TREATMENT: DefaultRate = DefaultRate { price: 120.0, discount: 15.0 };
const UNKNOWN_SERVICE: DefaultRate = DefaultRate { price: 0.0, discount: 0.0 };

const DAILY_CARE_PER_DAY: f64 = 50.0;
const LONG_TERM_CARE_PER_DAY: f64 = 40.0;

/// Default price and member discount by service name.
///
/// "Full Grooming" is the older name of "Premium Grooming".
pub fn default_service_rate(service_type: &str) -> DefaultRate {
    match service_type {
        "Basic Grooming" => BASIC_GROOMING,
        "Premium Grooming" | "Full Grooming" => PREMIUM_GROOMING,
        "Spa Treatment" => SPA_TREATMENT,
        _ => UNKNOWN_SERVICE,
    }
}

/// Default day-care price per day when the type is missing from the catalog
pub fn default_day_care_rate(care_type: DayCareType) -> f64 {
    match care_type {
        DayCareType::Daily => DAILY_CARE_PER_DAY,
        DayCareType::LongTerm => LONG_TERM_CARE_PER_DAY,
    }
}

/// Price of one appointment, unrounded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    #[serde(serialize_with = "serialize_amount")]
    pub service_price: f64,
    #[serde(serialize_with = "serialize_amount")]
    pub day_care_price: f64,
    #[serde(serialize_with = "serialize_amount")]
    pub member_discount: f64,
    #[serde(serialize_with = "serialize_amount")]
    pub total_before_discount: f64,
    #[serde(serialize_with = "serialize_amount")]
    pub total_price: f64,
    /// Member discount rate applied to the service price, percent
    pub discount_rate: f64,
}

/// Compute the price of an appointment against the current catalog.
///
/// Never fails: unknown services and day-care types fall back to the default
/// tables, and an incomplete day-care add-on counts as none.
pub fn price(appointment: &Appointment, catalog: &Catalog) -> PriceBreakdown {
    let (service_price, discount_rate) = match catalog.grooming_service(&appointment.service_type) {
        Some(service) => (service.price, service.discount),
        None => {
            let rate = default_service_rate(&appointment.service_type);
            (rate.price, rate.discount)
        }
    };

    let day_care_price = appointment
        .day_care()
        .map(|plan| {
            let per_day = catalog
                .day_care_option(plan.care_type)
                .map(|option| option.price)
                .unwrap_or_else(|| default_day_care_rate(plan.care_type));
            per_day * plan.days as f64
        })
        .unwrap_or(0.0);

    let member_discount = if appointment.is_member() {
        (service_price * discount_rate) / 100.0
    } else {
        0.0
    };

    let total_before_discount = service_price + day_care_price;

    PriceBreakdown {
        service_price,
        day_care_price,
        member_discount,
        total_before_discount,
        total_price: total_before_discount - member_discount,
        discount_rate,
    }
}

/// Sum of several totals, still unrounded
pub fn sum_totals<'a>(breakdowns: impl IntoIterator<Item = &'a PriceBreakdown>) -> f64 {
    breakdowns.into_iter().map(|b| b.total_price).sum()
}

/// Round to cents, half away from zero
pub fn round_amount(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Amount as shown to users, e.g. "64.40"
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", round_amount(amount))
}

pub fn serialize_amount<S>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(round_amount(*amount))
}
