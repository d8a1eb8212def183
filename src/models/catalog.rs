//! Service catalog models (grooming services, day-care options)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::DayCareType;

// ---------------------------------------------------------------------------
// GroomingService
// ---------------------------------------------------------------------------

/// A grooming service offered by the shop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct GroomingService {
    pub id: i32,
    /// Display name, also the key appointments reference
    pub name: String,
    /// Base price
    pub price: f64,
    /// Duration in minutes
    pub duration: i32,
    /// Member discount, percent
    pub discount: f64,
    pub features: Vec<String>,
    pub recommended: bool,
    pub crea_date: Option<DateTime<Utc>>,
    pub modif_date: Option<DateTime<Utc>>,
}

impl GroomingService {
    /// Duration rounded to whole hours for display, e.g. "2 hours"
    pub fn duration_label(&self) -> String {
        let hours = ((self.duration as f64) / 60.0).round().max(1.0) as i64;
        if hours == 1 {
            "1 hour".to_string()
        } else {
            format!("{} hours", hours)
        }
    }
}

/// Create or update a grooming service
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpsertGroomingService {
    #[validate(length(min = 1, max = 100, message = "Service name is required"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    /// Duration in minutes
    #[validate(range(min = 1, message = "Duration must be at least 1 minute"))]
    pub duration: i32,
    #[validate(range(min = 0.0, max = 100.0, message = "Discount must be between 0 and 100"))]
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub recommended: bool,
}

// ---------------------------------------------------------------------------
// DayCareOption
// ---------------------------------------------------------------------------

/// Day-care pricing for one plan kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DayCareOption {
    #[serde(rename = "type")]
    pub care_type: DayCareType,
    /// Price per day
    pub price: f64,
    pub description: Option<String>,
}

/// Create or update a day-care option
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpsertDayCareOption {
    #[serde(rename = "type")]
    pub care_type: DayCareType,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Catalog snapshot
// ---------------------------------------------------------------------------

/// Everything pricing needs, read in one go
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub grooming_services: Vec<GroomingService>,
    pub day_care_options: Vec<DayCareOption>,
}

impl Catalog {
    pub fn grooming_service(&self, name: &str) -> Option<&GroomingService> {
        self.grooming_services.iter().find(|s| s.name == name)
    }

    pub fn day_care_option(&self, care_type: DayCareType) -> Option<&DayCareOption> {
        self.day_care_options.iter().find(|o| o.care_type == care_type)
    }
}
