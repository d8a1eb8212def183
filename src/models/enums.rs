//! Shared domain enums

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// AppointmentStatus
// ---------------------------------------------------------------------------

/// Persisted appointment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum AppointmentStatus {
    Booked,
    Completed,
    /// Terminal, only ever set by an admin
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Booked => "booked",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "booked" => Ok(AppointmentStatus::Booked),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" | "canceled" => Ok(AppointmentStatus::Cancelled),
            _ => Err(format!("Invalid appointment status: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// ResolvedStatus
// ---------------------------------------------------------------------------

/// Status shown to users, derived from the stored status and the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ResolvedStatus {
    Upcoming,
    Completed,
    Cancelled,
}

impl ResolvedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolvedStatus::Upcoming => "upcoming",
            ResolvedStatus::Completed => "completed",
            ResolvedStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for ResolvedStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upcoming" => Ok(ResolvedStatus::Upcoming),
            "completed" => Ok(ResolvedStatus::Completed),
            "cancelled" | "canceled" => Ok(ResolvedStatus::Cancelled),
            _ => Err(format!("Invalid status filter: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// PetType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PetType {
    Dog,
    Cat,
}

impl PetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PetType::Dog => "dog",
            PetType::Cat => "cat",
        }
    }
}

impl std::str::FromStr for PetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dog" => Ok(PetType::Dog),
            "cat" => Ok(PetType::Cat),
            _ => Err(format!("Invalid pet type: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// DayCareType
// ---------------------------------------------------------------------------

/// Day-care plan kind, also the key of a day-care catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum DayCareType {
    Daily,
    LongTerm,
}

impl DayCareType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayCareType::Daily => "daily",
            DayCareType::LongTerm => "longTerm",
        }
    }
}

impl std::fmt::Display for DayCareType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DayCareType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(DayCareType::Daily),
            "longTerm" | "long_term" | "longterm" => Ok(DayCareType::LongTerm),
            _ => Err(format!("Invalid day-care type: {}", s)),
        }
    }
}
