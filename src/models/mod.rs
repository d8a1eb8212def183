//! Data models for the pet shop

pub mod appointment;
pub mod catalog;
pub mod enums;
pub mod user;

// Re-export commonly used types
pub use appointment::{Appointment, AppointmentPatch, DayCareOptions, DayCarePlan, NewAppointment, SlotKey};
pub use catalog::{Catalog, DayCareOption, GroomingService};
pub use enums::{AppointmentStatus, DayCareType, PetType, ResolvedStatus};
pub use user::{MemberRef, Role, UserClaims};
