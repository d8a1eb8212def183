//! Repository layer: store contracts and their PostgreSQL implementation

pub mod appointments;
pub mod catalog;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        catalog::{UpsertDayCareOption, UpsertGroomingService},
        Appointment, AppointmentPatch, DayCareOption, DayCareType, GroomingService, MemberRef,
        NewAppointment, SlotKey,
    },
};

/// Appointment persistence.
///
/// Writes carry the slot the caller last saw next to the id. Implementations
/// indexing bookings by slot use it to find the row; the PostgreSQL store
/// treats a mismatch as [`AppError::StaleSlot`](crate::error::AppError::StaleSlot).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn list_all(&self) -> AppResult<Vec<Appointment>>;

    async fn list_for_member(&self, member: MemberRef) -> AppResult<Vec<Appointment>>;

    async fn get(&self, id: i32) -> AppResult<Appointment>;

    async fn create(&self, data: &NewAppointment) -> AppResult<Appointment>;

    /// Apply a patch and return the stored record
    async fn update(&self, id: i32, patch: &AppointmentPatch, slot: &SlotKey) -> AppResult<Appointment>;

    /// Move a booked appointment to `Completed`.
    ///
    /// Only applies while the row is still booked at `slot`; anything else
    /// (rescheduled, cancelled, already completed) is `StaleSlot`.
    async fn complete(&self, id: i32, slot: &SlotKey) -> AppResult<Appointment>;

    async fn delete(&self, id: i32, slot: &SlotKey) -> AppResult<()>;
}

/// Grooming services and day-care options
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_grooming_services(&self) -> AppResult<Vec<GroomingService>>;

    async fn create_grooming_service(&self, data: &UpsertGroomingService) -> AppResult<GroomingService>;

    async fn update_grooming_service(&self, id: i32, data: &UpsertGroomingService) -> AppResult<GroomingService>;

    async fn delete_grooming_service(&self, id: i32) -> AppResult<()>;

    async fn list_day_care_options(&self) -> AppResult<Vec<DayCareOption>>;

    async fn create_day_care_option(&self, data: &UpsertDayCareOption) -> AppResult<DayCareOption>;

    async fn update_day_care_option(&self, data: &UpsertDayCareOption) -> AppResult<DayCareOption>;

    async fn delete_day_care_option(&self, care_type: DayCareType) -> AppResult<()>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub appointments: appointments::AppointmentsRepository,
    pub catalog: catalog::CatalogRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            appointments: appointments::AppointmentsRepository::new(pool.clone()),
            catalog: catalog::CatalogRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database, used by the readiness check
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
