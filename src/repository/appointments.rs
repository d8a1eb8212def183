//! Appointments repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{types::Json, FromRow, Pool, Postgres};

use super::AppointmentStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        Appointment, AppointmentPatch, AppointmentStatus, DayCareOptions, MemberRef,
        NewAppointment, SlotKey,
    },
};

/// Row layout of the `appointments` table
#[derive(Debug, FromRow)]
struct AppointmentRow {
    id: i32,
    pet_name: String,
    pet_type: String,
    owner_name: String,
    owner_email: String,
    owner_phone: Option<String>,
    service_type: String,
    appointment_date: NaiveDate,
    appointment_time: String,
    status: String,
    day_care_options: Option<Json<DayCareOptions>>,
    notes: Option<String>,
    total_price: Option<f64>,
    user_id: Option<i32>,
    crea_date: Option<DateTime<Utc>>,
    modif_date: Option<DateTime<Utc>>,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = AppError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        Ok(Appointment {
            id: row.id,
            pet_name: row.pet_name,
            pet_type: row.pet_type.parse().map_err(AppError::Internal)?,
            owner_name: row.owner_name,
            owner_email: row.owner_email,
            owner_phone: row.owner_phone,
            service_type: row.service_type,
            date: row.appointment_date,
            time: row.appointment_time,
            status: row.status.parse().map_err(AppError::Internal)?,
            day_care_options: row.day_care_options.map(|json| json.0),
            notes: row.notes,
            total_price: row.total_price,
            user: row.user_id.map(|id| MemberRef { id }),
            created_at: row.crea_date,
            updated_at: row.modif_date,
        })
    }
}

fn into_appointments(rows: Vec<AppointmentRow>) -> AppResult<Vec<Appointment>> {
    rows.into_iter().map(Appointment::try_from).collect()
}

/// Completion guarded on slot and on the row still being booked
const COMPLETE_BOOKED: &str = "UPDATE appointments SET status = $5, modif_date = NOW() \
     WHERE id = $1 AND appointment_date = $2 AND appointment_time = $3 AND service_type = $4 \
     AND status = $6 \
     RETURNING *";

#[derive(Clone)]
pub struct AppointmentsRepository {
    pool: Pool<Postgres>,
}

impl AppointmentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM appointments WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Error for a guarded write that matched no row
    async fn missed_write(&self, id: i32, slot: &SlotKey) -> AppError {
        match self.exists(id).await {
            Ok(true) => AppError::StaleSlot(format!(
                "Appointment {} changed since it was read at {} {} for {}",
                id, slot.date, slot.time, slot.service_type
            )),
            Ok(false) => AppError::NotFound(format!("Appointment with id {} not found", id)),
            Err(e) => e,
        }
    }
}

#[async_trait]
impl AppointmentStore for AppointmentsRepository {
    async fn list_all(&self) -> AppResult<Vec<Appointment>> {
        let rows = sqlx::query_as::<_, AppointmentRow>(
            "SELECT * FROM appointments ORDER BY appointment_date, appointment_time",
        )
        .fetch_all(&self.pool)
        .await?;
        into_appointments(rows)
    }

    async fn list_for_member(&self, member: MemberRef) -> AppResult<Vec<Appointment>> {
        let rows = sqlx::query_as::<_, AppointmentRow>(
            "SELECT * FROM appointments WHERE user_id = $1 ORDER BY appointment_date, appointment_time",
        )
        .bind(member.id)
        .fetch_all(&self.pool)
        .await?;
        into_appointments(rows)
    }

    async fn get(&self, id: i32) -> AppResult<Appointment> {
        sqlx::query_as::<_, AppointmentRow>("SELECT * FROM appointments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Appointment with id {} not found", id)))?
            .try_into()
    }

    async fn create(&self, data: &NewAppointment) -> AppResult<Appointment> {
        let row = sqlx::query_as::<_, AppointmentRow>(
            r#"
            INSERT INTO appointments (
                pet_name, pet_type, owner_name, owner_email, owner_phone,
                service_type, appointment_date, appointment_time, status,
                day_care_options, notes, total_price, user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(&data.pet_name)
        .bind(data.pet_type.as_str())
        .bind(&data.owner_name)
        .bind(&data.owner_email)
        .bind(&data.owner_phone)
        .bind(&data.service_type)
        .bind(data.date)
        .bind(&data.time)
        .bind(data.status.as_str())
        .bind(data.day_care_options.clone().map(Json))
        .bind(&data.notes)
        .bind(data.total_price)
        .bind(data.user.map(|m| m.id))
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update(&self, id: i32, patch: &AppointmentPatch, slot: &SlotKey) -> AppResult<Appointment> {
        // $1..$4 identify the row, patch values follow
        let mut sets = vec!["modif_date = NOW()".to_string()];
        let mut idx = 5;

        if patch.service_type.is_some() { sets.push(format!("service_type = ${}", idx)); idx += 1; }
        if patch.date.is_some() { sets.push(format!("appointment_date = ${}", idx)); idx += 1; }
        if patch.time.is_some() { sets.push(format!("appointment_time = ${}", idx)); idx += 1; }
        if patch.status.is_some() { sets.push(format!("status = ${}", idx)); idx += 1; }
        if patch.day_care_options.is_some() { sets.push(format!("day_care_options = ${}", idx)); idx += 1; }
        if patch.notes.is_some() { sets.push(format!("notes = ${}", idx)); idx += 1; }
        if patch.total_price.is_some() { sets.push(format!("total_price = ${}", idx)); }

        let query = format!(
            "UPDATE appointments SET {} \
             WHERE id = $1 AND appointment_date = $2 AND appointment_time = $3 AND service_type = $4 \
             RETURNING *",
            sets.join(", ")
        );

        let mut builder = sqlx::query_as::<_, AppointmentRow>(&query)
            .bind(id)
            .bind(slot.date)
            .bind(&slot.time)
            .bind(&slot.service_type);
        if let Some(ref service_type) = patch.service_type { builder = builder.bind(service_type); }
        if let Some(date) = patch.date { builder = builder.bind(date); }
        if let Some(ref time) = patch.time { builder = builder.bind(time); }
        if let Some(status) = patch.status { builder = builder.bind(status.as_str()); }
        if let Some(ref day_care) = patch.day_care_options { builder = builder.bind(day_care.clone().map(Json)); }
        if let Some(ref notes) = patch.notes { builder = builder.bind(notes.clone()); }
        if let Some(total) = patch.total_price { builder = builder.bind(total); }

        match builder.fetch_optional(&self.pool).await? {
            Some(row) => row.try_into(),
            None => Err(self.missed_write(id, slot).await),
        }
    }

    async fn complete(&self, id: i32, slot: &SlotKey) -> AppResult<Appointment> {
        let row = sqlx::query_as::<_, AppointmentRow>(COMPLETE_BOOKED)
            .bind(id)
            .bind(slot.date)
            .bind(&slot.time)
            .bind(&slot.service_type)
            .bind(AppointmentStatus::Completed.as_str())
            .bind(AppointmentStatus::Booked.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(self.missed_write(id, slot).await),
        }
    }

    async fn delete(&self, id: i32, slot: &SlotKey) -> AppResult<()> {
        let result = sqlx::query(
            "DELETE FROM appointments \
             WHERE id = $1 AND appointment_date = $2 AND appointment_time = $3 AND service_type = $4",
        )
        .bind(id)
        .bind(slot.date)
        .bind(&slot.time)
        .bind(&slot.service_type)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.missed_write(id, slot).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_only_matches_booked_rows() {
        assert!(COMPLETE_BOOKED.contains("AND status = $6"));
        assert!(COMPLETE_BOOKED.contains("service_type = $4"));
        assert_eq!(AppointmentStatus::Booked.as_str(), "booked");
    }
}
