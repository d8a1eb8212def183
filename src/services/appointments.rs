//! Appointment booking and administration

use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;
use validator::Validate;

use super::{board::AppointmentBoard, catalog::CatalogService, pricing, status};
use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{
        appointment::{
            parse_calendar_date, AppointmentQuery, AppointmentSummary, AppointmentView,
            CreateAppointment, UpdateAppointment,
        },
        Appointment, AppointmentPatch, AppointmentStatus, Catalog, MemberRef, NewAppointment,
        ResolvedStatus,
    },
    repository::AppointmentStore,
};

#[derive(Clone)]
pub struct AppointmentsService {
    store: Arc<dyn AppointmentStore>,
    catalog: CatalogService,
    board: AppointmentBoard,
    clock: Arc<dyn Clock>,
}

/// Parse `HH:MM`, keeping the canonical zero-padded form
fn parse_time(raw: &str) -> AppResult<String> {
    chrono::NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| AppError::Validation(format!("Invalid time '{}' (use HH:MM)", raw)))
}

fn parse_date(raw: &str, tz: Tz) -> AppResult<NaiveDate> {
    parse_calendar_date(raw, tz)
        .ok_or_else(|| AppError::Validation(format!("Invalid date '{}' (use YYYY-MM-DD)", raw)))
}

fn status_filter(query: &AppointmentQuery) -> AppResult<Option<ResolvedStatus>> {
    query
        .status
        .as_deref()
        .map(|s| s.parse::<ResolvedStatus>().map_err(AppError::BadRequest))
        .transpose()
}

impl AppointmentsService {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        catalog: CatalogService,
        board: AppointmentBoard,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, catalog, board, clock }
    }

    fn view(&self, appointment: Appointment, catalog: &Catalog) -> AppointmentView {
        AppointmentView {
            resolved_status: status::resolve(&appointment, self.clock.as_ref()),
            price: pricing::price(&appointment, catalog),
            appointment,
        }
    }

    /// Views sorted by scheduled date and time, optionally filtered by display status
    fn views(
        &self,
        appointments: Vec<Appointment>,
        catalog: &Catalog,
        filter: Option<ResolvedStatus>,
    ) -> Vec<AppointmentView> {
        let mut views: Vec<AppointmentView> = appointments
            .into_iter()
            .map(|a| self.view(a, catalog))
            .filter(|v| filter.map_or(true, |f| v.resolved_status == f))
            .collect();
        views.sort_by(|a, b| {
            (a.appointment.date, &a.appointment.time, a.appointment.id)
                .cmp(&(b.appointment.date, &b.appointment.time, b.appointment.id))
        });
        views
    }

    /// Every appointment, as the admin portal lists them
    pub async fn list_all(&self, query: &AppointmentQuery) -> AppResult<Vec<AppointmentView>> {
        let filter = status_filter(query)?;
        let appointments = self.store.list_all().await?;
        self.board.replace(appointments.clone()).await;
        let catalog = self.catalog.snapshot().await?;
        Ok(self.views(appointments, &catalog, filter))
    }

    /// A member's own appointments (dashboard)
    pub async fn list_for_member(
        &self,
        member: MemberRef,
        query: &AppointmentQuery,
    ) -> AppResult<Vec<AppointmentView>> {
        let filter = status_filter(query)?;
        let appointments = self.store.list_for_member(member).await?;
        let catalog = self.catalog.snapshot().await?;
        Ok(self.views(appointments, &catalog, filter))
    }

    pub async fn get(&self, id: i32) -> AppResult<AppointmentView> {
        let appointment = self.store.get(id).await?;
        let catalog = self.catalog.snapshot().await?;
        Ok(self.view(appointment, &catalog))
    }

    /// Counts per display status and revenue of completed appointments
    pub async fn summary(&self) -> AppResult<AppointmentSummary> {
        let views = self.list_all(&AppointmentQuery::default()).await?;
        let count = |s: ResolvedStatus| views.iter().filter(|v| v.resolved_status == s).count();
        let completed_revenue = pricing::sum_totals(
            views
                .iter()
                .filter(|v| v.resolved_status == ResolvedStatus::Completed)
                .map(|v| &v.price),
        );
        Ok(AppointmentSummary {
            upcoming: count(ResolvedStatus::Upcoming),
            completed: count(ResolvedStatus::Completed),
            cancelled: count(ResolvedStatus::Cancelled),
            completed_revenue,
        })
    }

    /// Book an appointment; `member` is set when a registered user books
    pub async fn book(
        &self,
        data: &CreateAppointment,
        member: Option<MemberRef>,
    ) -> AppResult<AppointmentView> {
        data.validate()?;
        let date = parse_date(&data.date, self.clock.shop_tz())?;
        let time = parse_time(&data.time)?;

        let catalog = self.catalog.snapshot().await?;
        let mut new = NewAppointment {
            pet_name: data.pet_name.trim().to_string(),
            pet_type: data.pet_type,
            owner_name: data.owner_name.trim().to_string(),
            owner_email: data.owner_email.trim().to_string(),
            owner_phone: data.owner_phone.clone().filter(|p| !p.trim().is_empty()),
            service_type: data.service_type.clone(),
            date,
            time,
            status: AppointmentStatus::Booked,
            day_care_options: data
                .day_care_options
                .as_ref()
                .and_then(|o| o.normalize())
                .map(Into::into),
            notes: data.notes.clone().filter(|n| !n.trim().is_empty()),
            total_price: None,
            user: member,
        };
        new.total_price = Some(pricing::price(&preview(&new), &catalog).total_price);

        let created = self.store.create(&new).await?;
        tracing::info!(
            "Appointment {} booked: {} for {} on {} {}",
            created.id, created.service_type, created.pet_name, created.date, created.time
        );
        self.board.upsert(created.clone()).await;
        Ok(self.view(created, &catalog))
    }

    /// Stored status a booking would have at its (new) schedule
    fn status_for_schedule(&self, appointment: &Appointment) -> AppointmentStatus {
        let candidate = Appointment { status: AppointmentStatus::Booked, ..appointment.clone() };
        match status::resolve(&candidate, self.clock.as_ref()) {
            ResolvedStatus::Completed => AppointmentStatus::Completed,
            _ => AppointmentStatus::Booked,
        }
    }

    /// Admin edit.
    ///
    /// A change of date or time recomputes the stored status of a
    /// non-cancelled appointment: moving an expired appointment into the
    /// future books it again, moving it into the past completes it. Other
    /// edits keep the status unless one is given explicitly.
    pub async fn update(&self, id: i32, data: &UpdateAppointment) -> AppResult<AppointmentView> {
        let current = self.store.get(id).await?;
        let catalog = self.catalog.snapshot().await?;

        let mut patch = AppointmentPatch {
            service_type: data
                .service_type
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            date: data
                .date
                .as_deref()
                .map(|d| parse_date(d, self.clock.shop_tz()))
                .transpose()?,
            time: data.time.as_deref().map(parse_time).transpose()?,
            day_care_options: data
                .day_care_options
                .as_ref()
                .map(|o| o.normalize().map(Into::into)),
            notes: data
                .notes
                .as_ref()
                .map(|n| Some(n.trim().to_string()).filter(|n| !n.is_empty())),
            ..AppointmentPatch::default()
        };

        let mut edited = current.clone();
        patch.apply_to(&mut edited);

        let rescheduled = edited.date != current.date || edited.time != current.time;
        let status = match data.status {
            Some(AppointmentStatus::Cancelled) => AppointmentStatus::Cancelled,
            Some(AppointmentStatus::Completed) => AppointmentStatus::Completed,
            Some(AppointmentStatus::Booked) => self.status_for_schedule(&edited),
            None if rescheduled && current.status != AppointmentStatus::Cancelled => {
                self.status_for_schedule(&edited)
            }
            None => current.status,
        };
        if status != current.status {
            patch.status = Some(status);
            edited.status = status;
        }
        patch.total_price = Some(pricing::price(&edited, &catalog).total_price);

        let updated = self.store.update(id, &patch, &current.slot()).await?;
        tracing::info!(
            "Appointment {} updated: {} {} ({} -> {})",
            id, updated.date, updated.time, current.status, updated.status
        );
        self.board.upsert(updated.clone()).await;
        Ok(self.view(updated, &catalog))
    }

    /// Admin cancellation; terminal
    pub async fn cancel(&self, id: i32) -> AppResult<AppointmentView> {
        self.update(
            id,
            &UpdateAppointment {
                status: Some(AppointmentStatus::Cancelled),
                ..UpdateAppointment::default()
            },
        )
        .await
    }

    /// Permanent deletion
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let current = self.store.get(id).await?;
        self.store.delete(id, &current.slot()).await?;
        self.board.remove(id).await;
        tracing::info!("Appointment {} deleted", id);
        Ok(())
    }
}

/// Unsaved booking dressed as an appointment so it can be priced
fn preview(new: &NewAppointment) -> Appointment {
    Appointment {
        id: 0,
        pet_name: new.pet_name.clone(),
        pet_type: new.pet_type,
        owner_name: new.owner_name.clone(),
        owner_email: new.owner_email.clone(),
        owner_phone: new.owner_phone.clone(),
        service_type: new.service_type.clone(),
        date: new.date,
        time: new.time.clone(),
        status: new.status,
        day_care_options: new.day_care_options.clone(),
        notes: new.notes.clone(),
        total_price: None,
        user: new.user,
        created_at: None,
        updated_at: None,
    }
}
