//! Appointment endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::appointment::{
        AppointmentQuery, AppointmentSummary, AppointmentView, CreateAppointment, UpdateAppointment,
    },
    services::reconciler::{SweepReport, SweepTrigger},
};

use super::{AuthenticatedUser, MaybeUser};

/// List all appointments (admin)
#[utoipa::path(
    get,
    path = "/appointments",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(AppointmentQuery),
    responses(
        (status = 200, description = "All appointments with display status and price", body = Vec<AppointmentView>),
        (status = 400, description = "Unknown status filter"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_appointments(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AppointmentQuery>,
) -> AppResult<Json<Vec<AppointmentView>>> {
    claims.require_admin()?;
    let views = state.services.appointments.list_all(&query).await?;
    Ok(Json(views))
}

/// List the current member's appointments
#[utoipa::path(
    get,
    path = "/appointments/mine",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(AppointmentQuery),
    responses(
        (status = 200, description = "Member's appointments", body = Vec<AppointmentView>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_appointments(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AppointmentQuery>,
) -> AppResult<Json<Vec<AppointmentView>>> {
    let views = state
        .services
        .appointments
        .list_for_member(claims.member_ref(), &query)
        .await?;
    Ok(Json(views))
}

/// Book an appointment, as a guest or as a signed-in member
#[utoipa::path(
    post,
    path = "/appointments",
    tag = "appointments",
    request_body = CreateAppointment,
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentView),
        (status = 400, description = "Invalid booking")
    )
)]
pub async fn book_appointment(
    State(state): State<crate::AppState>,
    MaybeUser(claims): MaybeUser,
    Json(data): Json<CreateAppointment>,
) -> AppResult<(StatusCode, Json<AppointmentView>)> {
    let member = claims.map(|c| c.member_ref());
    let view = state.services.appointments.book(&data, member).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Get one appointment
#[utoipa::path(
    get,
    path = "/appointments/{id}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment", body = AppointmentView),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn get_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<AppointmentView>> {
    let view = state.services.appointments.get(id).await?;
    if !claims.is_admin() && view.appointment.user != Some(claims.member_ref()) {
        return Err(AppError::Authorization(
            "Not allowed to view this appointment".to_string(),
        ));
    }
    Ok(Json(view))
}

/// Edit an appointment (admin)
#[utoipa::path(
    put,
    path = "/appointments/{id}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Appointment ID")),
    request_body = UpdateAppointment,
    responses(
        (status = 200, description = "Appointment updated", body = AppointmentView),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Appointment changed concurrently")
    )
)]
pub async fn update_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateAppointment>,
) -> AppResult<Json<AppointmentView>> {
    claims.require_admin()?;
    let view = state.services.appointments.update(id, &data).await?;
    Ok(Json(view))
}

/// Cancel an appointment (admin)
#[utoipa::path(
    post,
    path = "/appointments/{id}/cancel",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment cancelled", body = AppointmentView),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn cancel_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<AppointmentView>> {
    claims.require_admin()?;
    let view = state.services.appointments.cancel(id).await?;
    Ok(Json(view))
}

/// Delete an appointment (admin)
#[utoipa::path(
    delete,
    path = "/appointments/{id}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Appointment ID")),
    responses(
        (status = 204, description = "Appointment deleted"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn delete_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.appointments.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Run a reconciliation sweep now (admin)
#[utoipa::path(
    post,
    path = "/appointments/reconcile",
    tag = "appointments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sweep report", body = SweepReport),
        (status = 403, description = "Admin only")
    )
)]
pub async fn reconcile_now(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<SweepReport>> {
    claims.require_admin()?;
    let report = state.services.reconciler.sweep(SweepTrigger::Manual).await;
    Ok(Json(report))
}

/// Counts per display status and completed revenue (admin)
#[utoipa::path(
    get,
    path = "/appointments/summary",
    tag = "appointments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Appointment summary", body = AppointmentSummary),
        (status = 403, description = "Admin only")
    )
)]
pub async fn appointment_summary(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<AppointmentSummary>> {
    claims.require_admin()?;
    let summary = state.services.appointments.summary().await?;
    Ok(Json(summary))
}
