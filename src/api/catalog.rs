//! Service catalog endpoints (grooming services, day-care options)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        catalog::{UpsertDayCareOption, UpsertGroomingService},
        DayCareOption, DayCareType, GroomingService,
    },
};

use super::AuthenticatedUser;

/// Grooming service with its display duration
#[derive(Serialize, ToSchema)]
pub struct GroomingServiceResponse {
    #[serde(flatten)]
    pub service: GroomingService,
    /// Duration in whole hours, e.g. "2 hours"
    pub duration_label: String,
}

impl From<GroomingService> for GroomingServiceResponse {
    fn from(service: GroomingService) -> Self {
        Self {
            duration_label: service.duration_label(),
            service,
        }
    }
}

// ---- Grooming services ----

/// List grooming services
#[utoipa::path(
    get,
    path = "/services",
    tag = "catalog",
    responses(
        (status = 200, description = "Grooming services", body = Vec<GroomingServiceResponse>)
    )
)]
pub async fn list_services(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<GroomingServiceResponse>>> {
    let services = state.services.catalog.list_grooming_services().await?;
    Ok(Json(services.into_iter().map(Into::into).collect()))
}

/// Create a grooming service
#[utoipa::path(
    post,
    path = "/services",
    tag = "catalog",
    security(("bearer_auth" = [])),
    request_body = UpsertGroomingService,
    responses(
        (status = 201, description = "Service created", body = GroomingServiceResponse),
        (status = 400, description = "Invalid service"),
        (status = 409, description = "A service with this name already exists")
    )
)]
pub async fn create_service(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<UpsertGroomingService>,
) -> AppResult<(StatusCode, Json<GroomingServiceResponse>)> {
    claims.require_admin()?;
    let service = state.services.catalog.upsert_grooming_service(None, &data).await?;
    Ok((StatusCode::CREATED, Json(service.into())))
}

/// Update a grooming service
#[utoipa::path(
    put,
    path = "/services/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Service ID")),
    request_body = UpsertGroomingService,
    responses(
        (status = 200, description = "Service updated", body = GroomingServiceResponse),
        (status = 404, description = "Service not found"),
        (status = 409, description = "Another service has this name")
    )
)]
pub async fn update_service(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpsertGroomingService>,
) -> AppResult<Json<GroomingServiceResponse>> {
    claims.require_admin()?;
    let service = state.services.catalog.upsert_grooming_service(Some(id), &data).await?;
    Ok(Json(service.into()))
}

/// Delete a grooming service
#[utoipa::path(
    delete,
    path = "/services/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Service ID")),
    responses(
        (status = 204, description = "Service deleted"),
        (status = 404, description = "Service not found")
    )
)]
pub async fn delete_service(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.catalog.delete_grooming_service(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- Day-care options ----

/// List day-care options
#[utoipa::path(
    get,
    path = "/day-care-options",
    tag = "catalog",
    responses(
        (status = 200, description = "Day-care options", body = Vec<DayCareOption>)
    )
)]
pub async fn list_day_care_options(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<DayCareOption>>> {
    let options = state.services.catalog.list_day_care_options().await?;
    Ok(Json(options))
}

/// Create a day-care option
#[utoipa::path(
    post,
    path = "/day-care-options",
    tag = "catalog",
    security(("bearer_auth" = [])),
    request_body = UpsertDayCareOption,
    responses(
        (status = 201, description = "Option created", body = DayCareOption),
        (status = 409, description = "An option of this type already exists")
    )
)]
pub async fn create_day_care_option(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<UpsertDayCareOption>,
) -> AppResult<(StatusCode, Json<DayCareOption>)> {
    claims.require_admin()?;
    let option = state.services.catalog.upsert_day_care_option(&data, true).await?;
    Ok((StatusCode::CREATED, Json(option)))
}

/// Update a day-care option
#[utoipa::path(
    put,
    path = "/day-care-options/{type}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("type" = DayCareType, Path, description = "Day-care type (daily, longTerm)")),
    request_body = UpsertDayCareOption,
    responses(
        (status = 200, description = "Option updated", body = DayCareOption),
        (status = 404, description = "Option not found")
    )
)]
pub async fn update_day_care_option(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(care_type): Path<DayCareType>,
    Json(data): Json<UpsertDayCareOption>,
) -> AppResult<Json<DayCareOption>> {
    claims.require_admin()?;
    if data.care_type != care_type {
        return Err(AppError::BadRequest(format!(
            "Body type '{}' does not match path type '{}'",
            data.care_type, care_type
        )));
    }
    let option = state.services.catalog.upsert_day_care_option(&data, false).await?;
    Ok(Json(option))
}

/// Delete a day-care option
#[utoipa::path(
    delete,
    path = "/day-care-options/{type}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("type" = DayCareType, Path, description = "Day-care type (daily, longTerm)")),
    responses(
        (status = 204, description = "Option deleted"),
        (status = 404, description = "Option not found")
    )
)]
pub async fn delete_day_care_option(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(care_type): Path<DayCareType>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.catalog.delete_day_care_option(care_type).await?;
    Ok(StatusCode::NO_CONTENT)
}
