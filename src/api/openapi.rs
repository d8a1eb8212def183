//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{appointments, catalog, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pet Shop API",
        version = "1.0.0",
        description = "Grooming and day-care appointments: booking, pricing and status tracking",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Catalog
        catalog::list_services,
        catalog::create_service,
        catalog::update_service,
        catalog::delete_service,
        catalog::list_day_care_options,
        catalog::create_day_care_option,
        catalog::update_day_care_option,
        catalog::delete_day_care_option,
        // Appointments
        appointments::list_appointments,
        appointments::my_appointments,
        appointments::book_appointment,
        appointments::get_appointment,
        appointments::update_appointment,
        appointments::cancel_appointment,
        appointments::delete_appointment,
        appointments::reconcile_now,
        appointments::appointment_summary,
    ),
    components(
        schemas(
            // Catalog
            catalog::GroomingServiceResponse,
            crate::models::catalog::GroomingService,
            crate::models::catalog::UpsertGroomingService,
            crate::models::catalog::DayCareOption,
            crate::models::catalog::UpsertDayCareOption,
            // Appointments
            crate::models::appointment::Appointment,
            crate::models::appointment::AppointmentView,
            crate::models::appointment::DayCareOptions,
            crate::models::appointment::DayCarePlan,
            crate::models::appointment::CreateAppointment,
            crate::models::appointment::UpdateAppointment,
            crate::models::appointment::AppointmentSummary,
            crate::models::user::MemberRef,
            crate::services::pricing::PriceBreakdown,
            // Enums
            crate::models::enums::AppointmentStatus,
            crate::models::enums::ResolvedStatus,
            crate::models::enums::PetType,
            crate::models::enums::DayCareType,
            // Reconciliation
            crate::services::reconciler::SweepReport,
            crate::services::reconciler::SweepFailure,
            crate::services::reconciler::SweepTrigger,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Grooming services and day-care options"),
        (name = "appointments", description = "Booking, editing and reconciliation of appointments")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_appointment_paths_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/appointments/{id}/cancel"));
        assert!(doc.paths.paths.contains_key("/day-care-options/{type}"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
