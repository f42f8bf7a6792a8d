//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{attendance, auth, biometric, equipment, health, laboratories, schedules, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tabetala API",
        version = "0.1.0",
        description = "Laboratory Management System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        auth::forgot_password,
        auth::reset_password,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::toggle_user,
        users::delete_user,
        biometric::lookup,
        // Laboratories
        laboratories::list_laboratories,
        laboratories::get_laboratory,
        laboratories::create_laboratory,
        laboratories::update_laboratory,
        laboratories::delete_laboratory,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        // Schedules
        schedules::list_schedules,
        schedules::get_schedule,
        schedules::create_schedule,
        schedules::update_schedule,
        schedules::delete_schedule,
        // Attendance
        attendance::record_attendance,
        attendance::list_attendance,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::ForgotPasswordRequest,
            auth::ForgotPasswordResponse,
            auth::ResetPasswordRequest,
            // Users
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::user::ToggleUser,
            users::UsersResponse,
            users::UserResponse,
            users::UserMessageResponse,
            biometric::BiometricUser,
            biometric::BiometricLookupResponse,
            // Laboratories
            crate::models::laboratory::Laboratory,
            crate::models::laboratory::CreateLaboratory,
            crate::models::laboratory::UpdateLaboratory,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::EquipmentDetails,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            // Schedules
            crate::models::schedule::Schedule,
            crate::models::schedule::ScheduleDetails,
            crate::models::schedule::ScheduleRequest,
            // Attendance
            crate::models::attendance::AttendanceLog,
            crate::models::attendance::AttendanceDetails,
            crate::models::attendance::RecordAttendance,
            crate::models::attendance::AttendanceResponse,
            // Enums
            crate::models::Role,
            crate::models::LabStatus,
            crate::models::EquipmentType,
            crate::models::EquipmentStatus,
            crate::models::VerificationMethod,
            crate::models::AttendanceAction,
            // Shared
            crate::api::MessageResponse,
            health::HealthResponse,
            crate::error::ErrorResponse,
            crate::error::ErrorCode,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication and password reset"),
        (name = "users", description = "User management"),
        (name = "laboratories", description = "Laboratory management"),
        (name = "equipment", description = "Equipment inventory"),
        (name = "schedules", description = "Laboratory schedules"),
        (name = "attendance", description = "Biometric attendance")
    )
)]
pub struct ApiDoc;

/// Registers the JWT bearer scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
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
