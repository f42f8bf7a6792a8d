//! API handlers for Tabetala REST endpoints

pub mod access;
pub mod attendance;
pub mod auth;
pub mod biometric;
pub mod equipment;
pub mod extract;
pub mod health;
pub mod laboratories;
pub mod openapi;
pub mod schedules;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware,
    routing::{get, patch, post},
    Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::ToSchema;

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Plain confirmation message
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Decode the bearer token of a request
pub(crate) fn bearer_claims(headers: &HeaderMap, secret: &str) -> Result<UserClaims, AppError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

    UserClaims::from_token(token, secret).map_err(|e| AppError::Authentication(e.to_string()))
}

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Already verified by the access middleware
        if let Some(claims) = parts.extensions.get::<UserClaims>() {
            return Ok(AuthenticatedUser(claims.clone()));
        }

        bearer_claims(&parts.headers, &state.config.auth.jwt_secret).map(AuthenticatedUser)
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .route("/users/:id/toggle", patch(users::toggle_user))
        .route("/biometric", get(biometric::lookup))
        // Laboratories
        .route(
            "/laboratories",
            get(laboratories::list_laboratories).post(laboratories::create_laboratory),
        )
        .route(
            "/laboratories/:id",
            get(laboratories::get_laboratory)
                .put(laboratories::update_laboratory)
                .delete(laboratories::delete_laboratory),
        )
        // Equipment
        .route("/equipment", get(equipment::list_equipment).post(equipment::create_equipment))
        .route(
            "/equipment/:id",
            get(equipment::get_equipment)
                .put(equipment::update_equipment)
                .delete(equipment::delete_equipment),
        )
        // Schedules
        .route("/schedules", get(schedules::list_schedules).post(schedules::create_schedule))
        .route(
            "/schedules/:id",
            get(schedules::get_schedule)
                .put(schedules::update_schedule)
                .delete(schedules::delete_schedule),
        )
        // Attendance
        .route(
            "/attendance",
            get(attendance::list_attendance).post(attendance::record_attendance),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), access::require_capability))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
