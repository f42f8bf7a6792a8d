//! Role-based access control for API routes
//!
//! Every role maps to a list of route prefixes it may use, either read-only
//! or with full access. Public routes skip the check entirely.

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};

use crate::{
    error::AppError,
    models::{user::UserClaims, Role},
    AppState,
};

use super::bearer_claims;

/// A route prefix a role may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    pub prefix: &'static str,
    pub read_only: bool,
}

const fn full(prefix: &'static str) -> Capability {
    Capability { prefix, read_only: false }
}

const fn read(prefix: &'static str) -> Capability {
    Capability { prefix, read_only: true }
}

const ADMIN: &[Capability] = &[full("/")];

const FACULTY: &[Capability] = &[
    read("/auth/me"),
    read("/schedules"),
    read("/attendance"),
    read("/laboratories"),
];

const CUSTODIAN: &[Capability] = &[
    read("/auth/me"),
    read("/laboratories"),
    read("/attendance"),
    read("/schedules"),
    full("/equipment"),
];

/// Routes reachable without a token
const PUBLIC_ROUTES: &[(&str, &str)] = &[
    ("GET", "/health"),
    ("GET", "/ready"),
    ("POST", "/auth/login"),
    ("POST", "/auth/forgot-password"),
    ("POST", "/auth/reset-password"),
    ("POST", "/attendance"),
    ("GET", "/biometric"),
];

const API_PREFIX: &str = "/api/v1";

pub fn capabilities(role: Role) -> &'static [Capability] {
    match role {
        Role::Admin => ADMIN,
        Role::Faculty => FACULTY,
        Role::Custodian => CUSTODIAN,
    }
}

/// Path relative to the API root
fn route_path(path: &str) -> &str {
    match path.strip_prefix(API_PREFIX) {
        Some("") => "/",
        Some(rest) if rest.starts_with('/') => rest,
        _ => path,
    }
}

/// Prefix match on whole path segments
fn matches_prefix(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    path == prefix
        || path
            .strip_prefix(prefix)
            .map(|rest| rest.starts_with('/'))
            .unwrap_or(false)
}

fn is_read(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS
}

pub fn is_public(method: &Method, path: &str) -> bool {
    let path = route_path(path);
    PUBLIC_ROUTES
        .iter()
        .any(|(m, route)| method.as_str() == *m && path == *route)
}

/// Whether `role` may call `method` on `path`
pub fn is_allowed(role: Role, method: &Method, path: &str) -> bool {
    let path = route_path(path);
    capabilities(role).iter().any(|cap| {
        matches_prefix(path, cap.prefix) && (!cap.read_only || is_read(method))
    })
}

/// Middleware: authenticate the bearer token and enforce the role's
/// capabilities. Verified claims are stored in the request extensions.
pub async fn require_capability(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    if is_public(&method, &path) {
        return Ok(next.run(request).await);
    }

    let claims: UserClaims = bearer_claims(request.headers(), &state.config.auth.jwt_secret)?;

    if !is_allowed(claims.role, &method, &path) {
        tracing::debug!(user_id = %claims.sub, role = %claims.role, %method, %path, "Access denied");
        return Err(AppError::Forbidden(
            "You do not have permission to access this resource".to_string(),
        ));
    }

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_can_do_everything() {
        assert!(is_allowed(Role::Admin, &Method::DELETE, "/users/user-1"));
        assert!(is_allowed(Role::Admin, &Method::POST, "/schedules"));
        assert!(is_allowed(Role::Admin, &Method::PUT, "/api/v1/equipment/ke-1"));
    }

    #[test]
    fn faculty_reads_schedules_labs_and_attendance_only() {
        assert!(is_allowed(Role::Faculty, &Method::GET, "/schedules"));
        assert!(is_allowed(Role::Faculty, &Method::GET, "/schedules/sched-1"));
        assert!(is_allowed(Role::Faculty, &Method::GET, "/attendance"));
        assert!(is_allowed(Role::Faculty, &Method::GET, "/laboratories/lab-1"));
        assert!(is_allowed(Role::Faculty, &Method::GET, "/auth/me"));

        assert!(!is_allowed(Role::Faculty, &Method::POST, "/schedules"));
        assert!(!is_allowed(Role::Faculty, &Method::GET, "/users"));
        assert!(!is_allowed(Role::Faculty, &Method::GET, "/equipment"));
    }

    #[test]
    fn custodian_manages_equipment() {
        assert!(is_allowed(Role::Custodian, &Method::POST, "/equipment"));
        assert!(is_allowed(Role::Custodian, &Method::DELETE, "/equipment/ke-1"));
        assert!(is_allowed(Role::Custodian, &Method::GET, "/schedules"));

        assert!(!is_allowed(Role::Custodian, &Method::PUT, "/laboratories/lab-1"));
        assert!(!is_allowed(Role::Custodian, &Method::GET, "/users/user-1"));
    }

    #[test]
    fn prefixes_match_whole_segments() {
        assert!(!is_allowed(Role::Faculty, &Method::GET, "/schedules-export"));
        assert!(!is_allowed(Role::Custodian, &Method::POST, "/equipmentx"));
        assert!(is_allowed(Role::Faculty, &Method::GET, "/api/v1/schedules"));
        assert!(!is_allowed(Role::Faculty, &Method::GET, "/api/v1x/schedules"));
    }

    #[test]
    fn public_routes_are_method_specific() {
        assert!(is_public(&Method::POST, "/attendance"));
        assert!(is_public(&Method::GET, "/api/v1/health"));
        assert!(is_public(&Method::GET, "/biometric"));
        assert!(!is_public(&Method::GET, "/attendance"));
        assert!(!is_public(&Method::GET, "/auth/me"));
    }
}
