//! API handlers for GearGuard REST endpoints

pub mod auth;
pub mod dashboard;
pub mod equipment;
pub mod health;
pub mod openapi;
pub mod requests;
pub mod teams;
pub mod users;
pub mod work_centers;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use validator::{Validate, ValidationErrors};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(format!("Invalid or expired token: {}", e)))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// JSON body that must also pass its `validator` rules
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value
            .validate()
            .map_err(|errors| AppError::Validation(validation_message(&errors)))?;
        Ok(ValidatedJson(value))
    }
}

/// Path parameters whose rejection is answered with the error envelope
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(ApiPath(value))
    }
}

/// Query string whose rejection is answered with the error envelope
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(ApiQuery(value))
    }
}

/// Flatten field errors into `field: message; field: message`
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .map(|(field, errs)| {
            let messages: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Success envelope: `{status: "success", data?, message?}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            status: "success",
            data: Some(data),
            message: None,
        })
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            status: "success",
            data: Some(data),
            message: Some(message.into()),
        })
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            status: "success",
            data: None,
            message: Some(message.into()),
        })
    }
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut api_routes = Router::new()
        // Authentication
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/auth/me", get(auth::me))
        // Equipment
        .route("/equipment", get(equipment::list_equipment).post(equipment::create_equipment))
        .route("/equipment/meta/categories", get(equipment::list_categories))
        .route("/equipment/meta/departments", get(equipment::list_departments))
        .route(
            "/equipment/:id",
            get(equipment::get_equipment)
                .put(equipment::update_equipment)
                .delete(equipment::delete_equipment),
        )
        // Teams
        .route("/teams", get(teams::list_teams).post(teams::create_team))
        .route(
            "/teams/:id",
            get(teams::get_team).put(teams::update_team).delete(teams::delete_team),
        )
        .route("/teams/:id/members", post(teams::add_member))
        .route("/teams/:id/members/:member_id", delete(teams::remove_member))
        .route("/teams/:id/available-users", get(teams::available_users))
        // Maintenance requests
        .route("/requests", post(requests::create_request))
        .route("/requests/kanban", get(requests::kanban))
        .route("/requests/calendar", get(requests::calendar))
        .route(
            "/requests/:id",
            get(requests::get_request)
                .put(requests::update_request)
                .delete(requests::delete_request),
        )
        .route("/requests/:id/stage", patch(requests::change_stage))
        .route("/requests/:id/history", get(requests::stage_history))
        // Work centers
        .route(
            "/work-centers",
            get(work_centers::list_work_centers).post(work_centers::create_work_center),
        )
        .route(
            "/work-centers/:id",
            get(work_centers::get_work_center)
                .put(work_centers::update_work_center)
                .delete(work_centers::delete_work_center),
        )
        // Dashboard
        .route("/dashboard/stats", get(dashboard::stats))
        .route("/dashboard/recent-requests", get(dashboard::recent_requests))
        .route("/dashboard/upcoming-maintenance", get(dashboard::upcoming_maintenance))
        // Users
        .route("/users", get(users::list_users))
        .route("/users/technicians", get(users::list_technicians))
        .route("/users/:id", delete(users::deactivate_user));

    if state.config.server.environment.is_development() {
        api_routes = api_routes
            .route("/dashboard-test/stats", get(dashboard::stats_unauthenticated))
            .route(
                "/dashboard-test/recent-requests",
                get(dashboard::recent_requests_unauthenticated),
            )
            .route(
                "/dashboard-test/upcoming-maintenance",
                get(dashboard::upcoming_maintenance_unauthenticated),
            );
    }

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ping", get(health::ping))
        .route("/system", get(health::system_info))
        .nest("/api", api_routes)
        .merge(openapi::create_openapi_router())
        .fallback(route_not_found)
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(range(min = 0))]
        capacity: i32,
    }

    #[test]
    fn validation_messages_are_sorted_by_field() {
        let errors = Sample {
            name: String::new(),
            capacity: -1,
        }
        .validate()
        .unwrap_err();
        assert_eq!(validation_message(&errors), "capacity: range; name: Name is required");
    }

    #[test]
    fn envelope_omits_absent_parts() {
        let Json(body) = ApiResponse::ok(5);
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "data": 5}));

        let Json(body) = ApiResponse::message("done");
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "message": "done"}));
    }
}
