//! Router tests that never reach the database: the pool connects lazily and
//! every request below is answered by an extractor or an input check first.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use sqlx::mysql::MySqlPoolOptions;
use tower::ServiceExt;

use gearguard_server::{
    api,
    config::{AppConfig, RunEnvironment},
    models::{enums::UserRole, user::UserClaims},
    repository::Repository,
    services::Services,
    AppState,
};

const SECRET: &str = "router-test-secret";

fn app_with(environment: RunEnvironment) -> Router {
    let mut config = AppConfig::default();
    config.server.environment = environment;
    config.auth.jwt_secret = SECRET.to_string();
    config.auth.bcrypt_cost = 4;
    config.database.min_connections = 0;

    let pool = MySqlPoolOptions::new()
        .min_connections(0)
        .connect_lazy_with(config.database.connect_options());
    let services = Services::new(Repository::new(pool), config.auth.clone());
    api::create_router(AppState::new(config, services))
}

fn app() -> Router {
    app_with(RunEnvironment::Development)
}

fn token(user_id: i32, role: UserRole) -> String {
    let now = Utc::now().timestamp();
    UserClaims {
        sub: format!("user{}@example.com", user_id),
        user_id,
        role,
        iat: now,
        exp: now + 3600,
    }
    .create_token(SECRET)
    .unwrap()
}

fn json_request(method: Method, uri: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn ping_answers_without_database() {
    let (status, body) = send(app(), get("/ping", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn system_reports_environment() {
    let (status, body) = send(app(), get("/system", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["environment"], "development");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn protected_route_requires_token() {
    let (status, body) = send(app(), get("/api/equipment", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn malformed_and_foreign_tokens_are_rejected() {
    let (status, _) = send(app(), get("/api/requests/kanban", Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let now = Utc::now().timestamp();
    let foreign = UserClaims {
        sub: "intruder@example.com".to_string(),
        user_id: 1,
        role: UserRole::Admin,
        iat: now,
        exp: now + 3600,
    }
    .create_token("some-other-secret")
    .unwrap();
    let (status, _) = send(app(), get("/api/dashboard/stats", Some(&foreign))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn basic_auth_header_is_not_accepted() {
    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, "Basic YWRtaW46YWRtaW4=")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_rejects_invalid_email() {
    let request = json_request(
        Method::POST,
        "/api/auth/signup",
        None,
        json!({"email": "not-an-email", "password": "Str0ng!pass", "name": "Ada"}),
    );
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn signup_rejects_weak_password() {
    let request = json_request(
        Method::POST,
        "/api/auth/signup",
        None,
        json!({"email": "ada@example.com", "password": "password1", "name": "Ada"}),
    );
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn signup_cannot_claim_admin_role() {
    let request = json_request(
        Method::POST,
        "/api/auth/signup",
        None,
        json!({"email": "ada@example.com", "password": "Str0ng!pass", "name": "Ada", "role": "admin"}),
    );
    let (status, _) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn unknown_stage_is_a_bad_request() {
    let token = token(7, UserRole::Technician);
    let request = json_request(
        Method::PATCH,
        "/api/requests/1/stage",
        Some(&token),
        json!({"stage": "done"}),
    );
    let (status, _) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn preventive_request_needs_a_schedule() {
    let token = token(7, UserRole::Manager);
    let request = json_request(
        Method::POST,
        "/api/requests",
        Some(&token),
        json!({"subject": "Quarterly inspection", "request_type": "preventive"}),
    );
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("scheduled"));
}

#[tokio::test]
async fn calendar_rejects_inverted_range() {
    let token = token(7, UserRole::Manager);
    let uri = "/api/requests/calendar?start=2025-06-30&end=2025-06-01";
    let (status, _) = send(app(), get(uri, Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deactivating_users_needs_admin() {
    let token = token(7, UserRole::Manager);
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/users/9")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn admin_cannot_deactivate_self() {
    let token = token(3, UserRole::Admin);
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/users/3")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_route_uses_error_envelope() {
    let (status, body) = send(app(), get("/api/nowhere", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn dashboard_test_routes_only_in_development() {
    let (status, _) = send(
        app_with(RunEnvironment::Production),
        get("/api/dashboard-test/stats", None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (status, body) = send(app(), get("/api-docs/openapi.json", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "GearGuard API");
}

#[tokio::test]
async fn non_numeric_path_id_uses_error_envelope() {
    let token = token(7, UserRole::Manager);
    let (status, body) = send(app(), get("/api/equipment/abc", Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn non_numeric_member_id_uses_error_envelope() {
    let token = token(7, UserRole::Manager);
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/teams/1/members/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn bad_query_value_uses_error_envelope() {
    let token = token(7, UserRole::Manager);
    let (status, body) = send(app(), get("/api/equipment?page=x", Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["message"].is_string());
}
