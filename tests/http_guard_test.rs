//! Request guards that answer before any query runs: JSON content type,
//! bearer parsing and signature checks, unknown routes.
//!
//! The pool is lazy and points nowhere; a test that reaches the database fails.

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;

use roadfix::auth::rate_limit::LoginLimiter;
use roadfix::auth::token::{Role, TokenKeys};
use roadfix::config::MediaConfig;
use roadfix::handlers;
use roadfix::media::MediaClient;

const SECRET: &str = "guard-test-secret-0123456789abcdefgh";

macro_rules! guard_app {
    () => {{
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .expect("lazy pool");
        test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .app_data(web::Data::new(TokenKeys::new(SECRET, 3600)))
                .app_data(web::Data::new(LoginLimiter::default()))
                .app_data(web::Data::new(MediaClient::new(MediaConfig::default()).unwrap()))
                .configure(handlers::configure)
                .default_service(web::to(handlers::not_found)),
        )
        .await
    }};
}

#[actix_web::test]
async fn missing_bearer_header_is_401() {
    let app = guard_app!();
    for uri in ["/api/user/profile", "/api/supervisor/complaints", "/api/admin/supervisors", "/api/mayor/reports", "/api/auth/me"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Authentication required");
    }
}

#[actix_web::test]
async fn malformed_or_foreign_tokens_are_401() {
    let app = guard_app!();
    let foreign = TokenKeys::new("some-other-secret-0123456789abcdefgh", 3600)
        .issue(Role::Admin, "admin")
        .unwrap()
        .token;
    let expired = TokenKeys::new(SECRET, -3600).issue(Role::Admin, "admin").unwrap().token;

    for auth in [
        "Bearer not-a-jwt".to_string(),
        format!("Basic {foreign}"),
        format!("Bearer {foreign}"),
        format!("Bearer {expired}"),
    ] {
        let req = test::TestRequest::get()
            .uri("/api/admin/supervisors")
            .insert_header((header::AUTHORIZATION, auth.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{auth}");
    }
}

#[actix_web::test]
async fn non_json_mutation_is_rejected_before_auth() {
    let app = guard_app!();
    let req = test::TestRequest::post()
        .uri("/api/admin/complaints/1/assign")
        .insert_header((header::CONTENT_TYPE, "text/plain"))
        .set_payload("supervisor_id=SUP-1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("application/json"));
}

#[actix_web::test]
async fn bodiless_mutation_skips_the_content_type_check() {
    let app = guard_app!();
    // No body, no content type: the JSON guard lets it through and auth answers.
    let req = test::TestRequest::post().uri("/api/auth/logout").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn invalid_login_body_is_400_json() {
    let app = guard_app!();
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"role": "wizard", "identifier": "x", "password": "y"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[actix_web::test]
async fn signup_validation_happens_before_the_database() {
    let app = guard_app!();
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({
            "name": "A",
            "email": "not-an-email",
            "password": "short",
            "pincode": "12ab"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Validation failed");
    let details = body["details"].as_str().unwrap();
    assert!(details.contains("Pincode"));
    assert!(details.contains("Password"));
}

#[actix_web::test]
async fn unknown_route_is_json_404() {
    let app = guard_app!();
    let req = test::TestRequest::get().uri("/nowhere").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Not found");
}
