use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use pharmacy_backend::auth::actor::Role;
use pharmacy_backend::auth::jwt::sign_token;
use pharmacy_backend::build_app;
use pharmacy_backend::state::AppState;

const SECRET: &str = "router-test-secret";

// The pool never connects: every request below is answered before a query runs.
fn app() -> axum::Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://nobody@localhost:1/none")
        .unwrap();
    build_app(AppState::new(pool, SECRET))
}

async fn json_body(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_open() {
    let res = app()
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_token_is_rejected() {
    let res = app()
        .oneshot(Request::get("/api/medicines").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(res).await["code"], "unauthorized");
}

#[tokio::test]
async fn foreign_token_is_rejected() {
    let token = sign_token(1, Role::Admin, "admin", "some-other-secret").unwrap();
    let res = app()
        .oneshot(
            Request::post("/api/invoices")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"items":[]}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_bearer_scheme_is_rejected() {
    let res = app()
        .oneshot(
            Request::get("/api/inventory/logs")
                .header(header::AUTHORIZATION, "Basic YWRtaW46YWRtaW4=")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_token_reaches_request_validation() {
    let token = sign_token(3, Role::User, "counter", SECRET).unwrap();
    let res = app()
        .oneshot(
            Request::post("/api/invoices")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"items":[]}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await["code"], "validation_error");
}

#[tokio::test]
async fn zero_quantity_adjustment_is_a_bad_request() {
    let token = sign_token(2, Role::InventoryManager, "stock", SECRET).unwrap();
    let res = app()
        .oneshot(
            Request::post("/api/inventory/adjust")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"medicineId":1,"adjustType":"add","quantity":0}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
