use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use crate::auth::actor::ActorContext;
use crate::auth::jwt::verify_token;
use crate::state::AppState;

#[derive(Serialize)]
struct ErrorBody { error: String, code: &'static str }

pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let auth_header = match req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok()) {
        Some(h) => h,
        None => return unauthorized("Missing Authorization header"),
    };

    // Expect "Bearer <token>"
    let token = match auth_header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return unauthorized("Invalid Authorization format"),
    };

    let claims = match verify_token(token, &state.jwt_secret) {
        Ok(c) => c,
        Err(e) => return unauthorized(&e.to_string()),
    };

    req.extensions_mut().insert(ActorContext::new(claims.sub, claims.role, claims.username));

    next.run(req).await
}

/// Attaches the actor when a valid token is present, without rejecting anonymous calls.
pub async fn optional_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let actor = req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .and_then(|t| verify_token(t, &state.jwt_secret).ok())
        .map(|c| ActorContext::new(c.sub, c.role, c.username));

    if let Some(actor) = actor {
        req.extensions_mut().insert(actor);
    }

    next.run(req).await
}

fn unauthorized(msg: &str) -> Response {
    let body = axum::Json(ErrorBody { error: msg.to_string(), code: "unauthorized" });
    (StatusCode::UNAUTHORIZED, body).into_response()
}
