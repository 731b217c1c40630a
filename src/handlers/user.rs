use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::Json;
use bcrypt::{hash, verify, DEFAULT_COST};
use tracing::{info, instrument};

use crate::auth::actor::{ActorContext, Role};
use crate::auth::jwt::{sign_token, TOKEN_TTL_HOURS};
use crate::dtos::auth::{LoginRequest, LoginResponse, RegisterUserRequest, UserResponse};
use crate::error::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// Open while the users table is empty (the first account becomes ADMIN);
/// afterwards only an administrator may create accounts.
#[instrument(skip(state, actor, payload), fields(username = %payload.username))]
pub async fn register_user(
    State(state): State<AppState>,
    actor: Option<Extension<ActorContext>>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    payload.validate()?;

    let mut tx = state.db_pool.begin().await?;

    // Serializes concurrent bootstrap attempts.
    sqlx::query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
        .execute(&mut *tx)
        .await?;
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&mut *tx)
        .await?;

    let role = if existing == 0 {
        Role::Admin
    } else {
        let Some(Extension(actor)) = actor else {
            return Err(AppError::unauthorized("Registration requires an administrator token"));
        };
        actor.require_admin("register users")?;
        payload.role.unwrap_or(Role::User)
    };

    let password_hash = hash(&payload.password, DEFAULT_COST)
        .map_err(|e| AppError::internal(format!("Hash error: {e}")))?;

    let user = sqlx::query_as::<_, User>(
        r#"INSERT INTO users (name, username, password_hash, role)
           VALUES ($1, $2, $3, $4)
           RETURNING *"#,
    )
    .bind(payload.name.trim())
    .bind(payload.username.trim())
    .bind(&password_hash)
    .bind(role.as_str())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match AppError::db(e) {
        AppError::Conflict(_) => AppError::conflict("Username already exists"),
        other => other,
    })?;

    tx.commit().await?;
    info!(user_id = user.id, role = %role, "User registered");

    Ok((StatusCode::CREATED, Json(to_response(user))))
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::validation("Username required"));
    }
    if payload.password.is_empty() {
        return Err(AppError::validation("Password required"));
    }

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(payload.username.trim())
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

    if !user.is_active {
        return Err(AppError::forbidden("User inactive"));
    }

    let ok = verify(&payload.password, &user.password_hash)
        .map_err(|e| AppError::internal(format!("Password verify error: {e}")))?;
    if !ok {
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let role: Role = user.role.parse()?;
    let token = sign_token(user.id, role, &user.username, &state.jwt_secret)?;

    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "Bearer",
        expires_in_seconds: TOKEN_TTL_HOURS * 60 * 60,
        user: to_response(user),
    }))
}

pub async fn get_me(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
) -> Result<Json<UserResponse>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(actor.user_id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(to_response(user)))
}

fn to_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        name: user.name,
        username: user.username,
        role: user.role,
        is_active: user.is_active,
        created_at: user.created_at,
    }
}
