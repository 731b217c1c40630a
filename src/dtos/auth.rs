use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::auth::actor::Role;
use crate::error::AppError;

#[derive(Deserialize)]
pub struct RegisterUserRequest {
    pub name: String,
    pub username: String,
    pub password: String,
    /// Defaults to `USER`; the bootstrap account is always `ADMIN`.
    pub role: Option<Role>,
}

impl RegisterUserRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Name required"));
        }
        if self.username.trim().is_empty() {
            return Err(AppError::validation("Username required"));
        }
        if self.password.len() < 6 {
            return Err(AppError::validation("Password too short"));
        }
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in_seconds: i64,
    pub user: UserResponse,
}
