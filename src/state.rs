use std::sync::Arc;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(db_pool: PgPool, jwt_secret: impl Into<Arc<str>>) -> Self {
        Self { db_pool, jwt_secret: jwt_secret.into() }
    }
}
