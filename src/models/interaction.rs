use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: i64,
    pub medicine_from_id: i64,
    pub medicine_to_id: i64,
    pub severity: String,
    pub description: String,
    pub recommendation: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Interaction {
    /// True when this row links `a` and `b` in either order.
    pub fn links(&self, a: i64, b: i64) -> bool {
        (self.medicine_from_id == a && self.medicine_to_id == b)
            || (self.medicine_from_id == b && self.medicine_to_id == a)
    }
}

#[derive(Debug, Clone)]
pub struct InteractionFields {
    pub medicine_from_id: i64,
    pub medicine_to_id: i64,
    pub severity: String,
    pub description: String,
    pub recommendation: Option<String>,
}
