use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{fetch_page, push_page, push_search, search_pattern};
use crate::dtos::interaction::{InteractionDetail, InteractionListQuery};
use crate::dtos::non_blank;
use crate::dtos::pagination::Page;
use crate::error::AppError;

const FROM: &str = " FROM interactions x \
    JOIN medicines mf ON mf.id = x.medicine_from_id \
    JOIN medicines mt ON mt.id = x.medicine_to_id \
    WHERE 1=1";

fn filters(qb: &mut QueryBuilder<'_, Postgres>, q: &InteractionListQuery) {
    if let Some(pattern) = search_pattern(&q.search) {
        push_search(qb, &["mf.name", "mt.name", "x.description"], &pattern);
    }
    if let Some(severity) = non_blank(&q.severity) {
        qb.push(" AND x.severity = ").push_bind(severity);
    }
}

pub fn interactions_select(q: &InteractionListQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT x.*, mf.name AS medicine_from_name, mt.name AS medicine_to_name",
    );
    qb.push(FROM);
    filters(&mut qb, q);
    qb.push(" ORDER BY x.created_at DESC, x.id DESC");
    push_page(&mut qb, q.pagination());
    qb
}

pub async fn list_interactions(pool: &PgPool, q: &InteractionListQuery) -> Result<Page<InteractionDetail>, AppError> {
    let mut count = QueryBuilder::new("SELECT COUNT(*)");
    count.push(FROM);
    filters(&mut count, q);
    fetch_page(pool, count, interactions_select(q), q.pagination()).await
}
