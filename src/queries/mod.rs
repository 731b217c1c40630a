//! Read-side listings. These run straight against the pool with the
//! database's default isolation; nothing here mutates.
pub mod catalog;
pub mod interactions;
pub mod inventory;
pub mod sales;

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::dtos::pagination::{Page, Pagination};
use crate::error::AppError;

/// `%term%` for ILIKE, with wildcard characters in the input escaped.
pub(crate) fn search_pattern(search: &Option<String>) -> Option<String> {
    let term = search.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    Some(escaped)
}

/// Appends `(col1 ILIKE $n OR col2 ILIKE $n+1 ...)`.
pub(crate) fn push_search(qb: &mut QueryBuilder<'_, Postgres>, columns: &[&str], pattern: &str) {
    qb.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(*column).push(" ILIKE ").push_bind(pattern.to_string());
    }
    qb.push(")");
}

pub(crate) fn push_page(qb: &mut QueryBuilder<'_, Postgres>, p: Pagination) {
    qb.push(" LIMIT ").push_bind(p.limit).push(" OFFSET ").push_bind(p.offset());
}

pub(crate) async fn fetch_page<T>(
    pool: &PgPool,
    mut count: QueryBuilder<'_, Postgres>,
    mut select: QueryBuilder<'_, Postgres>,
    p: Pagination,
) -> Result<Page<T>, AppError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;
    let data = select.build_query_as::<T>().fetch_all(pool).await?;
    Ok(Page::new(data, total, p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_pattern_escapes_wildcards() {
        assert_eq!(search_pattern(&Some("para".into())).as_deref(), Some("%para%"));
        assert_eq!(search_pattern(&Some("10%_off".into())).as_deref(), Some("%10\\%\\_off%"));
        assert_eq!(search_pattern(&Some("   ".into())), None);
        assert_eq!(search_pattern(&None), None);
    }

    #[test]
    fn search_binds_one_parameter_per_column() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM t WHERE 1=1");
        push_search(&mut qb, &["a", "b"], "%x%");
        assert_eq!(qb.sql(), "SELECT 1 FROM t WHERE 1=1 AND (a ILIKE $1 OR b ILIKE $2)");
    }
}
