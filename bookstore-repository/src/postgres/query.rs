//! Shared paging and admin-search query construction.

use bookstore_shared::PageRequest;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder};

/// A paged `SELECT` over one table, optionally filtered by the admin search box.
pub(crate) struct PageQuery<'a> {
    pub table: &'static str,
    pub columns: &'static str,
    pub order_by: &'static str,
    /// Fields matched with `ILIKE` and the raw search term.
    pub search: Option<(&'static [&'static str], &'a str)>,
}

/// Wraps `term` for a substring `ILIKE`, escaping the pattern metacharacters.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_search_filter(
    builder: &mut QueryBuilder<'_, Postgres>,
    search: Option<(&'static [&'static str], &str)>,
) {
    let Some((fields, term)) = search else {
        return;
    };
    if fields.is_empty() {
        return;
    }

    let pattern = like_pattern(term.trim());
    builder.push(" WHERE (");
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            builder.push(" OR ");
        }
        builder.push(*field).push(" ILIKE ").push_bind(pattern.clone());
    }
    builder.push(")");
}

/// Runs the count and the page select for `query`.
pub(crate) async fn fetch_page(
    pool: &PgPool,
    query: PageQuery<'_>,
    request: PageRequest,
) -> Result<(Vec<PgRow>, u64), sqlx::Error> {
    let mut count = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", query.table));
    push_search_filter(&mut count, query.search);
    let total: i64 = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut select = QueryBuilder::<Postgres>::new(format!(
        "SELECT {} FROM {}",
        query.columns, query.table
    ));
    push_search_filter(&mut select, query.search);
    select
        .push(" ORDER BY ")
        .push(query.order_by)
        .push(" LIMIT ")
        .push_bind(request.limit())
        .push(" OFFSET ")
        .push_bind(request.offset());
    let rows = select.build().fetch_all(pool).await?;

    Ok((rows, u64::try_from(total).unwrap_or_default()))
}
