use sqlx::QueryBuilder;

use crate::{
    error::Result,
    filter::push_filters,
    Batch, ChosenDB, ChosenRow, ListingParams,
};

/// Table specific part of listing query
pub(crate) struct ListingSource<'a> {
    pub table: &'a str,
    pub columns: &'a str,
    pub sortable: &'a [&'a str],
    pub filterable: &'a [&'a str],
}

/// Runs count and page select for given listing parameters
pub(crate) async fn list_batch<'c, E, T>(
    executor: E,
    source: ListingSource<'_>,
    params: ListingParams,
) -> Result<Batch<T>>
where
    E: sqlx::Executor<'c, Database = ChosenDB> + Copy,
    T: for<'r> sqlx::FromRow<'r, ChosenRow> + Send + Unpin,
{
    let ordering = params.ordering(source.sortable)?;
    params.check_filters(source.filterable)?;

    let mut count_query =
        QueryBuilder::<ChosenDB>::new(format!("SELECT count(*) FROM {}", source.table));
    push_filters(&mut count_query, &params.filters);
    let total: i64 = count_query
        .build_query_scalar()
        .fetch_one(executor)
        .await?;

    let limit = params.limit.clamp(0, crate::MAX_LIMIT as i64);
    let mut query = QueryBuilder::<ChosenDB>::new(format!(
        "SELECT {} FROM {}",
        source.columns, source.table
    ));
    push_filters(&mut query, &params.filters);
    query.push(" ORDER BY ");
    query.push(ordering);
    query.push(" LIMIT ");
    query.push_bind(limit);
    query.push(" OFFSET ");
    query.push_bind(params.offset);

    let rows = query.build_query_as::<T>().fetch_all(executor).await?;
    tracing::debug!(
        table = source.table,
        total,
        returned = rows.len(),
        "Listed records"
    );

    Ok(Batch {
        offset: params.offset,
        limit,
        total: total.max(0) as u64,
        rows,
    })
}
