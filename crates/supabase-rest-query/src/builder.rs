use std::fmt;

use serde_json::Value as JsonValue;
use tracing::debug;

use supabase_rest_core::{HttpMethod, RequestExecutor, SupabaseError, SupabaseResult};

use crate::clause::{Filter, FilterOperator, JoinSpec, OrderDirection};
use crate::postgrest::{self, QueryParam, SELECT_ALL};

/// Accumulates select/join/filter/order/limit/range clauses for one GET.
///
/// A value type: each clause method consumes the builder and returns it, and
/// the terminal [`execute`](Self::execute) consumes it for good.
///
/// # Example
/// ```ignore
/// let rows = QueryBuilder::new()
///     .select("id,name")
///     .from("cities")
///     .join(JoinSpec::new("countries", "country_id"))
///     .filter("population", "gt.100000")
///     .range("0-9")
///     .execute(&mut executor)
///     .await?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    select: Option<String>,
    from: Option<String>,
    joins: Vec<JoinSpec>,
    filters: Vec<Filter>,
    order: Option<String>,
    limit: Option<u64>,
    range: Option<String>,
}

/// A serialized query, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltQuery {
    pub table: String,
    /// Readable form, e.g. `select=*&name=like.%a%`.
    pub query_string: String,
    pub params: Vec<QueryParam>,
    /// Value for the `Range` header; never part of the query string.
    pub range: Option<String>,
}

impl BuiltQuery {
    /// `table?query` with the parameters percent-encoded.
    pub fn endpoint(&self) -> String {
        postgrest::table_endpoint(&self.table, Some(&postgrest::encode_params(&self.params)))
    }
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns to return. Defaults to `*`.
    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    /// Target table. Required before the query is built.
    pub fn from(mut self, table: &str) -> Self {
        self.from = Some(table.to_string());
        self
    }

    /// Embed a related resource.
    pub fn join(mut self, join: JoinSpec) -> Self {
        self.joins.push(join);
        self
    }

    /// Add a raw `column=expression` filter. Filters are ANDed in call order.
    pub fn filter(mut self, column: &str, expression: &str) -> Self {
        self.filters.push(Filter::raw(column, expression));
        self
    }

    /// Add a prepared filter.
    pub fn filter_by(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Filter: column = value
    pub fn eq(self, column: &str, value: impl fmt::Display) -> Self {
        self.filter_by(Filter::new(column, FilterOperator::Eq, value))
    }

    /// Filter: column LIKE %value%
    pub fn like(mut self, column: &str, value: impl fmt::Display) -> Self {
        self.filters
            .push(Filter::raw(column, postgrest::like_expression(value)));
        self
    }

    /// Raw order expression, e.g. `name.desc,id.asc`.
    pub fn order(mut self, order: &str) -> Self {
        self.order = Some(order.to_string());
        self
    }

    /// Order by one column. Replaces any earlier order.
    pub fn order_by(self, column: &str, direction: OrderDirection) -> Self {
        let order = format!("{}.{}", column, direction.as_str());
        self.order(&order)
    }

    /// Limit the number of rows returned.
    pub fn limit(mut self, count: u64) -> Self {
        self.limit = Some(count);
        self
    }

    /// Row window sent as the `Range` header, e.g. `0-9`.
    pub fn range(mut self, range: &str) -> Self {
        self.range = Some(range.to_string());
        self
    }

    /// Set the target table only if none was given.
    pub(crate) fn from_or(mut self, table: &str) -> Self {
        if self.from.is_none() {
            self.from = Some(table.to_string());
        }
        self
    }

    /// Serialize the clauses.
    ///
    /// Fails with a configuration error when no table was set.
    pub fn build(&self) -> SupabaseResult<BuiltQuery> {
        let table = self
            .from
            .as_deref()
            .ok_or_else(|| SupabaseError::config("table not defined"))?;

        let params = postgrest::query_params(
            self.select.as_deref().unwrap_or(SELECT_ALL),
            &self.joins,
            &self.filters,
            self.order.as_deref(),
            self.limit,
        );

        Ok(BuiltQuery {
            table: table.to_string(),
            query_string: postgrest::render_params(&params),
            params,
            range: self.range.clone(),
        })
    }

    /// Build and issue the GET through `executor`.
    ///
    /// A range is applied by setting the `Range` header on the executor,
    /// where it stays for later calls until overwritten or removed.
    pub async fn execute(self, executor: &mut RequestExecutor) -> SupabaseResult<JsonValue> {
        let built = self.build()?;

        if let Some(ref range) = built.range {
            executor.set_header("Range", range)?;
        }

        debug!(table = %built.table, query = %built.query_string, "Executing query");

        let uri = executor.uri(&built.endpoint());
        executor.execute(HttpMethod::Get, &uri, None).await
    }
}
