use serde_json::Value as JsonValue;

use supabase_rest_core::{SupabaseError, SupabaseResult};

use crate::builder::QueryBuilder;
use crate::clause::{Filter, JoinSpec};

/// Declarative description of a query, routed through [`QueryBuilder`].
///
/// `joins` and `filters` are optional, but when present they must be
/// non-empty. A missing `from` falls back to the accessor's table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomQuery {
    pub select: Option<String>,
    pub from: Option<String>,
    pub joins: Option<Vec<JoinSpec>>,
    pub filters: Option<Vec<Filter>>,
    pub limit: Option<u64>,
    pub order: Option<String>,
    pub range: Option<String>,
}

impl CustomQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.from = Some(table.into());
        self
    }

    pub fn join(mut self, join: JoinSpec) -> Self {
        self.joins.get_or_insert_with(Vec::new).push(join);
        self
    }

    /// Add a `column=expression` filter (expression like `eq.1`).
    pub fn filter(mut self, column: impl Into<String>, expression: impl Into<String>) -> Self {
        self.filters
            .get_or_insert_with(Vec::new)
            .push(Filter::raw(column, expression));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }

    /// Check the shape of `joins` and `filters`.
    pub fn validate(&self) -> SupabaseResult<()> {
        if let Some(ref joins) = self.joins {
            if joins.is_empty() {
                return Err(SupabaseError::config("join argument must not be empty"));
            }
            for join in joins {
                if join.table.trim().is_empty() || join.key.trim().is_empty() {
                    return Err(SupabaseError::config(
                        "join argument entries need a non-empty table and key",
                    ));
                }
            }
        }
        if let Some(ref filters) = self.filters {
            if filters.is_empty() {
                return Err(SupabaseError::config("where argument must not be empty"));
            }
            if filters.iter().any(|f| f.column.trim().is_empty()) {
                return Err(SupabaseError::config(
                    "where argument entries need a non-empty column",
                ));
            }
        }
        Ok(())
    }

    /// Validate and turn into a builder, using `default_table` when `from` is unset.
    pub fn into_builder(self, default_table: &str) -> SupabaseResult<QueryBuilder> {
        self.validate()?;

        let mut qb = QueryBuilder::new();
        if let Some(ref select) = self.select {
            qb = qb.select(select);
        }
        if let Some(ref from) = self.from {
            qb = qb.from(from);
        }
        qb = qb.from_or(default_table);
        for join in self.joins.into_iter().flatten() {
            qb = qb.join(join);
        }
        for filter in self.filters.into_iter().flatten() {
            qb = qb.filter_by(filter);
        }
        if let Some(ref order) = self.order {
            qb = qb.order(order);
        }
        if let Some(limit) = self.limit {
            qb = qb.limit(limit);
        }
        if let Some(ref range) = self.range {
            qb = qb.range(range);
        }
        Ok(qb)
    }
}

/// Accepts the loosely-shaped JSON form:
///
/// ```json
/// {
///   "select": "id,name",
///   "from": "cities",
///   "join": [{"table": "countries", "key": "country_id", "select": "name"}],
///   "where": {"population": "gt.1000"},
///   "limit": 10,
///   "order": "name.asc",
///   "range": "0-9"
/// }
/// ```
///
/// Every malformed argument is reported by name before any request is made.
impl TryFrom<&JsonValue> for CustomQuery {
    type Error = SupabaseError;

    fn try_from(value: &JsonValue) -> SupabaseResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| SupabaseError::config("query must be an object"))?;

        let query = CustomQuery {
            select: string_arg(obj.get("select"), "select")?,
            from: string_arg(obj.get("from"), "from")?,
            joins: obj.get("join").map(parse_joins).transpose()?,
            filters: obj.get("where").map(parse_filters).transpose()?,
            limit: obj.get("limit").map(parse_limit).transpose()?,
            order: string_arg(obj.get("order"), "order")?,
            range: string_arg(obj.get("range"), "range")?,
        };
        query.validate()?;
        Ok(query)
    }
}

impl TryFrom<JsonValue> for CustomQuery {
    type Error = SupabaseError;

    fn try_from(value: JsonValue) -> SupabaseResult<Self> {
        CustomQuery::try_from(&value)
    }
}

fn string_arg(value: Option<&JsonValue>, name: &str) -> SupabaseResult<Option<String>> {
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(SupabaseError::config(format!("{} argument must be a string", name))),
    }
}

fn parse_joins(value: &JsonValue) -> SupabaseResult<Vec<JoinSpec>> {
    let malformed = || {
        SupabaseError::config("join argument must be a non-empty list of {table, key, select?} objects")
    };
    let items = value.as_array().ok_or_else(malformed)?;
    if items.is_empty() {
        return Err(malformed());
    }
    items
        .iter()
        .map(|item| serde_json::from_value::<JoinSpec>(item.clone()).map_err(|_| malformed()))
        .collect()
}

fn parse_filters(value: &JsonValue) -> SupabaseResult<Vec<Filter>> {
    let malformed = || {
        SupabaseError::config("where argument must be a non-empty mapping of column to operator expression")
    };
    let map = value.as_object().ok_or_else(malformed)?;
    if map.is_empty() {
        return Err(malformed());
    }
    map.iter()
        .map(|(column, expr)| {
            expr.as_str()
                .map(|e| Filter::raw(column.as_str(), e))
                .ok_or_else(malformed)
        })
        .collect()
}

fn parse_limit(value: &JsonValue) -> SupabaseResult<u64> {
    match value {
        JsonValue::Number(n) => n.as_u64(),
        JsonValue::String(s) => s.parse().ok(),
        _ => None,
    }
    .ok_or_else(|| SupabaseError::config("limit argument must be a non-negative integer"))
}
