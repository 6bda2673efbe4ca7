//! PostgREST query-string rendering.
//!
//! Queries are kept as unencoded `key=value` parameters. [`render_params`]
//! gives the readable PostgREST form, where a `%` or `_` inside a `like`
//! value keeps its wildcard meaning. [`encode_params`] percent-encodes the
//! same parameters for the request URI, and the server decodes them back to
//! the readable form.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::clause::{Filter, JoinSpec};

/// Default select list.
pub const SELECT_ALL: &str = "*";

/// Escaped in query keys and values. `,` `(` `)` `*` `.` `:` stay literal
/// since PostgREST reads them as grammar.
const QUERY_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// One unencoded `key=value` query parameter.
pub type QueryParam = (String, String);

/// `table(key,columns)`; columns default to `*`.
pub fn join_fragment(table: &str, key: &str, select: Option<&str>) -> String {
    format!("{}({},{})", table, key, select.unwrap_or(SELECT_ALL))
}

/// `eq.<value>`
pub fn eq_expression(value: impl fmt::Display) -> String {
    format!("eq.{}", value)
}

/// `like.%<value>%`
pub fn like_expression(value: impl fmt::Display) -> String {
    format!("like.%{}%", value)
}

fn param(key: impl Into<String>, value: impl Into<String>) -> QueryParam {
    (key.into(), value.into())
}

/// `select=*`
pub fn select_all_params() -> Vec<QueryParam> {
    vec![param("select", SELECT_ALL)]
}

/// `select=*`, `column=eq.value`
pub fn find_by_params(column: &str, value: impl fmt::Display) -> Vec<QueryParam> {
    vec![param("select", SELECT_ALL), param(column, eq_expression(value))]
}

/// `select=*`, `column=like.%value%`
pub fn find_by_like_params(column: &str, value: impl fmt::Display) -> Vec<QueryParam> {
    vec![param("select", SELECT_ALL), param(column, like_expression(value))]
}

/// `select=*,table(key,*)`
pub fn join_params(table: &str, key: &str) -> Vec<QueryParam> {
    vec![param(
        "select",
        format!("{},{}", SELECT_ALL, join_fragment(table, key, None)),
    )]
}

/// `primary_key=eq.id`, the filter used by update and delete.
pub fn primary_key_param(primary_key: &str, id: impl fmt::Display) -> QueryParam {
    param(primary_key, eq_expression(id))
}

/// `select=*&column=eq.value`
pub fn find_by_query(column: &str, value: impl fmt::Display) -> String {
    render_params(&find_by_params(column, value))
}

/// `select=*&column=like.%value%`
pub fn find_by_like_query(column: &str, value: impl fmt::Display) -> String {
    render_params(&find_by_like_params(column, value))
}

/// `select=*,table(key,*)`
pub fn join_query(table: &str, key: &str) -> String {
    render_params(&join_params(table, key))
}

/// `primary_key=eq.id`
pub fn primary_key_filter(primary_key: &str, id: impl fmt::Display) -> String {
    let (key, value) = primary_key_param(primary_key, id);
    format!("{}={}", key, value)
}

/// Readable query string: `key=value` pairs joined by `&`, nothing escaped.
pub fn render_params(params: &[QueryParam]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// Query string for the request URI, with keys and values percent-encoded.
pub fn encode_params(params: &[QueryParam]) -> String {
    params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, QUERY_ENCODE_SET),
                utf8_percent_encode(value, QUERY_ENCODE_SET)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Table endpoint with an optional query string.
pub fn table_endpoint(table: &str, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("{}?{}", table, q),
        _ => table.to_string(),
    }
}

/// Parameters in the fixed clause order:
/// select, joins (comma-appended to select), filters, order, limit.
pub fn query_params(
    select: &str,
    joins: &[JoinSpec],
    filters: &[Filter],
    order: Option<&str>,
    limit: Option<u64>,
) -> Vec<QueryParam> {
    let mut select_list = vec![select.to_string()];
    select_list.extend(joins.iter().map(JoinSpec::render));

    let mut params = vec![param("select", select_list.join(","))];
    params.extend(filters.iter().map(Filter::param));

    if let Some(order) = order {
        params.push(param("order", order));
    }
    if let Some(limit) = limit {
        params.push(param("limit", limit.to_string()));
    }

    params
}

/// Render a full query string in the fixed clause order.
pub fn render_query_string(
    select: &str,
    joins: &[JoinSpec],
    filters: &[Filter],
    order: Option<&str>,
    limit: Option<u64>,
) -> String {
    render_params(&query_params(select, joins, filters, order, limit))
}
