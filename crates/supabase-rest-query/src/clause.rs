use std::fmt;

use serde::{Deserialize, Serialize};

use crate::postgrest::QueryParam;

/// PostgREST filter operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    ILike,
    Is,
    In,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::ILike => "ilike",
            Self::Is => "is",
            Self::In => "in",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `column=expression` filter.
///
/// The expression is the operator-prefixed value PostgREST expects
/// (`eq.5`, `like.%foo%`, ...). It is passed through unvalidated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub expression: String,
}

impl Filter {
    /// Build a filter from an operator and a value: `column=op.value`.
    pub fn new(column: impl Into<String>, operator: FilterOperator, value: impl fmt::Display) -> Self {
        Self {
            column: column.into(),
            expression: format!("{}.{}", operator, value),
        }
    }

    /// Use a caller-supplied operator expression as-is.
    pub fn raw(column: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            expression: expression.into(),
        }
    }

    /// Render as a query-string fragment.
    pub fn render(&self) -> String {
        format!("{}={}", self.column, self.expression)
    }

    /// Unencoded `(column, expression)` query parameter.
    pub fn param(&self) -> QueryParam {
        (self.column.clone(), self.expression.clone())
    }
}

/// An embedded-resource join rendered as `table(key,select)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSpec {
    pub table: String,
    pub key: String,
    /// Columns of the joined table; `*` when absent.
    #[serde(default)]
    pub select: Option<String>,
}

impl JoinSpec {
    pub fn new(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            key: key.into(),
            select: None,
        }
    }

    /// Restrict the joined columns.
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    pub fn render(&self) -> String {
        crate::postgrest::join_fragment(&self.table, &self.key, self.select.as_deref())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

impl OrderDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}
