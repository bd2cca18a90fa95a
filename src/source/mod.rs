//! Row sources: where seeder data comes from.
//!
//! The generator never talks to a database directly. It asks a [`RowSource`]
//! whether a table exists, which columns it has, and for the rows matching a
//! set of [`FetchOptions`]. [`DuckDbSource`] is the bundled implementation.

mod duckdb;

pub use self::duckdb::DuckDbSource;

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A single scalar cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// One table row: column values in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column. Column order is preserved as given.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((column.into(), value.into()));
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Sort direction for `ORDER BY`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl std::str::FromStr for OrderDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(OrderDirection::Asc),
            "desc" => Ok(OrderDirection::Desc),
            _ => Err(format!(
                "Unknown order direction: {}. Valid options: asc, desc",
                s
            )),
        }
    }
}

impl std::fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "ASC"),
            OrderDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// Filters applied when reading a table. All of them compose.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Maximum number of rows (None = all)
    pub max_rows: Option<usize>,
    /// Columns to leave out of the select list
    pub exclude: Vec<String>,
    /// Column to order by
    pub order_by: Option<String>,
    pub direction: OrderDirection,
    /// Raw SQL condition placed after `WHERE`
    pub where_clause: Option<String>,
    /// Number of leading rows to skip
    pub skip: Option<usize>,
}

/// Data-source capability consumed by the generator.
pub trait RowSource {
    fn has_table(&self, table: &str) -> Result<bool>;

    /// Column names in ordinal order.
    fn column_listing(&self, table: &str) -> Result<Vec<String>>;

    fn fetch(&self, table: &str, options: &FetchOptions) -> Result<Vec<Row>>;
}

impl<S: RowSource + ?Sized> RowSource for &S {
    fn has_table(&self, table: &str) -> Result<bool> {
        (**self).has_table(table)
    }

    fn column_listing(&self, table: &str) -> Result<Vec<String>> {
        (**self).column_listing(table)
    }

    fn fetch(&self, table: &str, options: &FetchOptions) -> Result<Vec<Row>> {
        (**self).fetch(table, options)
    }
}

/// Quote an identifier for use in generated SQL.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Build the select statement for a fetch.
///
/// `columns` is the full column listing and is only consulted when
/// `options.exclude` is non-empty.
pub fn build_select(table: &str, columns: &[String], options: &FetchOptions) -> String {
    let select_list = if options.exclude.is_empty() {
        "*".to_string()
    } else {
        let excluded: ahash::AHashSet<&str> =
            options.exclude.iter().map(|c| c.as_str()).collect();
        let kept: Vec<String> = columns
            .iter()
            .filter(|c| !excluded.contains(c.as_str()))
            .map(|c| quote_ident(c))
            .collect();
        if kept.is_empty() {
            "*".to_string()
        } else {
            kept.join(", ")
        }
    };

    let mut sql = format!("SELECT {} FROM {}", select_list, quote_ident(table));

    if let Some(ref clause) = options.where_clause {
        let clause = clause.trim();
        if !clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(clause);
        }
    }

    if let Some(ref column) = options.order_by {
        sql.push_str(&format!(" ORDER BY {} {}", quote_ident(column), options.direction));
    }

    if let Some(max) = options.max_rows {
        sql.push_str(&format!(" LIMIT {}", max));
    }

    if let Some(skip) = options.skip {
        if skip > 0 {
            sql.push_str(&format!(" OFFSET {}", skip));
        }
    }

    sql
}
