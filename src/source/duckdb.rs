//! DuckDB-backed row source.

use super::{build_select, FetchOptions, Row, RowSource, Value};
use crate::error::{Result, SeedError};
use duckdb::types::{TimeUnit, ValueRef};
use duckdb::{params, Connection};
use std::path::Path;
use tracing::debug;

/// Reads seeder rows from a DuckDB database.
pub struct DuckDbSource {
    conn: Connection,
}

impl DuckDbSource {
    /// Open an existing (or new) database file
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| {
            SeedError::Source(format!("cannot open database {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "opened duckdb database");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Wrap an existing connection
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Run a batch of statements, e.g. a schema + data script.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Run the SQL script at `path` against the database.
    pub fn run_script(&self, path: &Path) -> Result<()> {
        let sql = std::fs::read_to_string(path).map_err(|source| SeedError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(script = %path.display(), "running init script");
        self.execute_batch(&sql)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl RowSource for DuckDbSource {
    fn has_table(&self, table: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?",
            params![table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn column_listing(&self, table: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT column_name FROM information_schema.columns \
             WHERE table_name = ? ORDER BY ordinal_position",
        )?;
        let names = stmt
            .query_map(params![table], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn fetch(&self, table: &str, options: &FetchOptions) -> Result<Vec<Row>> {
        let columns = if options.exclude.is_empty() {
            Vec::new()
        } else {
            self.column_listing(table)?
        };
        let sql = build_select(table, &columns, options);
        debug!(%sql, "fetching rows");

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| SeedError::Source(format!("failed to prepare `{}`: {}", sql, e)))?;
        let mut rows_result = stmt
            .query([])
            .map_err(|e| SeedError::Source(format!("failed to execute `{}`: {}", sql, e)))?;

        let mut raw_rows: Vec<Vec<Value>> = Vec::new();
        let mut column_count = 0;

        while let Some(row) = rows_result.next()? {
            if column_count == 0 {
                column_count = row.as_ref().column_count();
            }

            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(convert_value(row.get_ref(i)?));
            }
            raw_rows.push(values);
        }

        // Release the borrow on the statement before reading column names
        drop(rows_result);

        let names: Vec<String> = (0..stmt.column_count())
            .map(|i| {
                stmt.column_name(i)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|_| format!("col{}", i))
            })
            .collect();

        Ok(raw_rows
            .into_iter()
            .map(|values| {
                let mut row = Row::new();
                for (name, value) in names.iter().zip(values) {
                    row.push(name.clone(), value);
                }
                row
            })
            .collect())
    }
}

fn convert_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(n) => Value::Int(n.into()),
        ValueRef::SmallInt(n) => Value::Int(n.into()),
        ValueRef::Int(n) => Value::Int(n.into()),
        ValueRef::BigInt(n) => Value::Int(n),
        ValueRef::UTinyInt(n) => Value::Int(n.into()),
        ValueRef::USmallInt(n) => Value::Int(n.into()),
        ValueRef::UInt(n) => Value::Int(n.into()),
        ValueRef::UBigInt(n) => i64::try_from(n)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Str(n.to_string())),
        ValueRef::HugeInt(n) => i64::try_from(n)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Str(n.to_string())),
        ValueRef::UHugeInt(n) => i64::try_from(n)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Str(n.to_string())),
        // shortest f32 form, so REAL 0.1 stays 0.1
        ValueRef::Float(f) => Value::Float(
            f.to_string()
                .parse::<f64>()
                .unwrap_or_else(|_| f64::from(f)),
        ),
        ValueRef::Double(f) => Value::Float(f),
        ValueRef::Decimal(d) => Value::Str(d.to_string()),
        ValueRef::Text(s) => Value::Str(String::from_utf8_lossy(s).into_owned()),
        ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
        ValueRef::Timestamp(unit, ts) => {
            let (secs, nanos) = split_epoch(unit, ts);
            match chrono::DateTime::from_timestamp(secs, nanos) {
                Some(dt) => Value::Str(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
                None => Value::Str(ts.to_string()),
            }
        }
        ValueRef::Date32(days) => {
            // 719163 = days from 0001-01-01 to 1970-01-01
            match chrono::NaiveDate::from_num_days_from_ce_opt(719_163 + days) {
                Some(date) => Value::Str(date.format("%Y-%m-%d").to_string()),
                None => Value::Str(days.to_string()),
            }
        }
        ValueRef::Time64(unit, t) => {
            let (secs, nanos) = split_epoch(unit, t);
            match u32::try_from(secs)
                .ok()
                .and_then(|secs| chrono::NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos))
            {
                Some(time) => Value::Str(time.format("%H:%M:%S").to_string()),
                None => Value::Str(t.to_string()),
            }
        }
        ValueRef::Interval {
            months,
            days,
            nanos,
        } => Value::Str(interval_text(months, days, nanos)),
        ValueRef::Enum(..) => match value.as_str() {
            Ok(label) => Value::Str(label.to_string()),
            Err(_) => Value::Str(format!("{:?}", value)),
        },
        other => Value::Str(format!("{:?}", other)),
    }
}

/// Split a count of `unit` into whole seconds and the nanosecond remainder.
fn split_epoch(unit: TimeUnit, value: i64) -> (i64, u32) {
    let per_second: i64 = match unit {
        TimeUnit::Second => 1,
        TimeUnit::Millisecond => 1_000,
        TimeUnit::Microsecond => 1_000_000,
        TimeUnit::Nanosecond => 1_000_000_000,
    };
    let nanos_per_tick = 1_000_000_000 / per_second;
    let secs = value.div_euclid(per_second);
    let nanos = (value.rem_euclid(per_second) * nanos_per_tick) as u32;
    (secs, nanos)
}

/// Render an interval the way DuckDB prints it, e.g. `1 year 2 months 3 days 04:05:06`.
fn interval_text(months: i32, days: i32, nanos: i64) -> String {
    fn unit(n: i32, name: &str) -> String {
        if n.abs() == 1 {
            format!("{} {}", n, name)
        } else {
            format!("{} {}s", n, name)
        }
    }

    let mut parts = Vec::new();
    let (years, months) = (months / 12, months % 12);
    if years != 0 {
        parts.push(unit(years, "year"));
    }
    if months != 0 {
        parts.push(unit(months, "month"));
    }
    if days != 0 {
        parts.push(unit(days, "day"));
    }

    if nanos != 0 || parts.is_empty() {
        let sign = if nanos < 0 { "-" } else { "" };
        let total_micros = (nanos / 1_000).unsigned_abs();
        let secs = total_micros / 1_000_000;
        let micros = total_micros % 1_000_000;
        let mut time = format!(
            "{}{:02}:{:02}:{:02}",
            sign,
            secs / 3600,
            secs % 3600 / 60,
            secs % 60
        );
        if micros != 0 {
            time.push_str(&format!(".{:06}", micros));
        }
        parts.push(time);
    }

    parts.join(" ")
}
