//! Idempotent row loading
//!
//! Each row is written by a single `INSERT ... SELECT ... WHERE NOT EXISTS`
//! keyed on (stocking_date, county, waterbody). The report date range is stored
//! with the row but is not part of the key, so a stocking event repeated in an
//! overlapping report window is inserted once, under the first report that
//! carried it.
//!
//! Rows are not batched into a transaction: a failure part-way through leaves
//! the earlier rows committed, and re-running the same report is safe.

use async_trait::async_trait;
use sqlx::{AnyConnection, Connection};
use tokio_util::sync::CancellationToken;
use tracing::{info, trace};

use crate::config::{LoaderConfig, DEFAULT_TABLE};
use crate::error::{LoaderError, Result};
use crate::extract::StockingRow;

/// Persists extracted rows
#[async_trait]
pub trait StockingWriter: Send + Sync {
    /// Insert the rows not already stored; returns how many were inserted.
    async fn insert_new_rows(
        &self,
        report_dates: &str,
        rows: &[StockingRow],
        cancel: &CancellationToken,
    ) -> Result<u64>;
}

/// Writes rows through sqlx's `Any` driver (PostgreSQL, SQLite)
pub struct SqlStockingWriter {
    database_url: String,
    table: String,
}

impl SqlStockingWriter {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            table: DEFAULT_TABLE.to_string(),
        }
    }

    /// Target a different table; the name must be a plain SQL identifier.
    pub fn with_table(mut self, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        validate_table_name(&table)?;
        self.table = table;
        Ok(self)
    }

    pub fn from_config(config: &LoaderConfig) -> Result<Self> {
        Self::new(config.database_url.clone()).with_table(config.table.clone())
    }

    async fn connect(&self) -> Result<AnyConnection> {
        sqlx::any::install_default_drivers();
        let conn = AnyConnection::connect(&self.database_url).await?;
        info!(table = %self.table, "SQL connection opened");
        Ok(conn)
    }
}

#[async_trait]
impl StockingWriter for SqlStockingWriter {
    async fn insert_new_rows(
        &self,
        report_dates: &str,
        rows: &[StockingRow],
        cancel: &CancellationToken,
    ) -> Result<u64> {
        if cancel.is_cancelled() {
            return Err(LoaderError::Cancelled);
        }

        // Dropped on the error paths, which also releases the connection
        let mut conn = self.connect().await?;
        let inserted = insert_new_rows_on(&mut conn, &self.table, report_dates, rows, cancel).await?;
        conn.close().await?;

        Ok(inserted)
    }
}

/// Conditional insert for `table`, with `$1..$4` bound to report dates,
/// stocking date, county and waterbody.
pub fn insert_sql(table: &str) -> String {
    format!(
        r#"
        INSERT INTO {table} (report_dates, stocking_date, county, waterbody)
        SELECT $1, $2, $3, $4
        WHERE NOT EXISTS (
            SELECT 1
            FROM {table}
            WHERE stocking_date = $2
              AND county = $3
              AND waterbody = $4
        )
        "#
    )
}

/// Insert `rows` over an open connection, one statement per row, in order.
///
/// Cancellation is checked before each row; rows already inserted stay.
pub async fn insert_new_rows_on(
    conn: &mut AnyConnection,
    table: &str,
    report_dates: &str,
    rows: &[StockingRow],
    cancel: &CancellationToken,
) -> Result<u64> {
    validate_table_name(table)?;
    let sql = insert_sql(table);
    let mut inserted = 0u64;

    for (i, row) in rows.iter().enumerate() {
        if cancel.is_cancelled() {
            info!(inserted, remaining = rows.len() - i, "Insert cancelled");
            return Err(LoaderError::Cancelled);
        }

        trace!(
            stocking_date = %row.stocking_date,
            county = %row.county,
            waterbody = %row.waterbody,
            "Inserting row"
        );

        let result = sqlx::query(&sql)
            .bind(report_dates)
            .bind(row.stocking_date.as_str())
            .bind(row.county.as_str())
            .bind(row.waterbody.as_str())
            .execute(&mut *conn)
            .await?;

        inserted += result.rows_affected();
    }

    info!(inserted, attempted = rows.len(), "Insert complete");

    Ok(inserted)
}

/// Accepts `name` or `schema.name` made of ASCII letters, digits and `_`.
pub fn validate_table_name(table: &str) -> Result<()> {
    let parts: Vec<&str> = table.split('.').collect();

    let valid = parts.len() <= 2
        && parts.iter().all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        });

    if valid {
        Ok(())
    } else {
        Err(LoaderError::InvalidTable(table.to_string()))
    }
}
