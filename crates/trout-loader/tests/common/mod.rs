//! Shared helpers for loader integration tests

#![allow(dead_code)]

use sqlx::{AnyConnection, Connection};
use trout_loader::extract::StockingRow;

pub const SCHEMA: &str = include_str!("../../sql/weekly_trout_stocking.sql");

/// Fresh in-memory SQLite database with the target table
pub async fn memory_store() -> AnyConnection {
    sqlx::any::install_default_drivers();
    let mut conn = AnyConnection::connect("sqlite::memory:").await.unwrap();
    sqlx::raw_sql(SCHEMA).execute(&mut conn).await.unwrap();
    conn
}

/// SQLite file URL inside `dir`, with the target table created
pub async fn file_store(dir: &tempfile::TempDir) -> String {
    sqlx::any::install_default_drivers();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("trout.db").display());
    let mut conn = AnyConnection::connect(&url).await.unwrap();
    sqlx::raw_sql(SCHEMA).execute(&mut conn).await.unwrap();
    conn.close().await.unwrap();
    url
}

pub async fn count_rows(conn: &mut AnyConnection) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM weekly_trout_stocking")
        .fetch_one(&mut *conn)
        .await
        .unwrap()
}

pub fn week_rows() -> Vec<StockingRow> {
    vec![
        StockingRow::new("12/15/2025", "Forsyth", "Lanier Tailwater"),
        StockingRow::new("12/16/2025", "Hall", "Chattahoochee"),
        StockingRow::new("12/17/2025", "Fannin/Gilmer", "Toccoa River"),
    ]
}
