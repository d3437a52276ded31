//! Row-level SQLite queries.
//!
//! Every query is a free function over `&mut SqliteConnection`, so the same call works on a pooled connection or
//! inside an open transaction. [`crate::SqliteDatabase`] decides which.
use std::env;

use log::{debug, info};
use sqlx::{sqlite::SqlitePoolOptions, Error as SqlxError, SqlitePool};

pub mod accounts;
pub mod transactions;

const SQLITE_DB_URL: &str = "sqlite://data/ipn_store.db";

pub fn db_url() -> String {
    let result = env::var("IPN_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ IPN_DATABASE_URL is not set. Using {SQLITE_DB_URL}.");
        SQLITE_DB_URL.to_string()
    });
    debug!("🗃️ Database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}
