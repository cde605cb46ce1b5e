// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::{
	SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use std::time::Duration;

use crate::error::DbError;
use crate::schema;

/// How long a connection waits on a locked database before giving up.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const MAX_CONNECTIONS: u32 = 4;

/// Create a SqlitePool with WAL mode and common settings.
///
/// WAL lets the display layer keep reading while the scheduler writes, and
/// the busy timeout bounds how long either side waits on the other.
///
/// # Arguments
/// * `database_url` - SQLite connection string (e.g., "sqlite:./hackboard.db")
/// * `busy_timeout` - bounded wait applied to every connection
///
/// # Errors
/// Returns `DbError::Internal` if the URL is invalid or connection fails.
#[tracing::instrument(skip(database_url))]
pub async fn create_pool(database_url: &str, busy_timeout: Duration) -> Result<SqlitePool, DbError> {
	let options = SqliteConnectOptions::from_str(database_url)
		.map_err(|e| DbError::Internal(format!("Invalid database URL: {e}")))?
		.journal_mode(SqliteJournalMode::Wal)
		.synchronous(SqliteSynchronous::Normal)
		.busy_timeout(busy_timeout)
		.foreign_keys(true)
		.create_if_missing(true);

	let pool = SqlitePoolOptions::new()
		.max_connections(MAX_CONNECTIONS)
		.acquire_timeout(busy_timeout * 2)
		.connect_with(options)
		.await?;

	tracing::debug!("database pool created");
	Ok(pool)
}

/// Open the tracker store: create the pool and make sure every table exists.
///
/// Schema creation is idempotent, so reopening an existing file is safe.
pub async fn open_store(database_url: &str, busy_timeout: Duration) -> Result<SqlitePool, DbError> {
	let pool = create_pool(database_url, busy_timeout).await?;
	schema::init_schema(&pool).await?;
	tracing::info!("tracker store ready");
	Ok(pool)
}
