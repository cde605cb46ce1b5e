// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::schema::init_schema;

/// A single-connection in-memory pool with no tables.
///
/// One connection that never expires keeps the in-memory database alive for
/// the lifetime of the pool.
pub async fn create_empty_test_pool() -> SqlitePool {
	let options = SqliteConnectOptions::from_str("sqlite::memory:")
		.unwrap()
		.foreign_keys(true);

	SqlitePoolOptions::new()
		.max_connections(1)
		.idle_timeout(None)
		.max_lifetime(None)
		.connect_with(options)
		.await
		.unwrap()
}

/// An in-memory pool with the full tracker schema.
pub async fn create_test_pool() -> SqlitePool {
	let pool = create_empty_test_pool().await;
	init_schema(&pool).await.unwrap();
	pool
}
