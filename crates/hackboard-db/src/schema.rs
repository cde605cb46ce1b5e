// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Table definitions for the tracker store.
//!
//! Every statement is create-if-absent. Nothing here ever drops or rewrites
//! existing data.

use sqlx::SqlitePool;

use crate::error::Result;

const SCHEMA: &[&str] = &[
	r#"
	CREATE TABLE IF NOT EXISTS teams (
		id INTEGER PRIMARY KEY AUTOINCREMENT,
		team_name TEXT NOT NULL UNIQUE,
		created_at TEXT NOT NULL
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS repositories (
		id INTEGER PRIMARY KEY AUTOINCREMENT,
		team_id INTEGER NOT NULL REFERENCES teams(id),
		repo_url TEXT NOT NULL UNIQUE,
		repo_name TEXT NOT NULL,
		last_checked_at TEXT,
		total_commits INTEGER NOT NULL DEFAULT 0 CHECK (total_commits >= 0)
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS commits (
		id INTEGER PRIMARY KEY AUTOINCREMENT,
		repo_id INTEGER NOT NULL REFERENCES repositories(id),
		commit_hash TEXT NOT NULL,
		author TEXT NOT NULL,
		message TEXT NOT NULL,
		committed_at TEXT,
		detected_at TEXT NOT NULL,
		UNIQUE (repo_id, commit_hash)
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS activity_events (
		id INTEGER PRIMARY KEY AUTOINCREMENT,
		event_type TEXT NOT NULL,
		repo_id INTEGER NOT NULL REFERENCES repositories(id),
		payload TEXT NOT NULL,
		processed INTEGER NOT NULL DEFAULT 0,
		created_at TEXT NOT NULL
	)
	"#,
	"CREATE INDEX IF NOT EXISTS idx_activity_events_pending ON activity_events(processed, created_at, id)",
	r#"
	CREATE TABLE IF NOT EXISTS activity_history (
		id INTEGER PRIMARY KEY AUTOINCREMENT,
		event_type TEXT NOT NULL,
		team_name TEXT NOT NULL,
		repo_name TEXT NOT NULL,
		delta INTEGER NOT NULL,
		total_commits INTEGER NOT NULL,
		recorded_at TEXT NOT NULL
	)
	"#,
	"CREATE INDEX IF NOT EXISTS idx_activity_history_recorded ON activity_history(recorded_at, id)",
];

/// Create every tracker table and index that does not exist yet.
#[tracing::instrument(skip(pool))]
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
	let mut tx = pool.begin().await?;
	for statement in SCHEMA {
		sqlx::query(statement).execute(&mut *tx).await?;
	}
	tx.commit().await?;

	tracing::debug!(statements = SCHEMA.len(), "schema initialized");
	Ok(())
}
