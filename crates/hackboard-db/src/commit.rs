// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row, SqliteConnection};

use crate::error::Result;
use crate::types::{
	count_from_db, format_timestamp, parse_optional_timestamp, parse_timestamp, CommitRecord,
	NewCommit, RepoId,
};

#[derive(Clone)]
pub struct CommitRepository {
	pool: SqlitePool,
}

impl CommitRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Stored commits for a repository, most recently detected first.
	#[tracing::instrument(skip(self))]
	pub async fn list_commits(&self, repo_id: RepoId, limit: u32) -> Result<Vec<CommitRecord>> {
		let rows = sqlx::query(
			r#"
			SELECT id, repo_id, commit_hash, author, message, committed_at, detected_at
			FROM commits
			WHERE repo_id = ?
			ORDER BY detected_at DESC, id DESC
			LIMIT ?
			"#,
		)
		.bind(repo_id)
		.bind(limit)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_commit).collect()
	}

	#[tracing::instrument(skip(self))]
	pub async fn count_commits(&self, repo_id: RepoId) -> Result<u64> {
		let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM commits WHERE repo_id = ?")
			.bind(repo_id)
			.fetch_one(&self.pool)
			.await?;
		Ok(count_from_db(count))
	}
}

/// Store a commit unless the repository already has one with the same hash.
///
/// Returns true when a row was written.
pub async fn insert_commit_if_absent(
	conn: &mut SqliteConnection,
	repo_id: RepoId,
	commit: &NewCommit,
	detected_at: DateTime<Utc>,
) -> Result<bool> {
	let result = sqlx::query(
		r#"
		INSERT INTO commits (repo_id, commit_hash, author, message, committed_at, detected_at)
		VALUES (?, ?, ?, ?, ?, ?)
		ON CONFLICT(repo_id, commit_hash) DO NOTHING
		"#,
	)
	.bind(repo_id)
	.bind(&commit.hash)
	.bind(&commit.author)
	.bind(&commit.message)
	.bind(commit.timestamp.map(format_timestamp))
	.bind(format_timestamp(detected_at))
	.execute(conn)
	.await?;

	Ok(result.rows_affected() == 1)
}

fn row_to_commit(row: &sqlx::sqlite::SqliteRow) -> Result<CommitRecord> {
	let detected_at: String = row.get("detected_at");
	Ok(CommitRecord {
		id: row.get("id"),
		repo_id: row.get("repo_id"),
		hash: row.get("commit_hash"),
		author: row.get("author"),
		message: row.get("message"),
		timestamp: parse_optional_timestamp(row.get("committed_at"))?,
		detected_at: parse_timestamp(&detected_at)?,
	})
}
