// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tracked repositories and their running commit totals.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row, SqliteConnection};

use crate::error::{DbError, Result};
use crate::types::{
	count_from_db, count_to_db, format_timestamp, parse_optional_timestamp, RepoId, RepoTotals,
	RepositorySummary, TeamId,
};

const SUMMARY_COLUMNS: &str = r#"
	SELECT r.id, r.team_id, r.repo_url, r.repo_name, r.total_commits, t.team_name, r.last_checked_at
	FROM repositories r
	JOIN teams t ON r.team_id = t.id
"#;

#[derive(Clone)]
pub struct TrackedRepoRepository {
	pool: SqlitePool,
}

impl TrackedRepoRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Register a repository for a team, returning the existing id if the URL
	/// is already tracked.
	#[tracing::instrument(skip(self))]
	pub async fn add_repository(&self, team_id: TeamId, url: &str) -> Result<RepoId> {
		let display_name = display_name_from_url(url);
		let inserted =
			sqlx::query("INSERT INTO repositories (team_id, repo_url, repo_name) VALUES (?, ?, ?)")
				.bind(team_id)
				.bind(url)
				.bind(&display_name)
				.execute(&self.pool)
				.await;

		match inserted {
			Ok(result) => {
				let id = result.last_insert_rowid();
				tracing::info!(repo_id = id, repo_name = %display_name, "repository registered");
				Ok(id)
			}
			Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
				let existing = self
					.get_repository_by_url(url)
					.await?
					.ok_or_else(|| DbError::Internal(format!("repository '{url}' conflicted but is missing")))?;
				tracing::debug!(repo_id = existing.id, "repository already registered");
				Ok(existing.id)
			}
			Err(sqlx::Error::Database(ref db_err)) if db_err.is_foreign_key_violation() => {
				Err(DbError::NotFound(format!("team {team_id}")))
			}
			Err(e) => Err(DbError::Sqlx(e)),
		}
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_repository(&self, id: RepoId) -> Result<Option<RepositorySummary>> {
		let row = sqlx::query(&format!("{SUMMARY_COLUMNS} WHERE r.id = ?"))
			.bind(id)
			.fetch_optional(&self.pool)
			.await?;

		row.as_ref().map(row_to_summary).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_repository_by_url(&self, url: &str) -> Result<Option<RepositorySummary>> {
		let row = sqlx::query(&format!("{SUMMARY_COLUMNS} WHERE r.repo_url = ?"))
			.bind(url)
			.fetch_optional(&self.pool)
			.await?;

		row.as_ref().map(row_to_summary).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn list_repositories(&self) -> Result<Vec<RepositorySummary>> {
		let rows = sqlx::query(&format!("{SUMMARY_COLUMNS} ORDER BY r.id"))
			.fetch_all(&self.pool)
			.await?;

		rows.iter().map(row_to_summary).collect()
	}

	#[tracing::instrument(skip(self))]
	pub async fn totals(&self) -> Result<RepoTotals> {
		let (repo_count, total_commits) = sqlx::query_as::<_, (i64, i64)>(
			"SELECT COUNT(*), COALESCE(SUM(total_commits), 0) FROM repositories",
		)
		.fetch_one(&self.pool)
		.await?;

		Ok(RepoTotals {
			repo_count: count_from_db(repo_count),
			total_commits: count_from_db(total_commits),
		})
	}
}

// =========================================================================
// Transaction helpers
// =========================================================================

/// Stamp `last_checked_at`. Returns false when the repository does not exist.
pub async fn touch_last_checked(
	conn: &mut SqliteConnection,
	id: RepoId,
	checked_at: DateTime<Utc>,
) -> Result<bool> {
	let result = sqlx::query("UPDATE repositories SET last_checked_at = ? WHERE id = ?")
		.bind(format_timestamp(checked_at))
		.bind(id)
		.execute(conn)
		.await?;
	Ok(result.rows_affected() > 0)
}

pub async fn read_total_commits(conn: &mut SqliteConnection, id: RepoId) -> Result<Option<u64>> {
	let total: Option<i64> = sqlx::query_scalar("SELECT total_commits FROM repositories WHERE id = ?")
		.bind(id)
		.fetch_optional(conn)
		.await?;
	Ok(total.map(count_from_db))
}

/// Raise the stored total. The `total_commits <= ?` guard makes a lower value
/// a no-op, so the column can only grow.
pub async fn raise_total_commits(conn: &mut SqliteConnection, id: RepoId, total: u64) -> Result<bool> {
	let result =
		sqlx::query("UPDATE repositories SET total_commits = ? WHERE id = ? AND total_commits <= ?")
			.bind(count_to_db(total)?)
			.bind(id)
			.bind(count_to_db(total)?)
			.execute(conn)
			.await?;
	Ok(result.rows_affected() > 0)
}

/// Last path segment of a repository URL, without a trailing slash or `.git`.
pub fn display_name_from_url(url: &str) -> String {
	let trimmed = url.trim_end_matches('/');
	let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
	last.strip_suffix(".git").unwrap_or(last).to_string()
}

fn row_to_summary(row: &sqlx::sqlite::SqliteRow) -> Result<RepositorySummary> {
	Ok(RepositorySummary {
		id: row.get("id"),
		team_id: row.get("team_id"),
		url: row.get("repo_url"),
		display_name: row.get("repo_name"),
		total_commits: count_from_db(row.get("total_commits")),
		team_name: row.get("team_name"),
		last_checked_at: parse_optional_timestamp(row.get("last_checked_at"))?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::team::TeamRepository;
	use crate::testing::create_test_pool;

	async fn setup() -> (SqlitePool, TeamId) {
		let pool = create_test_pool().await;
		let team_id = TeamRepository::new(pool.clone()).add_team("Team Tim").await.unwrap();
		(pool, team_id)
	}

	#[test]
	fn test_display_name_from_url() {
		assert_eq!(
			display_name_from_url("https://github.com/timf34/HackIrelandLeaderboard"),
			"HackIrelandLeaderboard"
		);
		assert_eq!(display_name_from_url("https://github.com/o/r/"), "r");
		assert_eq!(display_name_from_url("https://github.com/o/r.git"), "r");
		assert_eq!(display_name_from_url("plain"), "plain");
	}

	#[tokio::test]
	async fn test_add_repository_is_idempotent() {
		let (pool, team_id) = setup().await;
		let repos = TrackedRepoRepository::new(pool);

		let first = repos.add_repository(team_id, "https://github.com/o/r").await.unwrap();
		let second = repos.add_repository(team_id, "https://github.com/o/r").await.unwrap();

		assert_eq!(first, second);
		assert_eq!(repos.list_repositories().await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn test_add_repository_unknown_team_is_not_found() {
		let (pool, _) = setup().await;
		let repos = TrackedRepoRepository::new(pool);

		let result = repos.add_repository(999, "https://github.com/o/r").await;
		assert!(matches!(result, Err(DbError::NotFound(_))));
	}

	#[tokio::test]
	async fn test_new_repository_summary_defaults() {
		let (pool, team_id) = setup().await;
		let repos = TrackedRepoRepository::new(pool);
		let id = repos.add_repository(team_id, "https://github.com/o/widget/").await.unwrap();

		let summary = repos.get_repository(id).await.unwrap().unwrap();
		assert_eq!(summary.display_name, "widget");
		assert_eq!(summary.team_name, "Team Tim");
		assert_eq!(summary.total_commits, 0);
		assert!(summary.last_checked_at.is_none());
		assert!(repos.get_repository(id + 1).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_raise_total_commits_never_lowers() {
		let (pool, team_id) = setup().await;
		let repos = TrackedRepoRepository::new(pool.clone());
		let id = repos.add_repository(team_id, "https://github.com/o/r").await.unwrap();

		let mut conn = pool.acquire().await.unwrap();
		assert!(raise_total_commits(&mut conn, id, 8).await.unwrap());
		assert!(!raise_total_commits(&mut conn, id, 5).await.unwrap());
		assert_eq!(read_total_commits(&mut conn, id).await.unwrap(), Some(8));
		drop(conn);

		assert_eq!(repos.totals().await.unwrap().total_commits, 8);
	}

	#[tokio::test]
	async fn test_touch_last_checked_reports_missing_repo() {
		let (pool, _) = setup().await;
		let mut conn = pool.acquire().await.unwrap();
		assert!(!touch_last_checked(&mut conn, 42, Utc::now()).await.unwrap());
	}
}
