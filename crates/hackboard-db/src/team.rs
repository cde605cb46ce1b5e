// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::{DbError, Result};
use crate::types::{
	count_from_db, format_timestamp, parse_timestamp, LeaderboardEntry, TeamId, TeamRecord,
};

#[derive(Clone)]
pub struct TeamRepository {
	pool: SqlitePool,
}

impl TeamRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Register a team, returning the existing id if the name is taken.
	#[tracing::instrument(skip(self))]
	pub async fn add_team(&self, name: &str) -> Result<TeamId> {
		let inserted = sqlx::query("INSERT INTO teams (team_name, created_at) VALUES (?, ?)")
			.bind(name)
			.bind(format_timestamp(Utc::now()))
			.execute(&self.pool)
			.await
			.map_err(DbError::from);

		match inserted {
			Ok(result) => {
				let id = result.last_insert_rowid();
				tracing::info!(team_id = id, "team registered");
				Ok(id)
			}
			Err(e) if e.is_unique_violation() => {
				let existing = self
					.get_team_by_name(name)
					.await?
					.ok_or_else(|| DbError::Internal(format!("team '{name}' conflicted but is missing")))?;
				tracing::debug!(team_id = existing.id, "team already registered");
				Ok(existing.id)
			}
			Err(e) => Err(e),
		}
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_team_by_name(&self, name: &str) -> Result<Option<TeamRecord>> {
		let row = sqlx::query("SELECT id, team_name, created_at FROM teams WHERE team_name = ?")
			.bind(name)
			.fetch_optional(&self.pool)
			.await?;

		row.as_ref().map(row_to_team).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn list_teams(&self) -> Result<Vec<TeamRecord>> {
		let rows = sqlx::query("SELECT id, team_name, created_at FROM teams ORDER BY id")
			.fetch_all(&self.pool)
			.await?;

		rows.iter().map(row_to_team).collect()
	}

	#[tracing::instrument(skip(self))]
	pub async fn count_teams(&self) -> Result<u64> {
		let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teams")
			.fetch_one(&self.pool)
			.await?;
		Ok(count_from_db(count))
	}

	/// Commit totals summed per team. Teams with no repositories report zero.
	///
	/// Rows come back in registration order; ranking is up to the caller.
	#[tracing::instrument(skip(self))]
	pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
		let rows = sqlx::query_as::<_, (String, i64)>(
			r#"
			SELECT t.team_name, COALESCE(SUM(r.total_commits), 0) AS total_commits
			FROM teams t
			LEFT JOIN repositories r ON r.team_id = t.id
			GROUP BY t.id
			ORDER BY t.id
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		Ok(rows
			.into_iter()
			.map(|(team_name, total)| LeaderboardEntry {
				team_name,
				total_commits: count_from_db(total),
			})
			.collect())
	}
}

fn row_to_team(row: &sqlx::sqlite::SqliteRow) -> Result<TeamRecord> {
	let created_at: String = row.get("created_at");
	Ok(TeamRecord {
		id: row.get("id"),
		name: row.get("team_name"),
		created_at: parse_timestamp(&created_at)?,
	})
}
