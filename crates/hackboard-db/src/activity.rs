// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Durable activity log.
//!
//! `activity_events` is the consumer-acknowledged notification queue: rows are
//! written unprocessed by the reconciler and only ever flipped to processed by
//! [`ActivityRepository::mark_events_processed`]. `activity_history` is the
//! append-only audit trail and is never touched after insert.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row, SqliteConnection};

use crate::error::{DbError, Result};
use crate::types::{
	count_from_db, count_to_db, format_timestamp, parse_timestamp, ActivityEvent,
	ActivityHistoryEntry, ActivityPayload, EventId, EventType, RepoId,
};

/// Keeps every UPDATE well under SQLite's bound-parameter limit.
const MARK_BATCH_SIZE: usize = 500;

#[derive(Clone)]
pub struct ActivityRepository {
	pool: SqlitePool,
}

impl ActivityRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Events not yet acknowledged, oldest first.
	#[tracing::instrument(skip(self))]
	pub async fn get_unprocessed_events(&self) -> Result<Vec<ActivityEvent>> {
		let rows = sqlx::query(
			r#"
			SELECT id, event_type, repo_id, payload, processed, created_at
			FROM activity_events
			WHERE processed = 0
			ORDER BY created_at ASC, id ASC
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_event).collect()
	}

	/// Acknowledge a batch of events. Returns how many rows flipped.
	#[tracing::instrument(skip(self, ids), fields(count = ids.len()))]
	pub async fn mark_events_processed(&self, ids: &[EventId]) -> Result<u64> {
		if ids.is_empty() {
			return Ok(0);
		}

		let mut tx = self.pool.begin().await?;
		let mut updated = 0;
		for chunk in ids.chunks(MARK_BATCH_SIZE) {
			let placeholders = vec!["?"; chunk.len()].join(", ");
			let sql = format!(
				"UPDATE activity_events SET processed = 1 WHERE processed = 0 AND id IN ({placeholders})"
			);
			let mut query = sqlx::query(&sql);
			for id in chunk {
				query = query.bind(*id);
			}
			updated += query.execute(&mut *tx).await?.rows_affected();
		}
		tx.commit().await?;

		tracing::debug!(updated, "events marked processed");
		Ok(updated)
	}

	/// The audit trail, newest first.
	#[tracing::instrument(skip(self))]
	pub async fn get_recent_activity(&self, limit: u32) -> Result<Vec<ActivityHistoryEntry>> {
		let rows = sqlx::query(
			r#"
			SELECT id, event_type, team_name, repo_name, delta, total_commits, recorded_at
			FROM activity_history
			ORDER BY recorded_at DESC, id DESC
			LIMIT ?
			"#,
		)
		.bind(limit)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_history).collect()
	}
}

// =========================================================================
// Transaction helpers
// =========================================================================

pub async fn insert_event(
	conn: &mut SqliteConnection,
	event_type: EventType,
	repo_id: RepoId,
	payload: &ActivityPayload,
	created_at: DateTime<Utc>,
) -> Result<EventId> {
	let payload_json = serde_json::to_string(payload)?;
	let result = sqlx::query(
		r#"
		INSERT INTO activity_events (event_type, repo_id, payload, processed, created_at)
		VALUES (?, ?, ?, 0, ?)
		"#,
	)
	.bind(event_type.as_str())
	.bind(repo_id)
	.bind(payload_json)
	.bind(format_timestamp(created_at))
	.execute(conn)
	.await?;

	Ok(result.last_insert_rowid())
}

pub async fn insert_history(
	conn: &mut SqliteConnection,
	event_type: EventType,
	payload: &ActivityPayload,
	recorded_at: DateTime<Utc>,
) -> Result<i64> {
	let result = sqlx::query(
		r#"
		INSERT INTO activity_history (event_type, team_name, repo_name, delta, total_commits, recorded_at)
		VALUES (?, ?, ?, ?, ?, ?)
		"#,
	)
	.bind(event_type.as_str())
	.bind(&payload.team_name)
	.bind(&payload.repo_name)
	.bind(count_to_db(payload.delta)?)
	.bind(count_to_db(payload.new_total)?)
	.bind(format_timestamp(recorded_at))
	.execute(conn)
	.await?;

	Ok(result.last_insert_rowid())
}

fn parse_event_type(raw: &str) -> Result<EventType> {
	raw.parse().map_err(DbError::Internal)
}

fn row_to_event(row: &sqlx::sqlite::SqliteRow) -> Result<ActivityEvent> {
	let event_type: String = row.get("event_type");
	let payload: String = row.get("payload");
	let created_at: String = row.get("created_at");

	Ok(ActivityEvent {
		id: row.get("id"),
		event_type: parse_event_type(&event_type)?,
		repo_id: row.get("repo_id"),
		payload: serde_json::from_str(&payload)?,
		created_at: parse_timestamp(&created_at)?,
		processed: row.get::<i64, _>("processed") != 0,
	})
}

fn row_to_history(row: &sqlx::sqlite::SqliteRow) -> Result<ActivityHistoryEntry> {
	let event_type: String = row.get("event_type");
	let recorded_at: String = row.get("recorded_at");

	Ok(ActivityHistoryEntry {
		id: row.get("id"),
		event_type: parse_event_type(&event_type)?,
		team_name: row.get("team_name"),
		repo_name: row.get("repo_name"),
		delta: count_from_db(row.get("delta")),
		total_commits: count_from_db(row.get("total_commits")),
		timestamp: parse_timestamp(&recorded_at)?,
	})
}
