// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DbError, Result};

pub type TeamId = i64;
pub type RepoId = i64;
pub type EventId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
	NewCommits,
}

impl EventType {
	pub fn as_str(&self) -> &'static str {
		match self {
			EventType::NewCommits => "new_commits",
		}
	}
}

impl std::str::FromStr for EventType {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s {
			"new_commits" => Ok(EventType::NewCommits),
			_ => Err(format!("unknown event type: {s}")),
		}
	}
}

impl std::fmt::Display for EventType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
	pub id: TeamId,
	pub name: String,
	pub created_at: DateTime<Utc>,
}

/// A tracked repository joined with the name of the team that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
	pub id: RepoId,
	pub team_id: TeamId,
	pub url: String,
	pub display_name: String,
	pub total_commits: u64,
	pub team_name: String,
	pub last_checked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
	pub team_name: String,
	pub total_commits: u64,
}

/// Repository and commit counts across the whole store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoTotals {
	pub repo_count: u64,
	pub total_commits: u64,
}

/// Commit metadata about to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommit {
	pub hash: String,
	pub author: String,
	pub message: String,
	pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
	pub id: i64,
	pub repo_id: RepoId,
	pub hash: String,
	pub author: String,
	pub message: String,
	pub timestamp: Option<DateTime<Utc>>,
	pub detected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPayload {
	pub team_name: String,
	pub repo_name: String,
	pub delta: u64,
	pub new_total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
	pub id: EventId,
	pub event_type: EventType,
	pub repo_id: RepoId,
	pub payload: ActivityPayload,
	pub created_at: DateTime<Utc>,
	pub processed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityHistoryEntry {
	pub id: i64,
	pub event_type: EventType,
	pub team_name: String,
	pub repo_name: String,
	pub delta: u64,
	pub total_commits: u64,
	pub timestamp: DateTime<Utc>,
}

// =========================================================================
// Column encoding helpers
// =========================================================================

/// Nanosecond RFC 3339 keeps lexical and chronological order identical.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
	ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
	DateTime::parse_from_rfc3339(raw)
		.map(|d| d.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("invalid timestamp '{raw}': {e}")))
}

pub(crate) fn parse_optional_timestamp(raw: Option<String>) -> Result<Option<DateTime<Utc>>> {
	raw.as_deref().map(parse_timestamp).transpose()
}

/// Counts are stored as INTEGER; negative values never get written.
pub(crate) fn count_from_db(value: i64) -> u64 {
	u64::try_from(value).unwrap_or(0)
}

pub(crate) fn count_to_db(value: u64) -> Result<i64> {
	i64::try_from(value).map_err(|_| DbError::Internal(format!("count {value} out of range")))
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use proptest::prelude::*;

	#[test]
	fn test_event_type_roundtrip() {
		assert_eq!("new_commits".parse::<EventType>().unwrap(), EventType::NewCommits);
		assert_eq!(EventType::NewCommits.to_string(), "new_commits");
		assert!("deleted".parse::<EventType>().is_err());
	}

	#[test]
	fn test_timestamp_format_preserves_order() {
		let earlier = Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap();
		let later = earlier + chrono::Duration::nanoseconds(1);
		assert!(format_timestamp(earlier) < format_timestamp(later));
		assert_eq!(parse_timestamp(&format_timestamp(later)).unwrap(), later);
	}

	#[test]
	fn test_parse_timestamp_rejects_garbage() {
		assert!(matches!(parse_timestamp("yesterday"), Err(DbError::Internal(_))));
	}

	#[test]
	fn test_count_from_db_clamps_negative() {
		assert_eq!(count_from_db(-3), 0);
		assert_eq!(count_from_db(7), 7);
	}

	#[test]
	fn test_count_to_db_rejects_overflow() {
		assert!(count_to_db(u64::MAX).is_err());
	}

	proptest! {
		#[test]
		fn prop_count_conversion_roundtrips(value in 0u64..=i64::MAX as u64) {
			prop_assert_eq!(count_from_db(count_to_db(value).unwrap()), value);
		}
	}
}
