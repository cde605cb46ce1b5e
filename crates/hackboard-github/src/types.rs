// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Commit and rate-limit types, plus the wire shapes they are decoded from.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

const UNKNOWN_AUTHOR: &str = "Unknown";

/// One commit as reported by the commits listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
	pub hash: String,
	pub author: String,
	pub message: String,
	pub timestamp: Option<DateTime<Utc>>,
}

/// Core API budget as reported by `GET /rate_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBudget {
	pub limit: u32,
	pub remaining: u32,
	pub reset_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCommit {
	pub sha: String,
	pub author: Option<ApiUser>,
	pub commit: ApiCommitDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiUser {
	pub login: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCommitDetail {
	pub message: String,
	pub author: Option<ApiGitAuthor>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiGitAuthor {
	pub name: Option<String>,
	pub date: Option<DateTime<Utc>>,
}

impl From<ApiCommit> for CommitInfo {
	fn from(c: ApiCommit) -> Self {
		let git_author = c.commit.author;
		let author = c
			.author
			.map(|u| u.login)
			.or_else(|| git_author.as_ref().and_then(|a| a.name.clone()))
			.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

		CommitInfo {
			hash: c.sha,
			author,
			message: c.commit.message,
			timestamp: git_author.and_then(|a| a.date),
		}
	}
}

#[derive(Debug, Deserialize)]
pub(crate) struct RateLimitResponse {
	pub resources: RateLimitResources,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RateLimitResources {
	pub core: RateLimitBucket,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RateLimitBucket {
	pub limit: u32,
	pub remaining: u32,
	pub reset: i64,
}

impl RateLimitBucket {
	pub(crate) fn into_budget(self) -> Option<RateBudget> {
		let reset_at = Utc.timestamp_opt(self.reset, 0).single()?;
		Some(RateBudget {
			limit: self.limit,
			remaining: self.remaining,
			reset_at,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_commit_decoding_prefers_login() {
		let raw = serde_json::json!({
			"sha": "abc123",
			"author": { "login": "octocat" },
			"commit": {
				"message": "Fix the thing",
				"author": { "name": "The Octocat", "date": "2025-02-01T10:00:00Z" }
			}
		});
		let commit: CommitInfo = serde_json::from_value::<ApiCommit>(raw).unwrap().into();

		assert_eq!(commit.hash, "abc123");
		assert_eq!(commit.author, "octocat");
		assert_eq!(commit.message, "Fix the thing");
		assert_eq!(
			commit.timestamp,
			Some(Utc.with_ymd_and_hms(2025, 2, 1, 10, 0, 0).unwrap())
		);
	}

	#[test]
	fn test_commit_without_linked_account_falls_back() {
		let raw = serde_json::json!({
			"sha": "def456",
			"author": null,
			"commit": { "message": "m", "author": { "name": "Local Dev", "date": null } }
		});
		let commit: CommitInfo = serde_json::from_value::<ApiCommit>(raw).unwrap().into();
		assert_eq!(commit.author, "Local Dev");
		assert!(commit.timestamp.is_none());

		let raw = serde_json::json!({
			"sha": "0001",
			"author": null,
			"commit": { "message": "m", "author": null }
		});
		let commit: CommitInfo = serde_json::from_value::<ApiCommit>(raw).unwrap().into();
		assert_eq!(commit.author, UNKNOWN_AUTHOR);
	}

	#[test]
	fn test_rate_limit_bucket_into_budget() {
		let bucket = RateLimitBucket {
			limit: 5000,
			remaining: 4321,
			reset: 1_700_000_000,
		};
		let budget = bucket.into_budget().unwrap();
		assert_eq!(budget.remaining, 4321);
		assert_eq!(budget.reset_at.timestamp(), 1_700_000_000);
	}
}
