// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Turns one acquisition into a committed state change.
//!
//! Every check runs in a single transaction: the `last_checked_at` stamp, the
//! new total, commit rows, the event and the history row land together or
//! not at all.

use std::sync::Arc;

use chrono::Utc;
use hackboard_db::activity::{insert_event, insert_history};
use hackboard_db::commit::insert_commit_if_absent;
use hackboard_db::tracked_repo::{raise_total_commits, read_total_commits, touch_last_checked};
use hackboard_db::{ActivityPayload, EventType, NewCommit, RepoId, TrackedRepoRepository};
use hackboard_github::{Acquisition, CommitInfo, CommitSource};
use sqlx::SqlitePool;
use tracing::{debug, error, info, instrument, warn};

use crate::error::Result;
use crate::notify::WakeSignal;

/// Commits gained going from `previous` to `current`. Never negative.
pub fn compute_delta(previous: u64, current: u64) -> u64 {
	current.saturating_sub(previous)
}

fn to_new_commit(commit: CommitInfo) -> NewCommit {
	NewCommit {
		hash: commit.hash,
		author: commit.author,
		message: commit.message,
		timestamp: commit.timestamp,
	}
}

pub struct Reconciler {
	pool: SqlitePool,
	repos: TrackedRepoRepository,
	source: Arc<dyn CommitSource>,
	signal: Arc<WakeSignal>,
}

impl Reconciler {
	pub fn new(pool: SqlitePool, source: Arc<dyn CommitSource>, signal: Arc<WakeSignal>) -> Self {
		Self {
			repos: TrackedRepoRepository::new(pool.clone()),
			pool,
			source,
			signal,
		}
	}

	/// Check one repository and return how many new commits were recorded.
	///
	/// Never fails: persistence errors roll back, are logged and count as no
	/// new commits so the next pass can retry.
	#[instrument(skip(self))]
	pub async fn check_repository(&self, repo_id: RepoId) -> u64 {
		match self.try_check(repo_id).await {
			Ok(delta) => delta,
			Err(e) => {
				error!(repo_id, error = %e, "repository check rolled back");
				0
			}
		}
	}

	async fn try_check(&self, repo_id: RepoId) -> Result<u64> {
		let Some(repo) = self.repos.get_repository(repo_id).await? else {
			warn!(repo_id, "check requested for unknown repository");
			return Ok(0);
		};

		let acquisition = self.source.fetch(&repo.url, repo.last_checked_at).await;
		let now = Utc::now();

		let mut tx = self.pool.begin().await?;
		// Write first so the transaction holds the write lock from the start.
		if !touch_last_checked(&mut *tx, repo_id, now).await? {
			warn!(repo_id, "repository disappeared during check");
			return Ok(0);
		}
		let previous = read_total_commits(&mut *tx, repo_id).await?.unwrap_or(0);

		let delta = match acquisition {
			Acquisition::Total(current) => compute_delta(previous, current),
			Acquisition::Commits(commits) => {
				let mut inserted = 0;
				for commit in commits {
					if insert_commit_if_absent(&mut *tx, repo_id, &to_new_commit(commit), now).await? {
						inserted += 1;
					}
				}
				inserted
			}
			Acquisition::NoData(reason) => {
				debug!(repo_id, %reason, "no data this cycle");
				0
			}
		};

		if delta == 0 {
			tx.commit().await?;
			return Ok(0);
		}

		let new_total = previous + delta;
		raise_total_commits(&mut *tx, repo_id, new_total).await?;

		let payload = ActivityPayload {
			team_name: repo.team_name.clone(),
			repo_name: repo.display_name.clone(),
			delta,
			new_total,
		};
		insert_event(&mut *tx, EventType::NewCommits, repo_id, &payload, now).await?;
		insert_history(&mut *tx, EventType::NewCommits, &payload, now).await?;
		tx.commit().await?;

		info!(
			repo_id,
			team_name = %repo.team_name,
			repo_name = %repo.display_name,
			delta,
			new_total,
			"new commits detected"
		);
		self.signal.set();
		Ok(delta)
	}
}
