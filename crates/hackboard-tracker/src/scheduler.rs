// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The background polling loop.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use hackboard_db::{RepoId, TrackedRepoRepository};
use hackboard_github::CommitSource;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::SchedulerConfig;
use crate::context::CancellationToken;
use crate::reconciler::Reconciler;

/// Below this many remaining calls the budget is logged on every pass.
const LOW_BUDGET_LOG_THRESHOLD: u32 = 100;

/// Whether the API budget is too small for one more check of every repository
/// at the normal rate. Unknown budgets never count as low.
pub fn approaching_limit(remaining: Option<u32>, repo_count: usize) -> bool {
	match remaining {
		Some(remaining) => u64::from(remaining) < 2 * repo_count as u64,
		None => false,
	}
}

pub fn is_due(last_checked: Option<Instant>, now: Instant, interval: Duration) -> bool {
	match last_checked {
		Some(last) => now.saturating_duration_since(last) >= interval,
		None => true,
	}
}

/// What one pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
	pub checked: usize,
	pub new_commits: u64,
	pub approaching_limit: bool,
}

pub struct Scheduler {
	reconciler: Arc<Reconciler>,
	repos: TrackedRepoRepository,
	source: Arc<dyn CommitSource>,
	config: SchedulerConfig,
	last_checked: HashMap<RepoId, Instant>,
}

impl Scheduler {
	pub fn new(
		reconciler: Arc<Reconciler>,
		repos: TrackedRepoRepository,
		source: Arc<dyn CommitSource>,
		config: SchedulerConfig,
	) -> Self {
		Self {
			reconciler,
			repos,
			source,
			config,
			last_checked: HashMap::new(),
		}
	}

	/// Poll until `token` is cancelled.
	pub async fn run(mut self, token: CancellationToken) {
		info!(
			source = %self.source.kind(),
			interval_secs = self.config.interval.as_secs(),
			"polling loop started"
		);

		while !token.is_cancelled() {
			let report = self.run_pass(&token).await;
			if report.checked > 0 {
				debug!(checked = report.checked, new_commits = report.new_commits, "pass complete");
			}
			tokio::select! {
				_ = token.cancelled() => break,
				_ = tokio::time::sleep(self.config.tick) => {}
			}
		}

		info!("polling loop stopped");
	}

	/// Check every repository that is due. Never fails; a repository that
	/// cannot be checked is simply retried on a later pass.
	pub async fn run_pass(&mut self, token: &CancellationToken) -> PassReport {
		let repos = match self.repos.list_repositories().await {
			Ok(repos) => repos,
			Err(e) => {
				warn!(error = %e, "failed to list repositories, skipping pass");
				return PassReport::default();
			}
		};

		let remaining = self.source.budget().map(|b| b.remaining);
		let approaching = approaching_limit(remaining, repos.len());
		let interval = self.config.effective_interval(approaching);
		if approaching {
			warn!(
				remaining = remaining.unwrap_or_default(),
				repo_count = repos.len(),
				interval_secs = interval.as_secs(),
				"API budget low, slowing checks"
			);
		}

		let mut report = PassReport {
			approaching_limit: approaching,
			..PassReport::default()
		};
		for repo in &repos {
			if token.is_cancelled() {
				break;
			}

			let now = Instant::now();
			if !is_due(self.last_checked.get(&repo.id).copied(), now, interval) {
				continue;
			}

			report.new_commits += self.reconciler.check_repository(repo.id).await;
			report.checked += 1;
			self.last_checked.insert(repo.id, Instant::now());
		}

		if let Some(remaining) = self.source.budget().map(|b| b.remaining) {
			if remaining < LOW_BUDGET_LOG_THRESHOLD {
				info!(remaining, "API calls remaining");
			}
		}

		report
	}
}
