// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The tracker service object: registration, read APIs and the lifecycle of
//! the polling loop.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hackboard_db::{
	open_store, ActivityEvent, ActivityHistoryEntry, ActivityRepository, CommitRecord,
	CommitRepository, DbError, EventId, LeaderboardEntry, RepoId, RepositorySummary, TeamId,
	TeamRepository, TrackedRepoRepository,
};
use hackboard_github::CommitSource;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::config::{SchedulerConfig, TrackerConfig};
use crate::context::CancellationToken;
use crate::error::{Result, TrackerError};
use crate::notify::WakeSignal;
use crate::reconciler::Reconciler;
use crate::scheduler::Scheduler;

/// A team and the repositories it competes with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRegistration {
	pub name: String,
	pub repos: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerStats {
	pub total_teams: u64,
	pub total_repos: u64,
	pub total_commits: u64,
	/// Unknown for the scrape source or before the first budget probe.
	pub api_calls_remaining: Option<u32>,
	pub api_reset_at: Option<DateTime<Utc>>,
}

/// Sort by commits (highest first, ties by team name) and keep the top
/// `limit` entries.
pub fn rank_leaderboard(mut entries: Vec<LeaderboardEntry>, limit: Option<usize>) -> Vec<LeaderboardEntry> {
	entries.sort_by(|a, b| {
		b.total_commits
			.cmp(&a.total_commits)
			.then_with(|| a.team_name.cmp(&b.team_name))
	});
	if let Some(limit) = limit {
		entries.truncate(limit);
	}
	entries
}

struct RunningLoop {
	token: CancellationToken,
	handle: JoinHandle<()>,
}

pub struct Tracker {
	pool: SqlitePool,
	teams: TeamRepository,
	repos: TrackedRepoRepository,
	commits: CommitRepository,
	activity: ActivityRepository,
	source: Arc<dyn CommitSource>,
	reconciler: Arc<Reconciler>,
	signal: Arc<WakeSignal>,
	scheduler_config: SchedulerConfig,
	running: Mutex<Option<RunningLoop>>,
}

impl Tracker {
	/// Open (creating if needed) the store at `config.database_url`.
	#[instrument(skip(config, source), fields(database_url = %config.database_url))]
	pub async fn open(config: &TrackerConfig, source: Arc<dyn CommitSource>) -> Result<Self> {
		let pool = open_store(&config.database_url, config.busy_timeout).await?;
		info!(source = %source.kind(), "tracker store opened");
		Ok(Self::from_pool(pool, source, config.scheduler.clone()))
	}

	/// Wrap an already initialized pool.
	pub fn from_pool(pool: SqlitePool, source: Arc<dyn CommitSource>, scheduler_config: SchedulerConfig) -> Self {
		let signal = Arc::new(WakeSignal::new());
		let reconciler = Arc::new(Reconciler::new(pool.clone(), source.clone(), signal.clone()));
		Self {
			teams: TeamRepository::new(pool.clone()),
			repos: TrackedRepoRepository::new(pool.clone()),
			commits: CommitRepository::new(pool.clone()),
			activity: ActivityRepository::new(pool.clone()),
			pool,
			source,
			reconciler,
			signal,
			scheduler_config,
			running: Mutex::new(None),
		}
	}

	pub async fn add_team(&self, name: &str) -> Result<TeamId> {
		Ok(self.teams.add_team(name).await?)
	}

	pub async fn add_repository(&self, team_id: TeamId, url: &str) -> Result<RepoId> {
		self.repos
			.add_repository(team_id, url)
			.await
			.map_err(|e| match e {
				DbError::NotFound(what) => TrackerError::NotFound(what),
				other => other.into(),
			})
	}

	/// Register every team and repository. Already known entries are kept.
	#[instrument(skip(self, teams), fields(team_count = teams.len()))]
	pub async fn register(&self, teams: &[TeamRegistration]) -> Result<()> {
		for team in teams {
			let team_id = self.add_team(&team.name).await?;
			for url in &team.repos {
				self.add_repository(team_id, url).await?;
			}
		}
		info!("teams registered");
		Ok(())
	}

	pub async fn list_repositories(&self) -> Result<Vec<RepositorySummary>> {
		Ok(self.repos.list_repositories().await?)
	}

	pub async fn get_repository(&self, repo_id: RepoId) -> Result<Option<RepositorySummary>> {
		Ok(self.repos.get_repository(repo_id).await?)
	}

	/// Per-team commit totals in registration order. See [`rank_leaderboard`].
	pub async fn get_leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
		Ok(self.teams.leaderboard().await?)
	}

	pub async fn get_unprocessed_events(&self) -> Result<Vec<ActivityEvent>> {
		Ok(self.activity.get_unprocessed_events().await?)
	}

	pub async fn mark_events_processed(&self, ids: &[EventId]) -> Result<u64> {
		Ok(self.activity.mark_events_processed(ids).await?)
	}

	pub async fn get_recent_activity(&self, limit: u32) -> Result<Vec<ActivityHistoryEntry>> {
		Ok(self.activity.get_recent_activity(limit).await?)
	}

	pub async fn list_commits(&self, repo_id: RepoId, limit: u32) -> Result<Vec<CommitRecord>> {
		Ok(self.commits.list_commits(repo_id, limit).await?)
	}

	pub async fn stats(&self) -> Result<TrackerStats> {
		let total_teams = self.teams.count_teams().await?;
		let totals = self.repos.totals().await?;
		let budget = self.source.budget();
		Ok(TrackerStats {
			total_teams,
			total_repos: totals.repo_count,
			total_commits: totals.total_commits,
			api_calls_remaining: budget.map(|b| b.remaining),
			api_reset_at: budget.map(|b| b.reset_at),
		})
	}

	/// Check one repository now, outside the polling schedule.
	pub async fn check_repository(&self, repo_id: RepoId) -> u64 {
		self.reconciler.check_repository(repo_id).await
	}

	pub fn wake_signal(&self) -> Arc<WakeSignal> {
		Arc::clone(&self.signal)
	}

	pub fn source(&self) -> &Arc<dyn CommitSource> {
		&self.source
	}

	/// Spawn the polling loop. Does nothing if it is already running.
	#[instrument(skip(self))]
	pub async fn start(&self) {
		let mut running = self.running.lock().await;
		if let Some(existing) = running.as_ref() {
			if !existing.handle.is_finished() && !existing.token.is_cancelled() {
				info!("polling loop already running");
				return;
			}
		}
		if let Some(previous) = running.take() {
			previous.token.cancel();
			let _ = previous.handle.await;
		}

		let token = CancellationToken::new();
		let scheduler = Scheduler::new(
			Arc::clone(&self.reconciler),
			self.repos.clone(),
			Arc::clone(&self.source),
			self.scheduler_config.clone(),
		);
		let handle = tokio::spawn(scheduler.run(token.clone()));
		*running = Some(RunningLoop { token, handle });
	}

	/// Ask the polling loop to stop after the current repository.
	#[instrument(skip(self))]
	pub async fn stop(&self) {
		if let Some(running) = self.running.lock().await.as_ref() {
			running.token.cancel();
			info!("polling loop stop requested");
		}
	}

	pub async fn is_running(&self) -> bool {
		self.running
			.lock()
			.await
			.as_ref()
			.is_some_and(|r| !r.handle.is_finished() && !r.token.is_cancelled())
	}

	/// Stop the loop, wait for it and close the store.
	#[instrument(skip(self))]
	pub async fn close(self) {
		if let Some(running) = self.running.into_inner() {
			running.token.cancel();
			if let Err(e) = running.handle.await {
				warn!(error = %e, "polling loop ended abnormally");
			}
		}
		self.pool.close().await;
		info!("tracker closed");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::FakeSource;
	use hackboard_db::testing::create_test_pool;
	use hackboard_github::{Acquisition, RateBudget, SourceKind};
	use std::time::Duration;

	async fn tracker_with(source: Arc<FakeSource>) -> Tracker {
		let config = SchedulerConfig {
			tick: Duration::from_millis(10),
			..SchedulerConfig::default()
		};
		Tracker::from_pool(create_test_pool().await, source, config)
	}

	fn entry(name: &str, total: u64) -> LeaderboardEntry {
		LeaderboardEntry {
			team_name: name.to_string(),
			total_commits: total,
		}
	}

	#[test]
	fn test_rank_leaderboard_orders_and_truncates() {
		let ranked = rank_leaderboard(
			vec![entry("b", 3), entry("a", 3), entry("c", 9), entry("d", 0)],
			Some(3),
		);
		assert_eq!(ranked, vec![entry("c", 9), entry("a", 3), entry("b", 3)]);
		assert_eq!(rank_leaderboard(vec![entry("x", 1)], None).len(), 1);
	}

	#[tokio::test]
	async fn test_leaderboard_sums_repositories_per_team() {
		let source = Arc::new(FakeSource::new(SourceKind::Scrape));
		source.respond("https://github.com/t/one", Acquisition::Total(3));
		source.respond("https://github.com/t/two", Acquisition::Total(4));
		let tracker = tracker_with(source).await;

		tracker
			.register(&[
				TeamRegistration {
					name: "Builders".to_string(),
					repos: vec!["https://github.com/t/one".to_string(), "https://github.com/t/two".to_string()],
				},
				TeamRegistration {
					name: "Idle".to_string(),
					repos: vec![],
				},
			])
			.await
			.unwrap();

		for repo in tracker.list_repositories().await.unwrap() {
			tracker.check_repository(repo.id).await;
		}

		let board = tracker.get_leaderboard().await.unwrap();
		assert_eq!(board, vec![entry("Builders", 7), entry("Idle", 0)]);

		let stats = tracker.stats().await.unwrap();
		assert_eq!(stats.total_teams, 2);
		assert_eq!(stats.total_repos, 2);
		assert_eq!(stats.total_commits, 7);
		assert!(stats.api_calls_remaining.is_none());
	}

	#[tokio::test]
	async fn test_registration_is_idempotent() {
		let tracker = tracker_with(Arc::new(FakeSource::new(SourceKind::Scrape))).await;
		let teams = [TeamRegistration {
			name: "A".to_string(),
			repos: vec!["https://github.com/a/r".to_string()],
		}];

		tokio_test::assert_ok!(tracker.register(&teams).await);
		tokio_test::assert_ok!(tracker.register(&teams).await);

		assert_eq!(tracker.list_repositories().await.unwrap().len(), 1);
		assert_eq!(tracker.stats().await.unwrap().total_teams, 1);
	}

	#[tokio::test]
	async fn test_add_repository_for_unknown_team() {
		let tracker = tracker_with(Arc::new(FakeSource::new(SourceKind::Scrape))).await;
		let result = tracker.add_repository(42, "https://github.com/a/r").await;
		assert!(matches!(result, Err(TrackerError::NotFound(_))));
	}

	#[tokio::test]
	async fn test_stats_reports_source_budget() {
		let source = Arc::new(FakeSource::new(SourceKind::Api));
		let reset_at = Utc::now();
		source.set_budget(Some(RateBudget {
			limit: 5000,
			remaining: 4200,
			reset_at,
		}));
		let tracker = tracker_with(source).await;

		let stats = tracker.stats().await.unwrap();
		assert_eq!(stats.api_calls_remaining, Some(4200));
		assert_eq!(stats.api_reset_at, Some(reset_at));
	}

	#[tokio::test]
	async fn test_events_drain_through_tracker() {
		let source = Arc::new(FakeSource::new(SourceKind::Scrape));
		source.respond("https://github.com/t/r", Acquisition::Total(2));
		let tracker = tracker_with(source).await;
		let team = tracker.add_team("T").await.unwrap();
		let repo = tracker.add_repository(team, "https://github.com/t/r").await.unwrap();

		assert_eq!(tracker.check_repository(repo).await, 2);
		assert!(tracker.wake_signal().is_set());

		let events = tracker.get_unprocessed_events().await.unwrap();
		let ids: Vec<EventId> = events.iter().map(|e| e.id).collect();
		assert_eq!(tracker.mark_events_processed(&ids).await.unwrap(), 1);
		assert!(tracker.get_unprocessed_events().await.unwrap().is_empty());
		assert_eq!(tracker.get_recent_activity(5).await.unwrap().len(), 1);
		assert!(tracker.list_commits(repo, 5).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_start_stop_close() {
		let source = Arc::new(FakeSource::new(SourceKind::Scrape));
		source.respond("https://github.com/t/r", Acquisition::Total(1));
		let tracker = tracker_with(source.clone()).await;
		let team = tracker.add_team("T").await.unwrap();
		tracker.add_repository(team, "https://github.com/t/r").await.unwrap();

		tracker.start().await;
		tracker.start().await;
		assert!(tracker.is_running().await);

		assert!(tracker.wake_signal().wait(Duration::from_secs(5)).await);

		tracker.stop().await;
		assert!(!tracker.is_running().await);
		tokio::time::timeout(Duration::from_secs(5), tracker.close())
			.await
			.unwrap();

		assert_eq!(source.calls().len(), 1);
	}
}
