// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod args;
mod report;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use hackboard_config::{HackboardConfig, LogFormat, LoggingConfig};
use hackboard_github::{build_source, CommitCountExtractor, GithubClient};
use hackboard_tracker::{
	rank_leaderboard, SchedulerConfig, TeamRegistration, Tracker, TrackerConfig,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use args::Args;

/// Longest the console waits for new activity before redrawing anyway.
const REFRESH_INTERVAL: Duration = Duration::from_secs(10);

fn init_tracing(logging: &LoggingConfig) {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
	let builder = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr);
	match logging.format {
		LogFormat::Json => builder.json().init(),
		LogFormat::Text => builder.init(),
	}
}

fn tracker_config(config: &HackboardConfig) -> TrackerConfig {
	TrackerConfig {
		database_url: config.database.url.clone(),
		busy_timeout: config.database.busy_timeout,
		scheduler: SchedulerConfig {
			interval: Duration::from_secs(config.polling.interval_secs),
			tick: Duration::from_millis(config.polling.tick_ms),
			backoff_multiplier: config.polling.backoff_multiplier,
		},
	}
}

fn registrations(config: &HackboardConfig) -> Vec<TeamRegistration> {
	config
		.teams
		.iter()
		.map(|team| TeamRegistration {
			name: team.name.trim().to_string(),
			repos: team.repos.clone(),
		})
		.collect()
}

/// Print the board and the activity since the last refresh, then acknowledge
/// what was printed.
async fn refresh(tracker: &Tracker, top: usize) -> anyhow::Result<()> {
	let board = rank_leaderboard(tracker.get_leaderboard().await?, Some(top));
	println!("{}", report::format_leaderboard(&board));

	let events = tracker.get_unprocessed_events().await?;
	if events.is_empty() {
		return Ok(());
	}
	for event in &events {
		println!("{}", report::format_event(event));
	}
	let ids: Vec<_> = events.iter().map(|e| e.id).collect();
	tracker.mark_events_processed(&ids).await?;
	Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	let config = hackboard_config::load_config_with_overrides(&args.config, args.overrides())
		.with_context(|| format!("loading configuration from {}", args.config.display()))?;
	init_tracing(&config.logging);

	info!(
		config = %args.config.display(),
		database = %config.database.url,
		source = %config.github.source,
		teams = config.teams.len(),
		"starting hackboard"
	);
	if config.teams.is_empty() {
		warn!("no teams configured, the leaderboard will stay empty");
	}

	let client = Arc::new(GithubClient::new(config.github.client_config())?);
	let extractor = CommitCountExtractor::new(&config.github.commit_label)?;
	let source = build_source(config.github.source, client, extractor);

	let tracker = Tracker::open(&tracker_config(&config), source)
		.await
		.with_context(|| format!("opening store at {}", config.database.url))?;
	tracker
		.register(&registrations(&config))
		.await
		.context("registering teams")?;
	tracker.start().await;

	let signal = tracker.wake_signal();
	let shutdown = tokio::signal::ctrl_c();
	tokio::pin!(shutdown);

	loop {
		tokio::select! {
			_ = &mut shutdown => {
				info!("Received shutdown signal");
				break;
			}
			woke = signal.wait(REFRESH_INTERVAL) => {
				if woke {
					signal.clear();
				}
				if let Err(e) = refresh(&tracker, args.top).await {
					error!(error = %e, "failed to refresh leaderboard");
				}
			}
		}
	}

	tracker.stop().await;
	tracker.close().await;
	info!("hackboard stopped");
	Ok(())
}
