// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Interchangeable ways of learning about new commits.
//!
//! [`ApiCommitSource`] lists individual commits through the REST API and is
//! gated by the [`RateGovernor`]. [`ScrapeCommitSource`] reads the total off
//! the repository's landing page and needs no budget. Both fail soft: every
//! problem becomes [`Acquisition::NoData`] so a caller can skip the cycle.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::client::GithubClient;
use crate::error::GithubError;
use crate::governor::{seconds_until_reset, RateGovernor};
use crate::scrape::CommitCountExtractor;
use crate::slug::RepoSlug;
use crate::types::{CommitInfo, RateBudget};

/// Most recent commits requested per structured call.
pub const COMMITS_PER_CHECK: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
	#[default]
	Api,
	Scrape,
}

impl SourceKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			SourceKind::Api => "api",
			SourceKind::Scrape => "scrape",
		}
	}
}

impl fmt::Display for SourceKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for SourceKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"api" => Ok(SourceKind::Api),
			"scrape" => Ok(SourceKind::Scrape),
			other => Err(format!("unknown commit source '{other}', expected 'api' or 'scrape'")),
		}
	}
}

/// Why an acquisition produced nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoDataReason {
	/// The governor refused the call.
	BudgetExhausted,
	InvalidUrl,
	/// GitHub answered with a rate-limit error.
	RateLimited,
	Transport(String),
	UnexpectedStatus(u16),
	/// Page fetched but the commit total could not be found in it.
	MissingMarkup,
}

impl fmt::Display for NoDataReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NoDataReason::BudgetExhausted => f.write_str("API budget exhausted"),
			NoDataReason::InvalidUrl => f.write_str("invalid repository URL"),
			NoDataReason::RateLimited => f.write_str("rate limited"),
			NoDataReason::Transport(e) => write!(f, "transport error: {e}"),
			NoDataReason::UnexpectedStatus(status) => write!(f, "unexpected status {status}"),
			NoDataReason::MissingMarkup => f.write_str("commit count not found in page"),
		}
	}
}

impl From<&GithubError> for NoDataReason {
	fn from(e: &GithubError) -> Self {
		match e {
			GithubError::RateLimited { .. } => NoDataReason::RateLimited,
			GithubError::InvalidRepoUrl(_) => NoDataReason::InvalidUrl,
			other => match other.status() {
				Some(status) => NoDataReason::UnexpectedStatus(status),
				None => NoDataReason::Transport(other.to_string()),
			},
		}
	}
}

/// Result of one acquisition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquisition {
	/// Individual commits, newest first.
	Commits(Vec<CommitInfo>),
	/// A scalar commit total for the repository.
	Total(u64),
	NoData(NoDataReason),
}

#[async_trait]
pub trait CommitSource: Send + Sync {
	fn kind(&self) -> SourceKind;

	/// Fetch activity for `repo_url`. `since` bounds structured listings and
	/// is ignored by sources that report a total.
	async fn fetch(&self, repo_url: &str, since: Option<DateTime<Utc>>) -> Acquisition;

	/// Last known API budget, when this source spends one.
	fn budget(&self) -> Option<RateBudget>;
}

fn log_failure(repo_url: &str, err: &GithubError) {
	match err {
		GithubError::RateLimited { reset_at } => {
			let wait = reset_at.map(|r| seconds_until_reset(r, Utc::now()));
			warn!(repo_url, seconds_until_reset = ?wait, "GitHub rate limit hit");
		}
		other => warn!(repo_url, error = %other, "commit acquisition failed"),
	}
}

/// Commits listed through the REST API.
#[derive(Debug)]
pub struct ApiCommitSource {
	client: Arc<GithubClient>,
	governor: Arc<RateGovernor>,
}

impl ApiCommitSource {
	pub fn new(client: Arc<GithubClient>) -> Self {
		let governor = Arc::new(RateGovernor::new(client.clone()));
		Self { client, governor }
	}

	pub fn with_governor(client: Arc<GithubClient>, governor: Arc<RateGovernor>) -> Self {
		Self { client, governor }
	}

	pub fn governor(&self) -> &Arc<RateGovernor> {
		&self.governor
	}
}

#[async_trait]
impl CommitSource for ApiCommitSource {
	fn kind(&self) -> SourceKind {
		SourceKind::Api
	}

	#[tracing::instrument(skip(self), fields(source = "api"))]
	async fn fetch(&self, repo_url: &str, since: Option<DateTime<Utc>>) -> Acquisition {
		let slug = match RepoSlug::parse(repo_url) {
			Ok(slug) => slug,
			Err(e) => {
				log_failure(repo_url, &e);
				return Acquisition::NoData(NoDataReason::InvalidUrl);
			}
		};

		if !self.governor.has_budget().await {
			info!(repo = %slug, "skipping structured check, API budget low");
			return Acquisition::NoData(NoDataReason::BudgetExhausted);
		}

		match self.client.list_commits(&slug, since, COMMITS_PER_CHECK).await {
			Ok(commits) => {
				debug!(repo = %slug, count = commits.len(), "commits fetched");
				Acquisition::Commits(commits)
			}
			Err(e) => {
				log_failure(repo_url, &e);
				Acquisition::NoData(NoDataReason::from(&e))
			}
		}
	}

	fn budget(&self) -> Option<RateBudget> {
		self.governor.snapshot()
	}
}

/// Commit total read from the repository landing page.
#[derive(Debug)]
pub struct ScrapeCommitSource {
	client: Arc<GithubClient>,
	extractor: CommitCountExtractor,
}

impl ScrapeCommitSource {
	pub fn new(client: Arc<GithubClient>, extractor: CommitCountExtractor) -> Self {
		Self { client, extractor }
	}
}

#[async_trait]
impl CommitSource for ScrapeCommitSource {
	fn kind(&self) -> SourceKind {
		SourceKind::Scrape
	}

	#[tracing::instrument(skip(self, _since), fields(source = "scrape"))]
	async fn fetch(&self, repo_url: &str, _since: Option<DateTime<Utc>>) -> Acquisition {
		let slug = match RepoSlug::parse(repo_url) {
			Ok(slug) => slug,
			Err(e) => {
				log_failure(repo_url, &e);
				return Acquisition::NoData(NoDataReason::InvalidUrl);
			}
		};

		let html = match self.client.fetch_repo_page(&slug).await {
			Ok(html) => html,
			Err(e) => {
				log_failure(repo_url, &e);
				return Acquisition::NoData(NoDataReason::from(&e));
			}
		};

		match self.extractor.extract(&html) {
			Some(total) => {
				debug!(repo = %slug, total, "commit total scraped");
				Acquisition::Total(total)
			}
			None => {
				warn!(repo = %slug, label = self.extractor.label(), "commit count not found in page");
				Acquisition::NoData(NoDataReason::MissingMarkup)
			}
		}
	}

	fn budget(&self) -> Option<RateBudget> {
		None
	}
}

/// Build the source for `kind` around a shared client.
pub fn build_source(
	kind: SourceKind,
	client: Arc<GithubClient>,
	extractor: CommitCountExtractor,
) -> Arc<dyn CommitSource> {
	match kind {
		SourceKind::Api => Arc::new(ApiCommitSource::new(client)),
		SourceKind::Scrape => Arc::new(ScrapeCommitSource::new(client, extractor)),
	}
}
