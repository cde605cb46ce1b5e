// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Gatekeeper for budgeted API calls.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, warn};

use crate::client::GithubClient;
use crate::error::GithubError;
use crate::types::RateBudget;

/// Below this many remaining calls, structured acquisition is skipped.
pub const SAFETY_THRESHOLD: u32 = 10;

const UNKNOWN: i64 = -1;

/// Anything that can report the current API budget.
#[async_trait]
pub trait RateLimitProbe: Send + Sync {
	async fn rate_limit(&self) -> Result<RateBudget, GithubError>;
}

#[async_trait]
impl RateLimitProbe for GithubClient {
	async fn rate_limit(&self) -> Result<RateBudget, GithubError> {
		GithubClient::rate_limit(self).await
	}
}

/// Tracks the last-known API budget and decides whether a call may proceed.
///
/// State lives in atomics so readers (stats, the scheduler) never wait on a
/// probe in flight.
pub struct RateGovernor {
	probe: Arc<dyn RateLimitProbe>,
	limit: AtomicI64,
	remaining: AtomicI64,
	reset_epoch: AtomicI64,
}

impl std::fmt::Debug for RateGovernor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RateGovernor")
			.field("snapshot", &self.snapshot())
			.finish()
	}
}

impl RateGovernor {
	pub fn new(probe: Arc<dyn RateLimitProbe>) -> Self {
		Self {
			probe,
			limit: AtomicI64::new(UNKNOWN),
			remaining: AtomicI64::new(UNKNOWN),
			reset_epoch: AtomicI64::new(UNKNOWN),
		}
	}

	/// Refresh the budget and report whether at least [`SAFETY_THRESHOLD`]
	/// calls remain. A failed probe counts as no budget.
	pub async fn has_budget(&self) -> bool {
		match self.probe.rate_limit().await {
			Ok(budget) => {
				self.record(&budget);
				if budget.remaining < SAFETY_THRESHOLD {
					warn!(
						remaining = budget.remaining,
						reset_at = %budget.reset_at,
						seconds_until_reset = seconds_until_reset(budget.reset_at, Utc::now()),
						"GitHub API budget nearly exhausted, skipping call"
					);
					return false;
				}
				debug!(remaining = budget.remaining, "GitHub API budget ok");
				true
			}
			Err(e) => {
				warn!(error = %e, "Failed to read GitHub rate limit, treating budget as exhausted");
				false
			}
		}
	}

	pub fn record(&self, budget: &RateBudget) {
		self.limit.store(i64::from(budget.limit), Ordering::Relaxed);
		self.remaining.store(i64::from(budget.remaining), Ordering::Relaxed);
		self.reset_epoch.store(budget.reset_at.timestamp(), Ordering::Relaxed);
	}

	/// Last observed remaining calls, if a probe has succeeded.
	pub fn remaining(&self) -> Option<u32> {
		u32::try_from(self.remaining.load(Ordering::Relaxed)).ok()
	}

	pub fn reset_at(&self) -> Option<DateTime<Utc>> {
		let epoch = self.reset_epoch.load(Ordering::Relaxed);
		if epoch == UNKNOWN {
			return None;
		}
		Utc.timestamp_opt(epoch, 0).single()
	}

	pub fn snapshot(&self) -> Option<RateBudget> {
		Some(RateBudget {
			limit: u32::try_from(self.limit.load(Ordering::Relaxed)).ok()?,
			remaining: self.remaining()?,
			reset_at: self.reset_at()?,
		})
	}
}

/// Whole seconds from `now` until `reset_at`, floored at zero.
pub fn seconds_until_reset(reset_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
	(reset_at - now).num_seconds().max(0)
}
