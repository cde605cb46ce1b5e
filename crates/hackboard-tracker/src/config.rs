// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::time::Duration;

pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(15);
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);
pub const DEFAULT_BACKOFF_MULTIPLIER: u32 = 5;

/// Timing of the polling loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
	/// How long a repository rests between checks.
	pub interval: Duration,
	/// Sleep between passes over the repository list.
	pub tick: Duration,
	/// Interval multiplier applied while the API budget is running low.
	pub backoff_multiplier: u32,
}

impl Default for SchedulerConfig {
	fn default() -> Self {
		Self {
			interval: DEFAULT_CHECK_INTERVAL,
			tick: DEFAULT_TICK,
			backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
		}
	}
}

impl SchedulerConfig {
	pub fn effective_interval(&self, approaching_limit: bool) -> Duration {
		if approaching_limit {
			self.interval.saturating_mul(self.backoff_multiplier.max(1))
		} else {
			self.interval
		}
	}
}

#[derive(Debug, Clone)]
pub struct TrackerConfig {
	pub database_url: String,
	pub busy_timeout: Duration,
	pub scheduler: SchedulerConfig,
}

impl TrackerConfig {
	pub fn new(database_url: impl Into<String>) -> Self {
		Self {
			database_url: database_url.into(),
			busy_timeout: hackboard_db::DEFAULT_BUSY_TIMEOUT,
			scheduler: SchedulerConfig::default(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_effective_interval_backs_off() {
		let config = SchedulerConfig::default();
		assert_eq!(config.effective_interval(false), Duration::from_secs(15));
		assert_eq!(config.effective_interval(true), Duration::from_secs(75));
	}

	#[test]
	fn test_zero_multiplier_never_shortens() {
		let config = SchedulerConfig {
			backoff_multiplier: 0,
			..Default::default()
		};
		assert_eq!(config.effective_interval(true), config.interval);
	}
}
