// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Polling loop timing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PollingConfigLayer {
	pub interval_secs: Option<u64>,
	pub tick_ms: Option<u64>,
	pub backoff_multiplier: Option<u32>,
}

impl PollingConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.interval_secs.is_some() {
			self.interval_secs = other.interval_secs;
		}
		if other.tick_ms.is_some() {
			self.tick_ms = other.tick_ms;
		}
		if other.backoff_multiplier.is_some() {
			self.backoff_multiplier = other.backoff_multiplier;
		}
	}

	pub fn finalize(self) -> PollingConfig {
		PollingConfig {
			interval_secs: self.interval_secs.unwrap_or(15),
			tick_ms: self.tick_ms.unwrap_or(1000),
			backoff_multiplier: self.backoff_multiplier.unwrap_or(5),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollingConfig {
	pub interval_secs: u64,
	pub tick_ms: u64,
	pub backoff_multiplier: u32,
}

impl Default for PollingConfig {
	fn default() -> Self {
		PollingConfigLayer::default().finalize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_values() {
		let config = PollingConfig::default();
		assert_eq!(config.interval_secs, 15);
		assert_eq!(config.tick_ms, 1000);
		assert_eq!(config.backoff_multiplier, 5);
	}

	#[test]
	fn test_merge_overwrites() {
		let mut base = PollingConfigLayer {
			interval_secs: Some(30),
			tick_ms: Some(500),
			..Default::default()
		};
		base.merge(PollingConfigLayer {
			interval_secs: Some(60),
			..Default::default()
		});
		assert_eq!(base.interval_secs, Some(60));
		assert_eq!(base.tick_ms, Some(500));
		assert_eq!(base.backoff_multiplier, None);
	}

	#[test]
	fn test_deserialize_layer_partial() {
		let layer: PollingConfigLayer = toml::from_str("interval_secs = 45").unwrap();
		assert_eq!(layer.interval_secs, Some(45));
		assert!(layer.tick_ms.is_none());
	}
}
