// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database configuration.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_URL: &str = "sqlite:./hackboard.db";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Database configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
	pub url: String,
	pub busy_timeout: Duration,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		DatabaseConfigLayer::default().finalize()
	}
}

/// Database configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct DatabaseConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub busy_timeout_ms: Option<u64>,
}

impl DatabaseConfigLayer {
	pub fn merge(&mut self, other: DatabaseConfigLayer) {
		if other.url.is_some() {
			self.url = other.url;
		}
		if other.busy_timeout_ms.is_some() {
			self.busy_timeout_ms = other.busy_timeout_ms;
		}
	}

	pub fn finalize(self) -> DatabaseConfig {
		DatabaseConfig {
			url: self.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
			busy_timeout: Duration::from_millis(self.busy_timeout_ms.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_url() {
		let config = DatabaseConfigLayer::default().finalize();
		assert_eq!(config.url, "sqlite:./hackboard.db");
		assert_eq!(config.busy_timeout, Duration::from_secs(5));
	}

	#[test]
	fn test_custom_url() {
		let layer = DatabaseConfigLayer {
			url: Some("sqlite:/var/lib/hackboard/data.db".to_string()),
			busy_timeout_ms: Some(250),
		};
		let config = layer.finalize();
		assert_eq!(config.url, "sqlite:/var/lib/hackboard/data.db");
		assert_eq!(config.busy_timeout, Duration::from_millis(250));
	}
}
