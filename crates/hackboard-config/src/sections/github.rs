// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! GitHub access configuration.

use std::time::Duration;

use hackboard_github::{
	GithubClientConfig, SourceKind, DEFAULT_API_BASE_URL, DEFAULT_COMMIT_LABEL, DEFAULT_WEB_BASE_URL,
};
use serde::Deserialize;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// GitHub configuration (runtime, fully resolved).
#[derive(Clone, PartialEq, Eq)]
pub struct GithubConfig {
	pub source: SourceKind,
	pub token: Option<String>,
	pub api_base_url: String,
	pub web_base_url: String,
	pub request_timeout: Duration,
	pub commit_label: String,
}

impl std::fmt::Debug for GithubConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GithubConfig")
			.field("source", &self.source)
			.field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
			.field("api_base_url", &self.api_base_url)
			.field("web_base_url", &self.web_base_url)
			.field("request_timeout", &self.request_timeout)
			.field("commit_label", &self.commit_label)
			.finish()
	}
}

impl Default for GithubConfig {
	fn default() -> Self {
		GithubConfigLayer::default().finalize()
	}
}

impl GithubConfig {
	pub fn client_config(&self) -> GithubClientConfig {
		GithubClientConfig::new()
			.with_token(self.token.clone())
			.with_api_base_url(self.api_base_url.as_str())
			.with_web_base_url(self.web_base_url.as_str())
			.with_timeout(self.request_timeout)
	}
}

/// GitHub configuration layer (partial, for merging).
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
pub struct GithubConfigLayer {
	#[serde(default)]
	pub source: Option<SourceKind>,
	#[serde(default)]
	pub token: Option<String>,
	#[serde(default)]
	pub api_base_url: Option<String>,
	#[serde(default)]
	pub web_base_url: Option<String>,
	#[serde(default)]
	pub request_timeout_secs: Option<u64>,
	#[serde(default)]
	pub commit_label: Option<String>,
}

impl std::fmt::Debug for GithubConfigLayer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GithubConfigLayer")
			.field("source", &self.source)
			.field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
			.field("api_base_url", &self.api_base_url)
			.field("web_base_url", &self.web_base_url)
			.field("request_timeout_secs", &self.request_timeout_secs)
			.field("commit_label", &self.commit_label)
			.finish()
	}
}

impl GithubConfigLayer {
	pub fn merge(&mut self, other: GithubConfigLayer) {
		if other.source.is_some() {
			self.source = other.source;
		}
		if other.token.is_some() {
			self.token = other.token;
		}
		if other.api_base_url.is_some() {
			self.api_base_url = other.api_base_url;
		}
		if other.web_base_url.is_some() {
			self.web_base_url = other.web_base_url;
		}
		if other.request_timeout_secs.is_some() {
			self.request_timeout_secs = other.request_timeout_secs;
		}
		if other.commit_label.is_some() {
			self.commit_label = other.commit_label;
		}
	}

	pub fn finalize(self) -> GithubConfig {
		GithubConfig {
			source: self.source.unwrap_or_default(),
			token: self.token.filter(|t| !t.trim().is_empty()),
			api_base_url: self
				.api_base_url
				.unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
			web_base_url: self
				.web_base_url
				.unwrap_or_else(|| DEFAULT_WEB_BASE_URL.to_string()),
			request_timeout: Duration::from_secs(
				self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
			),
			commit_label: self
				.commit_label
				.unwrap_or_else(|| DEFAULT_COMMIT_LABEL.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = GithubConfig::default();
		assert_eq!(config.source, SourceKind::Api);
		assert!(config.token.is_none());
		assert_eq!(config.request_timeout, Duration::from_secs(10));
		assert_eq!(config.commit_label, "Commits");
	}

	#[test]
	fn test_deserialize_source() {
		let layer: GithubConfigLayer = toml::from_str(r#"source = "scrape""#).unwrap();
		assert_eq!(layer.source, Some(SourceKind::Scrape));
		assert!(toml::from_str::<GithubConfigLayer>(r#"source = "rss""#).is_err());
	}

	#[test]
	fn test_client_config_carries_settings() {
		let config = GithubConfigLayer {
			token: Some("ghp_x".to_string()),
			api_base_url: Some("https://ghe.example.com/api/v3".to_string()),
			request_timeout_secs: Some(3),
			..Default::default()
		}
		.finalize();

		let client = config.client_config();
		assert!(client.has_token());
		assert_eq!(client.api_base_url().as_str(), "https://ghe.example.com/api/v3/");
		assert_eq!(client.timeout(), Duration::from_secs(3));
	}

	#[test]
	fn test_debug_redacts_token() {
		let layer = GithubConfigLayer {
			token: Some("ghp_supersecret".to_string()),
			..Default::default()
		};
		assert!(!format!("{layer:?}").contains("ghp_supersecret"));
		assert!(!format!("{:?}", layer.finalize()).contains("ghp_supersecret"));
	}
}
