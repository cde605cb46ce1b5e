// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration for the GitHub client.

use std::time::Duration;

use reqwest::Url;
use tracing::warn;

use crate::error::GithubError;

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com/";
pub const DEFAULT_WEB_BASE_URL: &str = "https://github.com/";

const REDACTED: &str = "[REDACTED]";

/// Configuration for the GitHub client.
///
/// The token is optional: unauthenticated calls work but get a much smaller
/// rate-limit budget.
#[derive(Clone)]
pub struct GithubClientConfig {
	token: Option<String>,
	api_base_url: Url,
	web_base_url: Url,
	timeout: Duration,
}

impl std::fmt::Debug for GithubClientConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GithubClientConfig")
			.field("token", &self.token.as_ref().map(|_| REDACTED))
			.field("api_base_url", &self.api_base_url.as_str())
			.field("web_base_url", &self.web_base_url.as_str())
			.field("timeout", &self.timeout)
			.finish()
	}
}

impl Default for GithubClientConfig {
	fn default() -> Self {
		Self::new()
	}
}

impl GithubClientConfig {
	/// Validate and normalize a base URL.
	///
	/// Requirements:
	/// - Must be a valid URL
	/// - Must use an HTTP(S) scheme
	/// - Must have a host
	/// - The path always ends in `/` so relative joins append to it
	fn validate_and_normalize_base_url(raw: &str) -> Result<Url, GithubError> {
		let mut url = Url::parse(raw)
			.map_err(|e| GithubError::Config(format!("Invalid GitHub base URL '{raw}': {e}")))?;

		if url.scheme() != "https" && url.scheme() != "http" {
			return Err(GithubError::Config(format!(
				"GitHub base URL must use http or https, got '{}'",
				url.scheme()
			)));
		}

		if url.host_str().is_none() {
			return Err(GithubError::Config(
				"GitHub base URL must include a host".to_string(),
			));
		}

		if !url.path().ends_with('/') {
			let path = format!("{}/", url.path());
			url.set_path(&path);
		}

		Ok(url)
	}

	/// Defaults: public github.com, no token, the shared request timeout.
	pub fn new() -> Self {
		Self {
			token: None,
			api_base_url: Url::parse(DEFAULT_API_BASE_URL).expect("default URL is valid"),
			web_base_url: Url::parse(DEFAULT_WEB_BASE_URL).expect("default URL is valid"),
			timeout: hackboard_common_http::DEFAULT_TIMEOUT,
		}
	}

	/// Set the API token. Empty strings are treated as no token.
	pub fn with_token(mut self, token: Option<String>) -> Self {
		self.token = token.filter(|t| !t.trim().is_empty());
		self
	}

	/// Set a custom API base URL (for GitHub Enterprise or testing).
	///
	/// If validation fails, logs a warning and keeps the previous value.
	pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
		let url_str = url.into();
		match Self::validate_and_normalize_base_url(&url_str) {
			Ok(validated) => self.api_base_url = validated,
			Err(e) => {
				warn!(error = %e, url = %url_str, "Invalid api_base_url, keeping previous value");
			}
		}
		self
	}

	/// Set a custom base URL for rendered repository pages.
	///
	/// If validation fails, logs a warning and keeps the previous value.
	pub fn with_web_base_url(mut self, url: impl Into<String>) -> Self {
		let url_str = url.into();
		match Self::validate_and_normalize_base_url(&url_str) {
			Ok(validated) => self.web_base_url = validated,
			Err(e) => {
				warn!(error = %e, url = %url_str, "Invalid web_base_url, keeping previous value");
			}
		}
		self
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	pub(crate) fn token(&self) -> Option<&str> {
		self.token.as_deref()
	}

	pub fn has_token(&self) -> bool {
		self.token.is_some()
	}

	pub fn api_base_url(&self) -> &Url {
		&self.api_base_url
	}

	pub fn web_base_url(&self) -> &Url {
		&self.web_base_url
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_config_defaults() {
		let config = GithubClientConfig::new();
		assert_eq!(config.api_base_url().as_str(), DEFAULT_API_BASE_URL);
		assert_eq!(config.web_base_url().as_str(), DEFAULT_WEB_BASE_URL);
		assert_eq!(config.timeout(), Duration::from_secs(10));
		assert!(!config.has_token());
	}

	#[test]
	fn test_base_url_gets_trailing_slash() {
		let config = GithubClientConfig::new().with_api_base_url("https://github.example.com/api/v3");
		assert_eq!(
			config.api_base_url().as_str(),
			"https://github.example.com/api/v3/"
		);
	}

	#[test]
	fn test_base_url_validation_rejects_other_schemes() {
		let result = GithubClientConfig::validate_and_normalize_base_url("ftp://github.com");
		assert!(result.unwrap_err().to_string().contains("http"));
	}

	#[test]
	fn test_base_url_validation_rejects_invalid_url() {
		assert!(GithubClientConfig::validate_and_normalize_base_url("not-a-url").is_err());
	}

	#[test]
	fn test_invalid_base_url_keeps_previous() {
		let config = GithubClientConfig::new().with_web_base_url("nonsense");
		assert_eq!(config.web_base_url().as_str(), DEFAULT_WEB_BASE_URL);
	}

	#[test]
	fn test_blank_token_is_ignored() {
		let config = GithubClientConfig::new().with_token(Some("  ".to_string()));
		assert!(!config.has_token());
	}

	/// Tokens must never show up in logs.
	#[test]
	fn test_debug_redacts_token() {
		let config = GithubClientConfig::new().with_token(Some("ghp_supersecret".to_string()));
		let debug_str = format!("{config:?}");

		assert!(!debug_str.contains("ghp_supersecret"));
		assert!(debug_str.contains(REDACTED));
	}
}
