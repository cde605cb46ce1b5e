// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for the GitHub client.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur when talking to GitHub.
#[derive(Debug, Error)]
pub enum GithubError {
	/// Network-level error during HTTP communication.
	#[error("Network error: {0}")]
	Network(#[source] reqwest::Error),

	/// Request timed out.
	#[error("Request timed out")]
	Timeout,

	/// Token rejected.
	#[error("Unauthorized or invalid token")]
	Unauthorized,

	/// Forbidden for a reason other than rate limiting.
	#[error("Forbidden or insufficient permissions")]
	Forbidden,

	/// Rate limit exceeded.
	#[error("Rate limit exceeded")]
	RateLimited { reset_at: Option<DateTime<Utc>> },

	/// Repository or resource does not exist.
	#[error("Not found: {0}")]
	NotFound(String),

	/// GitHub returned an unexpected status.
	#[error("GitHub API error: {status} - {message}")]
	ApiError { status: u16, message: String },

	/// Invalid or unparseable response.
	#[error("Invalid response from GitHub: {0}")]
	InvalidResponse(String),

	/// URL does not name a GitHub repository.
	#[error("Invalid repository URL: {0}")]
	InvalidRepoUrl(String),

	/// Configuration error.
	#[error("Configuration error: {0}")]
	Config(String),
}

impl From<reqwest::Error> for GithubError {
	fn from(e: reqwest::Error) -> Self {
		if e.is_timeout() {
			GithubError::Timeout
		} else {
			GithubError::Network(e)
		}
	}
}

impl GithubError {
	/// Create an API error from status code and message.
	pub fn api_error(status: u16, message: impl Into<String>) -> Self {
		Self::ApiError {
			status,
			message: message.into(),
		}
	}

	/// HTTP status behind this error, when there is one.
	pub fn status(&self) -> Option<u16> {
		match self {
			GithubError::Unauthorized => Some(401),
			GithubError::Forbidden => Some(403),
			GithubError::RateLimited { .. } => Some(403),
			GithubError::NotFound(_) => Some(404),
			GithubError::ApiError { status, .. } => Some(*status),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_codes() {
		assert_eq!(GithubError::Unauthorized.status(), Some(401));
		assert_eq!(GithubError::RateLimited { reset_at: None }.status(), Some(403));
		assert_eq!(GithubError::api_error(502, "Bad Gateway").status(), Some(502));
		assert_eq!(GithubError::Timeout.status(), None);
	}

	#[test]
	fn test_error_display() {
		let err = GithubError::api_error(500, "boom");
		assert_eq!(err.to_string(), "GitHub API error: 500 - boom");
		assert_eq!(
			GithubError::InvalidRepoUrl("nope".to_string()).to_string(),
			"Invalid repository URL: nope"
		);
	}
}
