// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP client for the GitHub REST API and rendered repository pages.

use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode, Url};
use tracing::{debug, instrument, warn};

use crate::config::GithubClientConfig;
use crate::error::GithubError;
use crate::slug::RepoSlug;
use crate::types::{ApiCommit, CommitInfo, RateBudget, RateLimitResponse};

const GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const RATE_REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RATE_RESET_HEADER: &str = "x-ratelimit-reset";

/// Thin client over the handful of GitHub endpoints the tracker needs.
#[derive(Debug, Clone)]
pub struct GithubClient {
	http: Client,
	config: GithubClientConfig,
}

impl GithubClient {
	pub fn new(config: GithubClientConfig) -> Result<Self, GithubError> {
		let http = hackboard_common_http::new_client_with_timeout(config.timeout())
			.map_err(|e| GithubError::Config(format!("Failed to build HTTP client: {e}")))?;
		Ok(Self { http, config })
	}

	pub fn config(&self) -> &GithubClientConfig {
		&self.config
	}

	fn api_url(&self, path: &str) -> Result<Url, GithubError> {
		self.config
			.api_base_url()
			.join(path)
			.map_err(|e| GithubError::Config(format!("Invalid API path '{path}': {e}")))
	}

	fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
		let request = request
			.header(ACCEPT, GITHUB_JSON)
			.header(API_VERSION_HEADER, API_VERSION);
		match self.config.token() {
			Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
			None => request,
		}
	}

	/// Up to `per_page` commits on the default branch, newest first.
	#[instrument(skip(self), fields(repo = %slug))]
	pub async fn list_commits(
		&self,
		slug: &RepoSlug,
		since: Option<DateTime<Utc>>,
		per_page: u32,
	) -> Result<Vec<CommitInfo>, GithubError> {
		let mut url = self.api_url(&format!("repos/{}/{}/commits", slug.owner, slug.name))?;
		{
			let mut query = url.query_pairs_mut();
			query.append_pair("per_page", &per_page.to_string());
			if let Some(since) = since {
				query.append_pair("since", &since.to_rfc3339_opts(chrono::SecondsFormat::Secs, true));
			}
		}

		debug!(url = %url, "listing commits");
		let response = self.authorized(self.http.get(url)).send().await?;
		let response = check_status(response, &slug.to_string()).await?;

		let body = response.text().await?;
		let commits: Vec<ApiCommit> = serde_json::from_str(&body)
			.map_err(|e| GithubError::InvalidResponse(format!("JSON parse error: {e}")))?;

		debug!(count = commits.len(), "commits listed");
		Ok(commits.into_iter().map(CommitInfo::from).collect())
	}

	/// Current core budget. GitHub does not count this call against it.
	#[instrument(skip(self))]
	pub async fn rate_limit(&self) -> Result<RateBudget, GithubError> {
		let url = self.api_url("rate_limit")?;
		let response = self.authorized(self.http.get(url)).send().await?;
		let response = check_status(response, "rate_limit").await?;

		let body = response.text().await?;
		let parsed: RateLimitResponse = serde_json::from_str(&body)
			.map_err(|e| GithubError::InvalidResponse(format!("JSON parse error: {e}")))?;

		parsed
			.resources
			.core
			.into_budget()
			.ok_or_else(|| GithubError::InvalidResponse("rate limit reset out of range".to_string()))
	}

	/// Rendered HTML of the repository's landing page.
	#[instrument(skip(self), fields(repo = %slug))]
	pub async fn fetch_repo_page(&self, slug: &RepoSlug) -> Result<String, GithubError> {
		let url = self
			.config
			.web_base_url()
			.join(&format!("{}/{}", slug.owner, slug.name))
			.map_err(|e| GithubError::Config(format!("Invalid repository path: {e}")))?;

		debug!(url = %url, "fetching repository page");
		let response = self.http.get(url).send().await?;
		let response = check_status(response, &slug.to_string()).await?;
		Ok(response.text().await?)
	}
}

/// Map a non-success status onto [`GithubError`].
async fn check_status(response: Response, resource: &str) -> Result<Response, GithubError> {
	let status = response.status();
	if status.is_success() {
		return Ok(response);
	}

	let exhausted = rate_limit_exhausted(response.headers());
	let reset_at = rate_limit_reset(response.headers());
	let body = response.text().await.unwrap_or_default();

	let err = match status {
		StatusCode::UNAUTHORIZED => GithubError::Unauthorized,
		StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS if exhausted => {
			GithubError::RateLimited { reset_at }
		}
		StatusCode::TOO_MANY_REQUESTS => GithubError::RateLimited { reset_at },
		StatusCode::FORBIDDEN => GithubError::Forbidden,
		StatusCode::NOT_FOUND => GithubError::NotFound(resource.to_string()),
		other => GithubError::api_error(other.as_u16(), body),
	};

	warn!(status = status.as_u16(), resource, error = %err, "GitHub request failed");
	Err(err)
}

fn rate_limit_exhausted(headers: &HeaderMap) -> bool {
	headers
		.get(RATE_REMAINING_HEADER)
		.and_then(|v| v.to_str().ok())
		.and_then(|v| v.trim().parse::<u64>().ok())
		== Some(0)
}

fn rate_limit_reset(headers: &HeaderMap) -> Option<DateTime<Utc>> {
	let epoch = headers
		.get(RATE_RESET_HEADER)?
		.to_str()
		.ok()?
		.trim()
		.parse::<i64>()
		.ok()?;
	Utc.timestamp_opt(epoch, 0).single()
}
