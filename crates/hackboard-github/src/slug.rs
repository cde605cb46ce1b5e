// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::fmt;

use reqwest::Url;

use crate::error::GithubError;

/// `owner/name` pair identifying a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSlug {
	pub owner: String,
	pub name: String,
}

impl RepoSlug {
	/// Parse a repository URL such as `https://github.com/owner/repo`.
	///
	/// Trailing slashes and a `.git` suffix are accepted; anything past the
	/// repository segment (`/tree/main`, ...) is ignored.
	pub fn parse(url: &str) -> Result<Self, GithubError> {
		let parsed = Url::parse(url.trim()).map_err(|_| GithubError::InvalidRepoUrl(url.to_string()))?;
		if parsed.host_str().is_none() {
			return Err(GithubError::InvalidRepoUrl(url.to_string()));
		}

		let mut segments = parsed
			.path_segments()
			.ok_or_else(|| GithubError::InvalidRepoUrl(url.to_string()))?
			.filter(|s| !s.is_empty());

		let owner = segments.next();
		let name = segments.next().map(|n| n.strip_suffix(".git").unwrap_or(n));

		match (owner, name) {
			(Some(owner), Some(name)) if !name.is_empty() => Ok(Self {
				owner: owner.to_string(),
				name: name.to_string(),
			}),
			_ => Err(GithubError::InvalidRepoUrl(url.to_string())),
		}
	}
}

impl fmt::Display for RepoSlug {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.owner, self.name)
	}
}
