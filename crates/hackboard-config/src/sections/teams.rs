// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Competing teams and their repositories.

use std::collections::HashSet;

use hackboard_github::RepoSlug;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamConfig {
	pub name: String,
	#[serde(default)]
	pub repos: Vec<String>,
}

/// Team names must be non-empty and unique; every repository URL must name a
/// GitHub repository and belong to exactly one team.
pub fn validate_teams(teams: &[TeamConfig]) -> Result<(), ConfigError> {
	let mut names = HashSet::new();
	let mut urls = HashSet::new();

	for team in teams {
		let name = team.name.trim();
		if name.is_empty() {
			return Err(ConfigError::Validation("team name must not be empty".to_string()));
		}
		if !names.insert(name) {
			return Err(ConfigError::Validation(format!("duplicate team '{name}'")));
		}

		for url in &team.repos {
			RepoSlug::parse(url).map_err(|e| ConfigError::InvalidValue {
				key: format!("teams.{name}.repos"),
				message: e.to_string(),
			})?;
			if !urls.insert(url.trim_end_matches('/')) {
				return Err(ConfigError::Validation(format!(
					"repository '{url}' is listed more than once"
				)));
			}
		}
	}

	Ok(())
}
