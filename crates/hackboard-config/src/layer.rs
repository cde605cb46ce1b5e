// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Deserialize;

use crate::sections::{
	DatabaseConfigLayer, GithubConfigLayer, LoggingConfigLayer, PollingConfigLayer, TeamConfig,
};

/// One source's view of the configuration. Every field is optional so layers
/// can be stacked with [`HackboardConfigLayer::merge`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct HackboardConfigLayer {
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub github: Option<GithubConfigLayer>,
	#[serde(default)]
	pub polling: Option<PollingConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
	/// Replaced wholesale, never merged entry by entry.
	#[serde(default)]
	pub teams: Option<Vec<TeamConfig>>,
}

fn merge_section<T>(slot: &mut Option<T>, other: Option<T>, merge: impl FnOnce(&mut T, T)) {
	if let Some(other) = other {
		match slot {
			Some(current) => merge(current, other),
			None => *slot = Some(other),
		}
	}
}

impl HackboardConfigLayer {
	/// Overlay `other` on top of `self`; values set in `other` win.
	pub fn merge(&mut self, other: HackboardConfigLayer) {
		merge_section(&mut self.database, other.database, DatabaseConfigLayer::merge);
		merge_section(&mut self.github, other.github, GithubConfigLayer::merge);
		merge_section(&mut self.polling, other.polling, PollingConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
		if other.teams.is_some() {
			self.teams = other.teams;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use hackboard_github::SourceKind;

	#[test]
	fn test_merge_keeps_unset_fields() {
		let mut base: HackboardConfigLayer = toml::from_str(
			r#"
[database]
url = "sqlite:/data/a.db"
busy_timeout_ms = 1000

[github]
source = "scrape"

[[teams]]
name = "A"
repos = ["https://github.com/o/a"]
"#,
		)
		.unwrap();

		base.merge(HackboardConfigLayer {
			database: Some(DatabaseConfigLayer {
				url: Some("sqlite:/data/b.db".to_string()),
				busy_timeout_ms: None,
			}),
			..Default::default()
		});

		let database = base.database.clone().unwrap();
		assert_eq!(database.url.as_deref(), Some("sqlite:/data/b.db"));
		assert_eq!(database.busy_timeout_ms, Some(1000));
		assert_eq!(base.github.as_ref().unwrap().source, Some(SourceKind::Scrape));
		assert_eq!(base.teams.as_ref().unwrap().len(), 1);
	}

	#[test]
	fn test_teams_are_replaced() {
		let mut base = HackboardConfigLayer {
			teams: Some(vec![TeamConfig {
				name: "Old".to_string(),
				repos: vec![],
			}]),
			..Default::default()
		};
		base.merge(HackboardConfigLayer {
			teams: Some(vec![]),
			..Default::default()
		});
		assert_eq!(base.teams, Some(vec![]));
	}
}
