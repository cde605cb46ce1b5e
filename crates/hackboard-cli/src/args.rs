// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use clap::Parser;
use hackboard_config::{DatabaseConfigLayer, GithubConfigLayer, HackboardConfigLayer};
use hackboard_github::SourceKind;

/// Hackboard - live commit leaderboard for hackathon teams
#[derive(Parser, Debug)]
#[command(name = "hackboard", version)]
pub struct Args {
	/// Path to the TOML config file
	#[arg(long, env = "HACKBOARD_CONFIG", default_value = "hackboard.toml")]
	pub config: PathBuf,

	/// Commit source: api or scrape
	#[arg(long)]
	pub source: Option<SourceKind>,

	/// SQLite database URL, e.g. sqlite:./hackboard.db
	#[arg(long)]
	pub database_url: Option<String>,

	/// Number of teams shown on the leaderboard
	#[arg(long, default_value_t = 10)]
	pub top: usize,
}

impl Args {
	/// Settings given on the command line, as the highest-precedence layer.
	pub fn overrides(&self) -> HackboardConfigLayer {
		HackboardConfigLayer {
			database: self.database_url.as_ref().map(|url| DatabaseConfigLayer {
				url: Some(url.clone()),
				busy_timeout_ms: None,
			}),
			github: self.source.map(|source| GithubConfigLayer {
				source: Some(source),
				..Default::default()
			}),
			..Default::default()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_overrides_from_flags() {
		let args = Args::try_parse_from([
			"hackboard",
			"--config",
			"/etc/hackboard.toml",
			"--source",
			"scrape",
			"--database-url",
			"sqlite:/tmp/board.db",
		])
		.unwrap();

		assert_eq!(args.config, PathBuf::from("/etc/hackboard.toml"));
		let overrides = args.overrides();
		assert_eq!(overrides.github.unwrap().source, Some(SourceKind::Scrape));
		assert_eq!(
			overrides.database.unwrap().url.as_deref(),
			Some("sqlite:/tmp/board.db")
		);
	}

	#[test]
	fn test_no_flags_means_no_overrides() {
		let args = Args::try_parse_from(["hackboard"]).unwrap();
		assert_eq!(args.top, 10);
		assert_eq!(args.overrides(), HackboardConfigLayer::default());
	}

	#[test]
	fn test_unknown_source_rejected() {
		assert!(Args::try_parse_from(["hackboard", "--source", "rss"]).is_err());
	}
}
