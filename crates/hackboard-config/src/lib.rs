// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for Hackboard.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file,
//!   environment, command line)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`HACKBOARD_*`)
//!
//! # Usage
//!
//! ```ignore
//! use hackboard_config::load_config_with_file;
//!
//! let config = load_config_with_file("hackboard.toml")?;
//! println!("tracking {} teams", config.teams.len());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::HackboardConfigLayer;
pub use sections::*;
pub use sources::{CliSource, ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default)]
pub struct HackboardConfig {
	pub database: DatabaseConfig,
	pub github: GithubConfig,
	pub polling: PollingConfig,
	pub logging: LoggingConfig,
	pub teams: Vec<TeamConfig>,
}

/// Load configuration with a custom config file path.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`HACKBOARD_*`)
/// 2. Config file
/// 3. Built-in defaults
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<HackboardConfig, ConfigError> {
	load_config_with_overrides(config_path, HackboardConfigLayer::default())
}

/// Like [`load_config_with_file`], with command-line overrides on top.
pub fn load_config_with_overrides(
	config_path: impl Into<std::path::PathBuf>,
	overrides: HackboardConfigLayer,
) -> Result<HackboardConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
		Box::new(CliSource(overrides)),
	];
	load_from_sources(sources)
}

/// Merge `sources` in precedence order and resolve the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<HackboardConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = HackboardConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: HackboardConfigLayer) -> Result<HackboardConfig, ConfigError> {
	let database = layer.database.unwrap_or_default().finalize();
	let github = layer.github.unwrap_or_default().finalize();
	let polling = layer.polling.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let teams = layer.teams.unwrap_or_default();

	validate_config(&polling)?;
	validate_teams(&teams)?;

	info!(
		database = %database.url,
		source = %github.source,
		github_token_configured = github.token.is_some(),
		interval_secs = polling.interval_secs,
		team_count = teams.len(),
		"configuration loaded"
	);

	Ok(HackboardConfig {
		database,
		github,
		polling,
		logging,
		teams,
	})
}

fn validate_config(polling: &PollingConfig) -> Result<(), ConfigError> {
	if polling.interval_secs == 0 {
		return Err(ConfigError::Validation(
			"polling.interval_secs must be at least 1".to_string(),
		));
	}
	if polling.tick_ms == 0 {
		return Err(ConfigError::Validation(
			"polling.tick_ms must be at least 1".to_string(),
		));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use hackboard_github::SourceKind;
	use std::io::Write;

	struct FixedSource(Precedence, HackboardConfigLayer);

	impl ConfigSource for FixedSource {
		fn name(&self) -> &'static str {
			"fixed"
		}

		fn precedence(&self) -> Precedence {
			self.0
		}

		fn load(&self) -> Result<HackboardConfigLayer, ConfigError> {
			Ok(self.1.clone())
		}
	}

	fn toml_file(content: &str) -> tempfile::NamedTempFile {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(content.as_bytes()).unwrap();
		file
	}

	#[test]
	fn test_defaults_only() {
		let config = load_from_sources(vec![Box::new(DefaultsSource)]).unwrap();
		assert_eq!(config.database.url, "sqlite:./hackboard.db");
		assert_eq!(config.github.source, SourceKind::Api);
		assert_eq!(config.polling.interval_secs, 15);
		assert!(config.teams.is_empty());
	}

	#[test]
	fn test_toml_file_is_read() {
		let file = toml_file(
			r#"
[github]
source = "scrape"
commit_label = "Commits"

[polling]
interval_secs = 20

[[teams]]
name = "Team Tim"
repos = ["https://github.com/timf34/HackIrelandLeaderboard"]

[[teams]]
name = "Team Two"
repos = []
"#,
		);
		let config = load_from_sources(vec![Box::new(DefaultsSource), Box::new(TomlSource::new(file.path()))]).unwrap();

		assert_eq!(config.github.source, SourceKind::Scrape);
		assert_eq!(config.polling.interval_secs, 20);
		assert_eq!(config.teams.len(), 2);
		assert_eq!(config.teams[0].repos.len(), 1);
	}

	#[test]
	fn test_higher_precedence_wins_regardless_of_order() {
		let file = toml_file("[database]\nurl = \"sqlite:/from/file.db\"\n");
		let cli = HackboardConfigLayer {
			database: Some(DatabaseConfigLayer {
				url: Some("sqlite:/from/cli.db".to_string()),
				busy_timeout_ms: None,
			}),
			..Default::default()
		};

		let config = load_from_sources(vec![
			Box::new(CliSource(cli)),
			Box::new(TomlSource::new(file.path())),
			Box::new(DefaultsSource),
		])
		.unwrap();
		assert_eq!(config.database.url, "sqlite:/from/cli.db");
	}

	#[test]
	fn test_environment_overrides_file() {
		let file = toml_file("[polling]\ninterval_secs = 20\ntick_ms = 250\n");
		let env = HackboardConfigLayer {
			polling: Some(PollingConfigLayer {
				interval_secs: Some(60),
				..Default::default()
			}),
			..Default::default()
		};

		let config = load_from_sources(vec![
			Box::new(TomlSource::new(file.path())),
			Box::new(FixedSource(Precedence::Environment, env)),
		])
		.unwrap();
		assert_eq!(config.polling.interval_secs, 60);
		assert_eq!(config.polling.tick_ms, 250);
	}

	#[test]
	fn test_invalid_teams_fail_loading() {
		let file = toml_file("[[teams]]\nname = \"\"\nrepos = []\n");
		let result = load_from_sources(vec![Box::new(TomlSource::new(file.path()))]);
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_zero_interval_rejected() {
		let layer = HackboardConfigLayer {
			polling: Some(PollingConfigLayer {
				interval_secs: Some(0),
				..Default::default()
			}),
			..Default::default()
		};
		let result = load_from_sources(vec![Box::new(CliSource(layer))]);
		assert!(result.is_err());
	}
}
