// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML files, environment variables and
//! command-line overrides.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::HackboardConfigLayer;
use crate::sections::{DatabaseConfigLayer, GithubConfigLayer, LoggingConfigLayer, PollingConfigLayer};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
	CommandLine = 60,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<HackboardConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<HackboardConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(HackboardConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file is not an error.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<HackboardConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(HackboardConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: HackboardConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: HACKBOARD_<SECTION>_<FIELD>. The token also falls back to the
/// conventional `GITHUB_TOKEN`.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<HackboardConfigLayer, ConfigError> {
		debug!("loading environment variables");
		layer_from_env(&|name: &str| std::env::var(name).ok())
	}
}

/// Overrides passed on the command line.
pub struct CliSource(pub HackboardConfigLayer);

impl ConfigSource for CliSource {
	fn name(&self) -> &'static str {
		"command-line"
	}

	fn precedence(&self) -> Precedence {
		Precedence::CommandLine
	}

	fn load(&self) -> Result<HackboardConfigLayer, ConfigError> {
		Ok(self.0.clone())
	}
}

type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn env_var(get: EnvLookup<'_>, name: &str) -> Option<String> {
	get(name).filter(|s| !s.is_empty())
}

fn env_parse<T: FromStr>(get: EnvLookup<'_>, name: &str) -> Result<Option<T>, ConfigError>
where
	T::Err: std::fmt::Display,
{
	match env_var(get, name) {
		Some(v) => v.parse().map(Some).map_err(|e| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid value '{v}': {e}"),
		}),
		None => Ok(None),
	}
}

fn layer_from_env(get: EnvLookup<'_>) -> Result<HackboardConfigLayer, ConfigError> {
	Ok(HackboardConfigLayer {
		database: Some(DatabaseConfigLayer {
			url: env_var(get, "HACKBOARD_DATABASE_URL"),
			busy_timeout_ms: env_parse(get, "HACKBOARD_DATABASE_BUSY_TIMEOUT_MS")?,
		}),
		github: Some(GithubConfigLayer {
			source: env_parse(get, "HACKBOARD_GITHUB_SOURCE")?,
			token: env_var(get, "HACKBOARD_GITHUB_TOKEN").or_else(|| env_var(get, "GITHUB_TOKEN")),
			api_base_url: env_var(get, "HACKBOARD_GITHUB_API_BASE_URL"),
			web_base_url: env_var(get, "HACKBOARD_GITHUB_WEB_BASE_URL"),
			request_timeout_secs: env_parse(get, "HACKBOARD_GITHUB_REQUEST_TIMEOUT_SECS")?,
			commit_label: env_var(get, "HACKBOARD_GITHUB_COMMIT_LABEL"),
		}),
		polling: Some(PollingConfigLayer {
			interval_secs: env_parse(get, "HACKBOARD_POLL_INTERVAL_SECS")?,
			tick_ms: env_parse(get, "HACKBOARD_POLL_TICK_MS")?,
			backoff_multiplier: env_parse(get, "HACKBOARD_POLL_BACKOFF_MULTIPLIER")?,
		}),
		logging: Some(LoggingConfigLayer {
			level: env_var(get, "HACKBOARD_LOG_LEVEL"),
			format: env_parse(get, "HACKBOARD_LOG_FORMAT")?,
		}),
		teams: None,
	})
}
