// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod database;
mod github;
mod logging;
mod polling;
mod teams;

pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use github::{GithubConfig, GithubConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use polling::{PollingConfig, PollingConfigLayer};
pub use teams::{validate_teams, TeamConfig};
