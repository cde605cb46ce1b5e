// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use hackboard_db::DbError;
use hackboard_github::GithubError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Database error: {0}")]
	Db(#[from] DbError),

	#[error("GitHub error: {0}")]
	Github(#[from] GithubError),

	#[error("Invalid configuration: {0}")]
	Config(String),
}

impl From<sqlx::Error> for TrackerError {
	fn from(e: sqlx::Error) -> Self {
		TrackerError::Db(DbError::Sqlx(e))
	}
}

pub type Result<T> = std::result::Result<T, TrackerError>;
