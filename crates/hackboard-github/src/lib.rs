// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! GitHub access for Hackboard.
//!
//! This crate provides:
//! - [`GithubClient`] for the commits listing, the rate-limit endpoint and
//!   rendered repository pages
//! - [`RateGovernor`] which keeps structured calls above a safety margin
//! - [`CommitSource`] with an API-backed and a page-scraping implementation

pub mod client;
pub mod config;
pub mod error;
pub mod governor;
pub mod scrape;
pub mod slug;
pub mod source;
pub mod types;

pub use client::GithubClient;
pub use config::{GithubClientConfig, DEFAULT_API_BASE_URL, DEFAULT_WEB_BASE_URL};
pub use error::GithubError;
pub use governor::{seconds_until_reset, RateGovernor, RateLimitProbe, SAFETY_THRESHOLD};
pub use scrape::{CommitCountExtractor, DEFAULT_COMMIT_LABEL};
pub use slug::RepoSlug;
pub use source::{
	build_source, Acquisition, ApiCommitSource, CommitSource, NoDataReason, ScrapeCommitSource,
	SourceKind, COMMITS_PER_CHECK,
};
pub use types::{CommitInfo, RateBudget};
