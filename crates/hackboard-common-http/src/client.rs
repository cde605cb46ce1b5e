// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client with consistent User-Agent header.

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Request timeout applied when the caller does not pick one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Creates a new HTTP client builder with the standard Hackboard User-Agent
/// header.
///
/// Use this when you need to customize the client further.
///
/// # Example
/// ```ignore
/// let client = hackboard_common_http::builder()
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Creates a new HTTP client with a request timeout and the standard
/// User-Agent.
///
/// The timeout covers the whole request, connect through body, so a stalled
/// remote can never hold a caller longer than `timeout`.
pub fn new_client_with_timeout(timeout: Duration) -> reqwest::Result<Client> {
	tracing::debug!(timeout_ms = timeout.as_millis() as u64, "building HTTP client");
	builder()
		.timeout(timeout)
		.connect_timeout(timeout)
		.build()
}

/// Returns the standard Hackboard User-Agent string.
///
/// Format: `hackboard/{os}-{arch}/{version}`
pub fn user_agent() -> String {
	format!(
		"hackboard/{}-{}/{}",
		std::env::consts::OS,
		std::env::consts::ARCH,
		env!("CARGO_PKG_VERSION")
	)
}
