// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Commit total extraction from a rendered repository page.
//!
//! The page markup is not a stable interface. Extraction either finds a number
//! next to the label or reports nothing; it never guesses.

use regex::Regex;

use crate::error::GithubError;

pub const DEFAULT_COMMIT_LABEL: &str = "Commits";

#[derive(Debug, Clone)]
pub struct CommitCountExtractor {
	label: String,
	pattern: Regex,
}

impl CommitCountExtractor {
	/// Build an extractor for `label`. A trailing `s` is optional when
	/// matching, so "Commits" also matches "1 Commit".
	pub fn new(label: &str) -> Result<Self, GithubError> {
		let label = label.trim();
		if label.is_empty() {
			return Err(GithubError::Config("commit label must not be empty".to_string()));
		}

		let stem = label
			.strip_suffix('s')
			.or_else(|| label.strip_suffix('S'))
			.filter(|s| !s.is_empty())
			.unwrap_or(label);
		// Number as element text, optionally separated from the label by tags.
		let pattern = format!(
			r"(?i)>\s*([0-9][0-9,.\s]*?)\s*(?:<[^>]+>\s*)*{}s?\b",
			regex::escape(stem)
		);
		let pattern = Regex::new(&pattern)
			.map_err(|e| GithubError::Config(format!("Invalid commit label '{label}': {e}")))?;

		Ok(Self {
			label: label.to_string(),
			pattern,
		})
	}

	pub fn label(&self) -> &str {
		&self.label
	}

	/// First commit total found in `html`, with separators stripped.
	pub fn extract(&self, html: &str) -> Option<u64> {
		let captures = self.pattern.captures(html)?;
		let digits: String = captures
			.get(1)?
			.as_str()
			.chars()
			.filter(char::is_ascii_digit)
			.collect();
		digits.parse().ok()
	}
}

impl Default for CommitCountExtractor {
	fn default() -> Self {
		Self::new(DEFAULT_COMMIT_LABEL).expect("default label is a valid pattern")
	}
}
