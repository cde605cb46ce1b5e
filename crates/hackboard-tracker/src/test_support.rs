// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hackboard_github::{Acquisition, CommitInfo, CommitSource, NoDataReason, RateBudget, SourceKind};

/// Scripted source: answers per repository URL, records every call.
pub struct FakeSource {
	kind: SourceKind,
	responses: Mutex<HashMap<String, Acquisition>>,
	budget: Mutex<Option<RateBudget>>,
	calls: Mutex<Vec<(String, Option<DateTime<Utc>>)>>,
}

impl FakeSource {
	pub fn new(kind: SourceKind) -> Self {
		Self {
			kind,
			responses: Mutex::new(HashMap::new()),
			budget: Mutex::new(None),
			calls: Mutex::new(Vec::new()),
		}
	}

	pub fn respond(&self, url: &str, acquisition: Acquisition) {
		self.responses.lock().unwrap().insert(url.to_string(), acquisition);
	}

	pub fn set_budget(&self, budget: Option<RateBudget>) {
		*self.budget.lock().unwrap() = budget;
	}

	pub fn calls(&self) -> Vec<(String, Option<DateTime<Utc>>)> {
		self.calls.lock().unwrap().clone()
	}
}

#[async_trait]
impl CommitSource for FakeSource {
	fn kind(&self) -> SourceKind {
		self.kind
	}

	async fn fetch(&self, repo_url: &str, since: Option<DateTime<Utc>>) -> Acquisition {
		self.calls.lock().unwrap().push((repo_url.to_string(), since));
		self.responses
			.lock()
			.unwrap()
			.get(repo_url)
			.cloned()
			.unwrap_or_else(|| Acquisition::NoData(NoDataReason::Transport("unscripted".to_string())))
	}

	fn budget(&self) -> Option<RateBudget> {
		*self.budget.lock().unwrap()
	}
}

pub fn commit(hash: &str) -> CommitInfo {
	CommitInfo {
		hash: hash.to_string(),
		author: "octocat".to_string(),
		message: format!("commit {hash}"),
		timestamp: None,
	}
}
