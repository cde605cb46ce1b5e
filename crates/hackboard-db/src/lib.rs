// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for the Hackboard commit tracker.
//!
//! One store holds five record kinds: teams, repositories, commits,
//! activity events and activity history. Read paths go through the
//! `*Repository` structs; the reconciler composes the free transaction
//! helpers inside a single `sqlx` transaction.

pub mod activity;
pub mod commit;
pub mod error;
pub mod pool;
pub mod schema;
pub mod team;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod tracked_repo;
pub mod types;

pub use activity::ActivityRepository;
pub use commit::CommitRepository;
pub use error::{DbError, Result};
pub use pool::{create_pool, open_store, DEFAULT_BUSY_TIMEOUT};
pub use schema::init_schema;
pub use team::TeamRepository;
pub use tracked_repo::{display_name_from_url, TrackedRepoRepository};
pub use types::{
	ActivityEvent, ActivityHistoryEntry, ActivityPayload, CommitRecord, EventId, EventType,
	LeaderboardEntry, NewCommit, RepoId, RepoTotals, RepositorySummary, TeamId, TeamRecord,
};
