// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Commit tracking engine for the Hackboard leaderboard.
//!
//! A [`Tracker`] owns the store, a [`CommitSource`](hackboard_github::CommitSource)
//! and the polling loop. The loop hands each due repository to the
//! [`Reconciler`], which records new commits transactionally and raises the
//! [`WakeSignal`]; consumers then drain the durable event log.

pub mod config;
pub mod context;
pub mod error;
pub mod notify;
pub mod reconciler;
pub mod scheduler;
#[cfg(test)]
mod test_support;
pub mod tracker;

pub use config::{SchedulerConfig, TrackerConfig};
pub use context::CancellationToken;
pub use error::{Result, TrackerError};
pub use notify::WakeSignal;
pub use reconciler::{compute_delta, Reconciler};
pub use scheduler::{PassReport, Scheduler};
pub use tracker::{rank_leaderboard, TeamRegistration, Tracker, TrackerStats};
