// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct StopState {
	cancelled: AtomicBool,
	notify: Notify,
}

/// Cooperative stop flag shared between the tracker and its polling loop.
///
/// The loop checks [`is_cancelled`](Self::is_cancelled) between repositories
/// and races [`cancelled`](Self::cancelled) against its inter-pass tick, so a
/// stop request never waits out a full tick.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
	state: Arc<StopState>,
}

impl CancellationToken {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.state.cancelled.store(true, Ordering::SeqCst);
		self.state.notify.notify_waiters();
	}

	pub fn is_cancelled(&self) -> bool {
		self.state.cancelled.load(Ordering::SeqCst)
	}

	/// Resolves once [`cancel`](Self::cancel) has been called on any clone.
	pub async fn cancelled(&self) {
		loop {
			let notified = self.state.notify.notified();
			tokio::pin!(notified);
			notified.as_mut().enable();

			if self.is_cancelled() {
				return;
			}
			notified.await;
		}
	}
}
