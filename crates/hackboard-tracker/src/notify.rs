// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-process "something changed" signal.
//!
//! The signal is level-triggered: once set it stays set until a consumer
//! clears it, however many deltas land in between. It carries no data; the
//! durable event log is what consumers actually read.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

#[derive(Debug, Default)]
pub struct WakeSignal {
	flag: AtomicBool,
	notify: Notify,
}

impl WakeSignal {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set(&self) {
		self.flag.store(true, Ordering::SeqCst);
		self.notify.notify_waiters();
	}

	pub fn clear(&self) {
		self.flag.store(false, Ordering::SeqCst);
	}

	pub fn is_set(&self) -> bool {
		self.flag.load(Ordering::SeqCst)
	}

	/// Wait until the signal is set or `timeout` elapses. Returns whether it
	/// is set. Returns immediately if it already is.
	pub async fn wait(&self, timeout: Duration) -> bool {
		let deadline = tokio::time::Instant::now() + timeout;
		loop {
			let notified = self.notify.notified();
			tokio::pin!(notified);
			// Register before checking the flag so a concurrent set() is not missed.
			notified.as_mut().enable();

			if self.is_set() {
				return true;
			}
			if tokio::time::timeout_at(deadline, notified).await.is_err() {
				return self.is_set();
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Arc;

	#[tokio::test]
	async fn test_set_is_level_triggered() {
		let signal = WakeSignal::new();
		assert!(!signal.is_set());

		signal.set();
		signal.set();
		assert!(signal.is_set());
		assert!(signal.wait(Duration::from_millis(1)).await);
		// Still set after a wait; only clear() resets it.
		assert!(signal.is_set());

		signal.clear();
		assert!(!signal.is_set());
	}

	#[tokio::test(start_paused = true)]
	async fn test_wait_times_out_when_unset() {
		let signal = WakeSignal::new();
		assert!(!signal.wait(Duration::from_secs(10)).await);
	}

	#[tokio::test]
	async fn test_wait_wakes_on_set() {
		let signal = Arc::new(WakeSignal::new());
		let waiter = {
			let signal = Arc::clone(&signal);
			tokio::spawn(async move { signal.wait(Duration::from_secs(30)).await })
		};

		tokio::task::yield_now().await;
		signal.set();

		assert!(waiter.await.unwrap());
	}
}
