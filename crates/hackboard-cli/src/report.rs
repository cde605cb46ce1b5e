// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Console rendering of the leaderboard and activity feed.

use std::fmt::Write;

use hackboard_db::{ActivityEvent, LeaderboardEntry};

pub fn format_leaderboard(entries: &[LeaderboardEntry]) -> String {
	let mut out = String::from("=== Leaderboard ===\n");
	if entries.is_empty() {
		out.push_str("(no teams registered)\n");
		return out;
	}

	let width = entries.iter().map(|e| e.team_name.len()).max().unwrap_or(0);
	for (rank, entry) in entries.iter().enumerate() {
		let _ = writeln!(
			out,
			"{:>3}. {:<width$}  {:>6} commits",
			rank + 1,
			entry.team_name,
			entry.total_commits,
		);
	}
	out
}

pub fn format_event(event: &ActivityEvent) -> String {
	let p = &event.payload;
	let noun = if p.delta == 1 { "commit" } else { "commits" };
	format!(
		"[{}] {} pushed {} new {noun} to {} (total {})",
		event.created_at.format("%H:%M:%S"),
		p.team_name,
		p.delta,
		p.repo_name,
		p.new_total,
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{TimeZone, Utc};
	use hackboard_db::{ActivityPayload, EventType};

	#[test]
	fn test_leaderboard_rows_are_ranked_in_order() {
		let out = format_leaderboard(&[
			LeaderboardEntry {
				team_name: "Rocketeers".to_string(),
				total_commits: 42,
			},
			LeaderboardEntry {
				team_name: "Idle".to_string(),
				total_commits: 0,
			},
		]);
		let lines: Vec<&str> = out.lines().collect();
		assert_eq!(lines.len(), 3);
		assert!(lines[1].starts_with("  1. Rocketeers"));
		assert!(lines[1].ends_with("42 commits"));
		assert!(lines[2].starts_with("  2. Idle"));
	}

	#[test]
	fn test_empty_leaderboard() {
		assert!(format_leaderboard(&[]).contains("no teams"));
	}

	#[test]
	fn test_event_line() {
		let event = ActivityEvent {
			id: 1,
			event_type: EventType::NewCommits,
			repo_id: 3,
			payload: ActivityPayload {
				team_name: "Rocketeers".to_string(),
				repo_name: "rocket".to_string(),
				delta: 1,
				new_total: 13,
			},
			created_at: Utc.with_ymd_and_hms(2025, 2, 1, 9, 30, 0).unwrap(),
			processed: false,
		};
		assert_eq!(
			format_event(&event),
			"[09:30:00] Rocketeers pushed 1 new commit to rocket (total 13)"
		);
	}
}
