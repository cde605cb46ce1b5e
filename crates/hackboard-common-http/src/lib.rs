// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for Hackboard.
//!
//! Every outbound request made by the tracker goes through a client built
//! here, so all of them carry the same User-Agent and an explicit timeout.

mod client;

pub use client::{builder, new_client_with_timeout, user_agent, DEFAULT_TIMEOUT};
