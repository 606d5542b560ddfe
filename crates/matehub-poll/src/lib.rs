// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adaptive-backoff polling engine for the MateHub client.
//!
//! Chat replies are generated asynchronously by the backend; this crate
//! waits for them. The state machine ([`PollJob`]) is a pure transition
//! function over fetch observations; the driver ([`poll`]) schedules the
//! fetches with bounded, monotonically-growing delays.

pub mod driver;
pub mod job;

pub use driver::{poll, PollUpdate};
pub use job::{Observation, PollConfig, PollJob, PollState};
