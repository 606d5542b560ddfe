// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP layer for the MateHub client.
//!
//! [`ApiClient`] is the only component that talks to the network. It
//! owns the credential lifecycle (anonymous bootstrap, single-flight
//! refresh on 401) and exposes the backend's endpoints as typed calls,
//! implementing the [`matehub_core::ChatBackend`] seam for the
//! orchestration layer.

pub mod client;
pub mod credentials;
pub mod types;

pub use client::{ApiClient, RequestSpec};
pub use credentials::{CredentialSnapshot, CredentialStore};
