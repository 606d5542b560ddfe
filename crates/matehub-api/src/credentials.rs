// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared credential storage.
//!
//! One [`CredentialStore`] is shared by every in-flight request. The
//! generation counter lets the refresh path detect that another task
//! already replaced the tokens while it was waiting for the refresh
//! lock, so a burst of 401s produces at most one refresh call.

use matehub_core::{Credential, SessionKind};
use tokio::sync::RwLock;

/// A credential snapshot tagged with the store generation it was read at.
#[derive(Debug, Clone)]
pub struct CredentialSnapshot {
    pub credential: Option<Credential>,
    pub generation: u64,
}

#[derive(Debug, Default)]
struct StoreInner {
    credential: Option<Credential>,
    generation: u64,
}

/// Holds the current token pair for the process.
#[derive(Debug, Default)]
pub struct CredentialStore {
    inner: RwLock<StoreInner>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current credential plus the generation it belongs to.
    pub async fn snapshot(&self) -> CredentialSnapshot {
        let inner = self.inner.read().await;
        CredentialSnapshot {
            credential: inner.credential.clone(),
            generation: inner.generation,
        }
    }

    /// Replaces the stored credential and bumps the generation.
    pub async fn set(&self, credential: Credential) {
        let mut inner = self.inner.write().await;
        inner.credential = Some(credential);
        inner.generation += 1;
    }

    /// Replaces only the access token, keeping the refresh token and
    /// session kind. Used when a refresh response omits a new refresh
    /// token.
    pub async fn set_access_token(&self, access_token: String) {
        let mut inner = self.inner.write().await;
        if let Some(cred) = inner.credential.as_mut() {
            cred.access_token = access_token;
            inner.generation += 1;
        }
    }

    /// Drops the stored credential. Subsequent requests go out without an
    /// `Authorization` header until a new session is established.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.credential = None;
        inner.generation += 1;
    }

    pub async fn is_anonymous(&self) -> bool {
        let inner = self.inner.read().await;
        matches!(
            inner.credential.as_ref().map(|c| c.kind),
            Some(SessionKind::Anonymous)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(access: &str) -> Credential {
        Credential {
            access_token: access.into(),
            refresh_token: "refresh".into(),
            kind: SessionKind::Anonymous,
        }
    }

    #[tokio::test]
    async fn starts_empty_at_generation_zero() {
        let store = CredentialStore::new();
        let snap = store.snapshot().await;
        assert!(snap.credential.is_none());
        assert_eq!(snap.generation, 0);
    }

    #[tokio::test]
    async fn set_bumps_generation() {
        let store = CredentialStore::new();
        store.set(credential("a")).await;
        let first = store.snapshot().await;
        store.set(credential("b")).await;
        let second = store.snapshot().await;

        assert_eq!(first.generation, 1);
        assert_eq!(second.generation, 2);
        assert_eq!(
            second.credential.unwrap().access_token,
            "b".to_string()
        );
    }

    #[tokio::test]
    async fn set_access_token_keeps_refresh_token_and_kind() {
        let store = CredentialStore::new();
        store.set(credential("a")).await;
        store.set_access_token("b".into()).await;

        let snap = store.snapshot().await;
        let cred = snap.credential.unwrap();
        assert_eq!(cred.access_token, "b");
        assert_eq!(cred.refresh_token, "refresh");
        assert_eq!(cred.kind, SessionKind::Anonymous);
        assert_eq!(snap.generation, 2);
    }

    #[tokio::test]
    async fn clear_also_bumps_generation() {
        let store = CredentialStore::new();
        store.set(credential("a")).await;
        store.clear().await;
        let snap = store.snapshot().await;
        assert!(snap.credential.is_none());
        assert_eq!(snap.generation, 2);
    }
}
