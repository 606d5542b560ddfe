// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authenticated HTTP pipeline for the MateHub backend.
//!
//! [`ApiClient`] attaches bearer credentials, converts transport and
//! protocol failures into [`MatehubError`], and transparently recovers
//! from a single 401 per request: refresh the session once (shared
//! across concurrent callers), reissue the original request once, and
//! surface [`MatehubError::AuthExpired`] if that still fails.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use matehub_core::{
    ChatBackend, Credential, HistoryPage, MatehubError, ReplyJobId, ReplyStatus, SessionKind,
    UserIdentity,
};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::credentials::CredentialStore;
use crate::types::{
    AnonymousTokenRequest, ApiErrorBody, ChatContentsResponse, ChatSendRequest, ChatSendResponse,
    ChatStatusResponse, RefreshTokenRequest, TokenResponse, WireHistoryPage,
};

/// One request through the authenticated pipeline.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl RequestSpec {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: impl serde::Serialize) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            // Serialization of our own request types cannot fail.
            body: Some(serde_json::to_value(body).unwrap_or(serde_json::Value::Null)),
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Adds an extra header to the request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// HTTP client for the MateHub backend.
///
/// Cloning is cheap; all clones share the credential store and the
/// single-flight refresh lock.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<CredentialStore>,
    refresh_lock: Arc<Mutex<()>>,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, MatehubError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MatehubError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store: Arc::new(CredentialStore::new()),
            refresh_lock: Arc::new(Mutex::new(())),
            timeout,
        })
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.store
    }

    /// Establishes a session if none exists, requesting an anonymous
    /// token pair from the backend.
    pub async fn ensure_session(&self) -> Result<(), MatehubError> {
        let snap = self.store.snapshot().await;
        if snap.credential.is_some() {
            return Ok(());
        }
        self.bootstrap_anonymous(None).await
    }

    /// Requests a fresh anonymous token pair and stores it. Passing the
    /// previous refresh token keeps the same anonymous identity when the
    /// backend still recognizes it.
    pub async fn bootstrap_anonymous(
        &self,
        refresh_token: Option<String>,
    ) -> Result<(), MatehubError> {
        let body = AnonymousTokenRequest { refresh_token };
        let response = self
            .dispatch(
                &RequestSpec::post("/auth/anonymous-token", &body),
                None,
            )
            .await?;
        let tokens: TokenResponse = Self::decode(self.check(response).await?).await?;
        let refresh_token = tokens.refresh_token.ok_or_else(|| {
            MatehubError::Internal("anonymous token response carried no refresh token".into())
        })?;

        info!(user_id = ?tokens.user_id, "anonymous session established");
        self.store
            .set(Credential {
                access_token: tokens.access_token,
                refresh_token,
                kind: SessionKind::Anonymous,
            })
            .await;
        Ok(())
    }

    /// Drops the current session.
    pub async fn logout(&self) {
        self.store.clear().await;
    }

    /// Runs a request through the full pipeline: bearer auth, one shared
    /// refresh on 401, one reissue, typed error mapping.
    pub async fn execute<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T, MatehubError> {
        let snap = self.store.snapshot().await;
        let response = self.dispatch(&spec, snap.credential.as_ref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::decode(self.check(response).await?).await;
        }

        debug!(path = %spec.path, "request rejected with 401, refreshing session");
        let refreshed = self.refresh_session(snap.generation).await?;
        let response = self.dispatch(&spec, Some(&refreshed)).await?;
        Self::decode(self.check(response).await?).await
    }

    /// Refreshes the stored credential, sharing one refresh across
    /// concurrent callers.
    ///
    /// `observed_generation` is the store generation the caller saw when
    /// its request was rejected. If the store moved past it while this
    /// caller waited for the lock, someone else already refreshed and the
    /// newer credential is reused as-is.
    async fn refresh_session(&self, observed_generation: u64) -> Result<Credential, MatehubError> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.store.snapshot().await;
        if current.generation != observed_generation {
            if let Some(credential) = current.credential {
                debug!("session already refreshed by a concurrent request");
                return Ok(credential);
            }
        }

        let Some(stale) = current.credential else {
            return Err(MatehubError::AuthExpired);
        };

        let body = RefreshTokenRequest {
            refresh_token: stale.refresh_token.clone(),
        };
        let response = self
            .dispatch(&RequestSpec::post("/auth/refresh", &body), None)
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("refresh token rejected, session expired");
            self.store.clear().await;
            return Err(MatehubError::AuthExpired);
        }

        let tokens: TokenResponse = Self::decode(self.check(response).await?).await?;
        let credential = match tokens.refresh_token {
            Some(refresh_token) => {
                let credential = Credential {
                    access_token: tokens.access_token,
                    refresh_token,
                    kind: stale.kind,
                };
                self.store.set(credential.clone()).await;
                credential
            }
            // The backend may rotate only the access token; the stored
            // refresh token stays valid in that case.
            None => {
                self.store
                    .set_access_token(tokens.access_token.clone())
                    .await;
                Credential {
                    access_token: tokens.access_token,
                    refresh_token: stale.refresh_token,
                    kind: stale.kind,
                }
            }
        };
        info!("session refreshed");
        Ok(credential)
    }

    /// Sends one HTTP request, mapping transport failures.
    async fn dispatch(
        &self,
        spec: &RequestSpec,
        credential: Option<&Credential>,
    ) -> Result<reqwest::Response, MatehubError> {
        let url = format!("{}{}", self.base_url, spec.path);
        let mut request = self.http.request(spec.method.clone(), &url);

        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        for (name, value) in &spec.headers {
            request = request.header(name, value);
        }
        if let Some(body) = &spec.body {
            request = request.json(body);
        }
        if let Some(credential) = credential {
            request = request.bearer_auth(&credential.access_token);
        }

        request.send().await.map_err(|e| {
            if e.is_timeout() {
                MatehubError::Timeout {
                    duration: self.timeout,
                }
            } else {
                MatehubError::Network {
                    message: format!("request to {url} failed: {e}"),
                    source: Some(Box::new(e)),
                }
            }
        })
    }

    /// Maps non-success statuses to typed errors, extracting the
    /// backend's `{detail}` payload when present.
    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, MatehubError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            // Reached only on the post-refresh reissue.
            self.store.clear().await;
            return Err(MatehubError::AuthExpired);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|e| e.detail)
            .unwrap_or(body);
        Err(MatehubError::Api {
            status: status.as_u16(),
            detail,
        })
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, MatehubError> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| MatehubError::Network {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        serde_json::from_str(&body).map_err(|e| MatehubError::Api {
            status,
            detail: format!("unexpected response shape: {e}"),
        })
    }

    // Typed endpoints.

    pub async fn me(&self) -> Result<UserIdentity, MatehubError> {
        self.execute(RequestSpec::get("/auth/me")).await
    }

    pub async fn send_chat(
        &self,
        story_id: i64,
        model: &str,
        message: &str,
    ) -> Result<ReplyJobId, MatehubError> {
        let body = ChatSendRequest {
            story_id,
            model: model.to_string(),
            message: message.to_string(),
        };
        let response: ChatSendResponse =
            self.execute(RequestSpec::post("/llm/chat", &body)).await?;
        Ok(ReplyJobId(response.story_chat_history_id))
    }

    pub async fn chat_status(&self, job: ReplyJobId) -> Result<ReplyStatus, MatehubError> {
        let response: ChatStatusResponse = self
            .execute(RequestSpec::get(format!("/llm/chat_history_status/{job}")))
            .await?;
        Ok(response.into_status())
    }

    pub async fn chat_contents(&self, job: ReplyJobId) -> Result<String, MatehubError> {
        let response: ChatContentsResponse = self
            .execute(RequestSpec::get(format!("/llm/chat_history/{job}")))
            .await?;
        Ok(response.contents)
    }

    pub async fn chat_history(
        &self,
        story_id: i64,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<HistoryPage, MatehubError> {
        let mut spec = RequestSpec::get("/chat/history")
            .query("story_id", story_id)
            .query("limit", limit);
        if let Some(cursor) = cursor {
            spec = spec.query("cursor", cursor);
        }
        let page: WireHistoryPage = self.execute(spec).await?;
        Ok(page.into())
    }

    /// Backend liveness probe. Unauthenticated.
    pub async fn health(&self) -> Result<serde_json::Value, MatehubError> {
        let response = self.dispatch(&RequestSpec::get("/health"), None).await?;
        Self::decode(self.check(response).await?).await
    }

    /// Model identifiers the backend can route chat requests to.
    pub async fn available_models(&self) -> Result<Vec<String>, MatehubError> {
        self.execute(RequestSpec::get("/llm/models")).await
    }
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn send_chat(
        &self,
        story_id: i64,
        model: &str,
        message: &str,
    ) -> Result<ReplyJobId, MatehubError> {
        ApiClient::send_chat(self, story_id, model, message).await
    }

    async fn reply_status(&self, job: ReplyJobId) -> Result<ReplyStatus, MatehubError> {
        self.chat_status(job).await
    }

    async fn reply_contents(&self, job: ReplyJobId) -> Result<String, MatehubError> {
        self.chat_contents(job).await
    }

    async fn history_page(
        &self,
        story_id: i64,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<HistoryPage, MatehubError> {
        self.chat_history(story_id, limit, cursor).await
    }

    async fn me(&self) -> Result<UserIdentity, MatehubError> {
        ApiClient::me(self).await
    }
}
