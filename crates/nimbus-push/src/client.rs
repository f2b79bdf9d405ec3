//! Outbound HTTP client that self-heals its bearer credential.

use crate::error::{PushError, Result};
use crate::token::TokenStore;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Response, StatusCode};

/// Where and how to obtain a fresh bearer token.
#[derive(Debug, Clone)]
pub struct AuthorityConfig {
    /// Base URL of the token authority.
    pub endpoint: String,
    pub agent_id: String,
    pub secret: String,
    pub secret_id: String,
    pub tenant_id: String,
}

/// An outbound request whose body can be re-supplied byte-identically for
/// the one retry a credential refresh allows.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
}

impl OutboundRequest {
    pub fn put(url: impl Into<String>, content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            method: Method::PUT,
            url: url.into(),
            content_type: Some(content_type),
            body,
        }
    }
}

/// In-memory credential cache state.
///
/// The explicit states keep the "refresh exactly once" contract structural:
/// a request is only ever retried from `Refreshing`, and `Refreshing` is
/// only ever entered from `Cached`.
enum TokenState {
    /// No load attempted yet; first use consults the store.
    Empty,
    /// The credential attached to outbound requests. May hold an empty
    /// string, meaning the first authorization failure triggers a refresh.
    Cached(String),
    /// A refresh is in flight for the current call.
    Refreshing,
}

/// HTTP client that attaches a bearer credential to every request and, on an
/// authorization failure, fetches a fresh credential from the authority,
/// persists it, and retries the request exactly once.
pub struct AuthClient {
    http: reqwest::Client,
    authority: AuthorityConfig,
    store: TokenStore,
    state: TokenState,
}

impl AuthClient {
    pub fn new(http: reqwest::Client, authority: AuthorityConfig, store: TokenStore) -> Self {
        Self {
            http,
            authority,
            store,
            state: TokenState::Empty,
        }
    }

    /// Sends the request with the cached credential, refreshing and retrying
    /// once on an authorization failure.
    ///
    /// # Errors
    ///
    /// Transport errors surface immediately and leave the cached credential
    /// untouched. A second consecutive authorization failure on the same
    /// call returns [`PushError::AuthorizationRejected`] rather than looping
    /// on refreshes.
    pub async fn execute(&mut self, request: &OutboundRequest) -> Result<Response> {
        if let TokenState::Empty = self.state {
            let cached = match self.store.load() {
                Ok(token) => token,
                Err(PushError::CredentialMissing) => {
                    tracing::debug!("no stored credential, deferring to first refresh");
                    String::new()
                }
                Err(e) => {
                    tracing::warn!(error = %e, "could not read stored credential");
                    String::new()
                }
            };
            self.state = TokenState::Cached(cached);
        }

        let mut refreshed = false;
        loop {
            let token = match &self.state {
                TokenState::Cached(token) => token.clone(),
                // Unreachable by construction; treat as an expired cache.
                TokenState::Empty | TokenState::Refreshing => String::new(),
            };

            let response = self.send_with_token(request, &token).await?;
            if response.status() != StatusCode::FORBIDDEN {
                return Ok(response);
            }
            if refreshed {
                return Err(PushError::AuthorizationRejected);
            }

            self.state = TokenState::Refreshing;
            let fresh = match self.issue_token().await {
                Ok(fresh) => fresh,
                Err(e) => {
                    // Failed refresh leaves the previous credential in place.
                    self.state = TokenState::Cached(token);
                    return Err(e);
                }
            };
            if let Err(e) = self.store.save(&fresh) {
                tracing::warn!(error = %e, "could not persist refreshed credential");
            }
            self.state = TokenState::Cached(fresh);
            refreshed = true;
            tracing::info!("credential refreshed, retrying request");
        }
    }

    async fn send_with_token(
        &self,
        request: &OutboundRequest,
        token: &str,
    ) -> std::result::Result<Response, reqwest::Error> {
        let mut builder = self
            .http
            .request(request.method.clone(), &request.url)
            .body(request.body.clone());
        if let Some(content_type) = request.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        if !token.is_empty() {
            builder = builder.bearer_auth(token);
        }
        builder.send().await
    }

    /// Fetches a fresh bearer token from the authority.
    ///
    /// A 2xx response body is the token, verbatim. Issuance is never
    /// retried; a failure surfaces to the caller of `execute`.
    async fn issue_token(&self) -> Result<String> {
        let url = format!(
            "{}/agents/tokens",
            self.authority.endpoint.trim_end_matches('/')
        );
        let response = self
            .http
            .get(&url)
            .query(&[("agent_id", self.authority.agent_id.as_str())])
            .header("X-Auth-Secret", &self.authority.secret)
            .header("X-Auth-Secret-Id", &self.authority.secret_id)
            .header("X-Tenant-Id", &self.authority.tenant_id)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(PushError::TokenIssuance {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}
