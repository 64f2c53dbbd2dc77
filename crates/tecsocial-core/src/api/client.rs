//! Session client for the tec social network REST API.
//!
//! `SessionClient` owns the stored session and is the only way to reach the
//! backend. Login and signup first wake a possibly cold-started server with a
//! bounded probe loop, then exchange credentials. Every other call goes
//! through [`SessionClient::authenticated_request`].

use std::sync::Arc;

use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::auth::{Session, SessionStore};
use crate::config::Config;
use crate::models::User;
use crate::progress::ProgressObserver;

use super::retry;
use super::ApiError;

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
    user: User,
}

/// Client for the social network backend.
/// Clone is cheap - the connection pool, config and store are shared.
#[derive(Clone)]
pub struct SessionClient {
    client: Client,
    config: Arc<Config>,
    store: Arc<dyn SessionStore>,
}

impl SessionClient {
    pub fn new(config: Config, store: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
            store,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ===== Server readiness =====

    /// Single health probe. Never fails: any problem reads as "not ready".
    ///
    /// A 5xx counts as not ready, since a waking host's gateway answers
    /// with 502/503 until the app is up.
    pub async fn check_server_status(&self) -> bool {
        let url = self.config.url(&self.config.health_path);
        match self
            .client
            .get(&url)
            .timeout(self.config.probe_timeout())
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status();
                debug!(%status, "Health probe answered");
                !status.is_server_error()
            }
            Err(e) => {
                debug!(error = %e, "Health probe failed");
                false
            }
        }
    }

    /// Probe until the server answers or the attempt budget is spent.
    ///
    /// Returns how many probes it took.
    pub async fn wait_for_server<O>(&self, progress: &O) -> Result<u32, ApiError>
    where
        O: ProgressObserver + ?Sized,
    {
        let policy = self.config.retry_policy();
        retry::wait_until_ready(&policy, progress, || self.check_server_status()).await
    }

    // ===== Identity =====

    /// Wake the server, then exchange email and password for a session.
    ///
    /// Input validation is the caller's job. Bad credentials are not retried.
    pub async fn login<O>(&self, email: &str, password: &str, progress: &O) -> Result<Session, ApiError>
    where
        O: ProgressObserver + ?Sized,
    {
        let attempts = self.wait_for_server(progress).await?;
        debug!(attempts, "Server ready, sending credentials");

        let url = self.config.url(&self.config.login_path);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Login rejected");
            return Err(ApiError::from_login_status(status, &body));
        }

        let session = self.establish(response).await?;
        info!(user = %session.user.username, "Logged in");
        Ok(session)
    }

    /// Wake the server, then register a new account and log into it.
    pub async fn sign_up<O>(
        &self,
        username: &str,
        email: &str,
        password: &str,
        progress: &O,
    ) -> Result<Session, ApiError>
    where
        O: ProgressObserver + ?Sized,
    {
        self.wait_for_server(progress).await?;

        let url = self.config.url(&self.config.signup_path);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "username": username, "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Signup rejected");
            return Err(ApiError::from_signup_status(status, &body));
        }

        let session = self.establish(response).await?;
        info!(user = %session.user.username, "Account created");
        Ok(session)
    }

    /// Parse a `{token, user}` body and persist it as the current session.
    async fn establish(&self, response: Response) -> Result<Session, ApiError> {
        let body = response.text().await?;
        let auth: AuthResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("auth response: {}", e)))?;

        let session = Session::new(auth.token, auth.user);
        self.store.save(&session).map_err(ApiError::Storage)?;
        Ok(session)
    }

    /// Delete the stored session. Safe to call when logged out.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.store.clear().map_err(ApiError::Storage)?;
        info!("Logged out");
        Ok(())
    }

    /// The stored session, if any. Storage read errors count as no session.
    pub fn current_session(&self) -> Option<Session> {
        match self.store.load() {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Failed to read stored session");
                None
            }
        }
    }

    pub fn get_token(&self) -> Option<String> {
        self.current_session().map(|s| s.token)
    }

    pub fn get_user_data(&self) -> Option<User> {
        self.current_session().map(|s| s.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_session().is_some()
    }

    fn force_logout(&self) {
        warn!("Server rejected token, clearing session");
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear rejected session");
        }
    }

    // ===== Authenticated requests =====

    /// Send a request carrying the stored bearer token.
    ///
    /// Without a session this fails with `Unauthenticated` before touching
    /// the network. A 401/403 clears the session. Empty bodies come back as
    /// `{}`.
    pub async fn authenticated_request(
        &self,
        path: &str,
        method: Method,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let session = self.current_session().ok_or(ApiError::Unauthenticated)?;
        let url = self.config.url(path);
        debug!(%method, path, "Authenticated request");

        let mut request = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(&session.token);
        if let Some(ref body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = ApiError::from_status(status, &text);
            if err.is_unauthenticated() {
                self.force_logout();
            }
            return Err(err);
        }

        Self::parse_body(status, &text)
            .map_err(|e| ApiError::InvalidResponse(format!("{} {}: {}", method, path, e)))
    }

    /// Like [`authenticated_request`](Self::authenticated_request), decoded into `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        method: Method,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let value = self.authenticated_request(path, method.clone(), body).await?;
        serde_json::from_value(value)
            .map_err(|e| ApiError::InvalidResponse(format!("{} {}: {}", method, path, e)))
    }

    fn parse_body(status: StatusCode, text: &str) -> serde_json::Result<Value> {
        if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        serde_json::from_str(text)
    }
}
