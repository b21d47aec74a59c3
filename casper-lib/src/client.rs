//! Session-owning client.
//!
//! # Call Flow
//!
//! ```text
//! caller -> issue claim token -> resolve endpoint (signing service)
//!        -> merge single-use params -> dispatch (platform) -> classify
//! ```
//!
//! A client holds one credential set and at most one session. Calls that
//! change the session (`login`, `register`, `logout`) take `&mut self`, so
//! the borrow checker rules out a second in-flight session change. Separate
//! clients share nothing and can run fully in parallel.

use std::time::Duration;

use zeroize::Zeroizing;

use crate::config::{CasperConfig, ProxyUrl};
use crate::dispatcher::{DispatchRequest, DispatchResponse, Dispatcher};
use crate::endpoints::{Access, Endpoint, FriendAction};
use crate::models::{CaptchaChallenge, LoginEnvelope, LoginResponse, RegisterResponse};
use crate::resolver::EndpointResolver;
use crate::signing::{issue_token, ClaimSet, ParameterSet};
use crate::transport::{HttpMethod, HttpTransport, ReqwestTransport};
use crate::{CasperError, Result};

/// Authenticated session state.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    username: String,
    auth_token: Zeroizing<String>,
}

impl Session {
    /// Create a session from a stored username and auth token.
    pub fn new(username: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            auth_token: Zeroizing::new(auth_token.into()),
        }
    }

    /// Username the session is bound to.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Session auth token.
    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    fn is_valid(&self) -> bool {
        !self.username.is_empty() && !self.auth_token.is_empty()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

/// Client for the signing service and the platform behind it.
pub struct CasperClient<T: HttpTransport = ReqwestTransport> {
    config: CasperConfig,
    transport: T,
    session: Option<Session>,
}

impl CasperClient<ReqwestTransport> {
    /// Create a client over HTTPS.
    pub fn new(config: CasperConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: HttpTransport> CasperClient<T> {
    /// Create a client over a custom transport.
    pub fn with_transport(config: CasperConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            session: None,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &CasperConfig {
        &self.config
    }

    /// Get the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Current session, if authenticated.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref().filter(|s| s.is_valid())
    }

    /// Whether the client holds a usable session.
    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    /// Resume a previously obtained session.
    pub fn restore_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// Drop the session locally without contacting the platform.
    pub fn clear_session(&mut self) {
        self.session = None;
    }

    /// Validate and apply a proxy.
    ///
    /// TLS certificate verification is relaxed while a proxy is set. On error
    /// neither the configuration nor the transport changes.
    pub fn set_proxy(&mut self, raw: &str) -> Result<()> {
        let proxy = ProxyUrl::parse(raw)?;
        self.transport.set_proxy(Some(&proxy))?;
        self.config.proxy = Some(proxy);
        Ok(())
    }

    /// Remove the proxy and restore strict TLS verification.
    pub fn clear_proxy(&mut self) -> Result<()> {
        self.transport.set_proxy(None)?;
        self.config.proxy = None;
        Ok(())
    }

    /// Set the project tag appended to the user-agent.
    pub fn set_project_name(&mut self, project: impl Into<String>) {
        self.config.project_name = Some(project.into());
    }

    fn resolver(&self) -> EndpointResolver<'_, T> {
        EndpointResolver::new(&self.transport, &self.config)
    }

    fn dispatcher(&self) -> Dispatcher<'_, T> {
        Dispatcher::new(&self.transport, &self.config)
    }

    /// Fail fast when no session is held.
    pub fn check_session(&self) -> Result<&Session> {
        self.session()
            .ok_or_else(|| CasperError::Auth("no authenticated session, log in first".to_string()))
    }

    /// Log in with the configured account and bind the session.
    #[tracing::instrument(skip(self), fields(username = %self.config.username))]
    pub async fn login(&mut self) -> Result<LoginResponse> {
        if self.config.username.is_empty() || self.config.password.is_empty() {
            return Err(CasperError::validation(
                "account",
                "username and password are required to log in",
            ));
        }

        let descriptor = self
            .resolver()
            .login(&self.config.username, &self.config.password)
            .await?;
        let request = DispatchRequest::new(HttpMethod::Post, descriptor.url.as_str())
            .with_params(descriptor.param_set())
            .with_headers(descriptor.headers);
        let response = self.dispatcher().dispatch(request).await?;

        let raw: serde_json::Value = response.json()?;
        let envelope: LoginEnvelope = serde_json::from_value(raw.clone())?;
        let updates = match envelope.updates_response {
            Some(updates) if !updates.auth_token.is_empty() => updates,
            _ => {
                let message = if envelope.error.message.is_empty() {
                    "login rejected".to_string()
                } else {
                    envelope.error.message
                };
                return Err(CasperError::Auth(message));
            }
        };

        let username = if updates.username.is_empty() {
            self.config.username.clone()
        } else {
            updates.username
        };
        self.session = Some(Session::new(username.clone(), updates.auth_token));
        tracing::info!(%username, "session established");

        Ok(LoginResponse { username, raw })
    }

    /// Register a new account.
    ///
    /// The session becomes authenticated when the platform returns an auth
    /// token and a username is known (assigned by the platform or configured).
    #[tracing::instrument(skip(self, password))]
    pub async fn register(
        &mut self,
        email: &str,
        password: &str,
        birthday: &str,
    ) -> Result<RegisterResponse> {
        let params = ParameterSet::new()
            .with("email", email)
            .with("password", password)
            .with("birthday", birthday);
        let register: RegisterResponse = self.call(Endpoint::Register, params).await?.json()?;

        if register.auth_token.is_empty() {
            let message = if register.message.is_empty() {
                "registration rejected".to_string()
            } else {
                register.message.clone()
            };
            return Err(CasperError::Auth(message));
        }

        let username = if register.default_username.is_empty() {
            self.config.username.clone()
        } else {
            register.default_username.clone()
        };
        if !username.is_empty() {
            self.session = Some(Session::new(username, register.auth_token.clone()));
        }
        Ok(register)
    }

    /// End the session on the platform and locally.
    pub async fn logout(&mut self) -> Result<()> {
        self.call(Endpoint::Logout, ParameterSet::new()).await?;
        self.session = None;
        Ok(())
    }

    /// Issue one platform call through the endpoint table.
    ///
    /// Session endpoints fail with `Auth` before any network I/O when no
    /// session is held. Resolved endpoints get a fresh claim token and a
    /// fresh descriptor on every call; descriptor parameters win over
    /// caller parameters with the same key.
    #[tracing::instrument(skip_all, fields(endpoint = %endpoint))]
    pub async fn call(&self, endpoint: Endpoint, params: ParameterSet) -> Result<DispatchResponse> {
        let claims = match endpoint.access() {
            Access::Bootstrap => {
                return Err(CasperError::validation(
                    "endpoint",
                    "login goes through CasperClient::login",
                ))
            }
            Access::Public => {
                let request = DispatchRequest::new(endpoint.method(), endpoint.path())
                    .with_params(params)
                    .expect_status(endpoint.expected_status());
                return self.dispatcher().dispatch(request).await;
            }
            Access::Resolved => {
                let claims = ClaimSet::new().with("endpoint", endpoint.path());
                if self.config.username.is_empty() {
                    claims
                } else {
                    claims.with("username", self.config.username.as_str())
                }
            }
            Access::Session => {
                let session = self.check_session()?;
                ClaimSet::new()
                    .with("username", session.username())
                    .with("auth_token", session.auth_token())
                    .with("endpoint", endpoint.path())
            }
        };

        let token = issue_token(&claims, &self.config.api_secret)?;
        let authorization = self
            .resolver()
            .resolve_endpoint(&token)
            .await?
            .into_authorization(endpoint.path())?;

        let mut merged = params;
        for (key, value) in authorization.param_set() {
            if merged.insert(key.as_str(), value).is_some() {
                tracing::debug!(%key, "caller parameter replaced by resolved value");
            }
        }

        let request = DispatchRequest::new(endpoint.method(), authorization.endpoint)
            .with_params(merged)
            .with_headers(authorization.headers)
            .expect_status(endpoint.expected_status());
        self.dispatcher().dispatch(request).await
    }

    /// [`call`](Self::call) bounded by `deadline`, covering both the
    /// resolution and the dispatch.
    pub async fn call_with_deadline(
        &self,
        endpoint: Endpoint,
        params: ParameterSet,
        deadline: Duration,
    ) -> Result<DispatchResponse> {
        tokio::time::timeout(deadline, self.call(endpoint, params))
            .await
            .map_err(|elapsed| {
                CasperError::transport_with(
                    format!("{} exceeded deadline of {}ms", endpoint, deadline.as_millis()),
                    elapsed,
                )
            })?
    }

    /// Fetch the full account state.
    pub async fn updates(&self) -> Result<serde_json::Value> {
        self.call(Endpoint::AllUpdates, ParameterSet::new())
            .await?
            .json()
    }

    /// Fetch conversations.
    pub async fn conversations(&self) -> Result<serde_json::Value> {
        self.call(Endpoint::Conversations, ParameterSet::new())
            .await?
            .json()
    }

    /// Apply a friend action. `display` is required for [`FriendAction::Display`].
    pub async fn friend(
        &self,
        action: FriendAction,
        friend: &str,
        display: Option<&str>,
    ) -> Result<serde_json::Value> {
        let mut params = ParameterSet::new()
            .with("action", action.as_str())
            .with("friend", friend);
        match (action, display) {
            (FriendAction::Display, None) => {
                return Err(CasperError::validation(
                    "display",
                    "a display name is required for the display action",
                ))
            }
            (_, Some(display)) => {
                params.insert("display", display);
            }
            _ => {}
        }
        self.call(Endpoint::Friend, params).await?.json()
    }

    /// Fetch suggested friends.
    pub async fn suggested_friends(&self) -> Result<serde_json::Value> {
        let params = ParameterSet::new().with("action", "list");
        self.call(Endpoint::SuggestedFriends, params).await?.json()
    }

    /// Fetch stories.
    pub async fn stories(&self) -> Result<serde_json::Value> {
        self.call(Endpoint::Stories, ParameterSet::new())
            .await?
            .json()
    }

    /// Delete one of the user's stories. Succeeds only on `204 No Content`.
    pub async fn delete_story(&self, story_id: &str) -> Result<()> {
        let params = ParameterSet::new().with("story_id", story_id);
        self.call(Endpoint::DeleteStory, params).await?;
        Ok(())
    }

    /// Fetch a captcha challenge.
    pub async fn get_captcha(&self) -> Result<CaptchaChallenge> {
        let response = self.call(Endpoint::GetCaptcha, ParameterSet::new()).await?;
        let id = response
            .captcha_id
            .ok_or_else(|| CasperError::parse("captcha response has no identifier"))?;
        Ok(CaptchaChallenge {
            id,
            archive: response.body,
        })
    }

    /// Submit a captcha solution: nine `0`/`1` flags, one per image.
    pub async fn solve_captcha(&self, captcha_id: &str, solution: &str) -> Result<()> {
        if solution.len() != 9 || !solution.chars().all(|c| c == '0' || c == '1') {
            return Err(CasperError::validation(
                "captcha_solution",
                "expected nine characters of 0 or 1",
            ));
        }
        let params = ParameterSet::new()
            .with("captcha_id", captcha_id)
            .with("captcha_solution", solution);
        self.call(Endpoint::SolveCaptcha, params).await?;
        Ok(())
    }

    /// List Discover channels for `region`. Needs no session.
    pub async fn discover_channels(&self, region: &str) -> Result<serde_json::Value> {
        let params = ParameterSet::new().with("region", region);
        self.call(Endpoint::DiscoverChannels, params).await?.json()
    }

    /// Fetch the lens schedule.
    pub async fn lens_schedule(&self) -> Result<serde_json::Value> {
        self.call(Endpoint::LensSchedule, ParameterSet::new())
            .await?
            .json()
    }

    /// Device attestation. Permanently removed from the signing service.
    pub async fn attestation(&self, _username: &str, _password: &str, _timestamp: &str) -> Result<String> {
        Err(CasperError::Deprecated("device attestation"))
    }

    /// Client auth token signing. Permanently removed from the signing service.
    pub async fn client_auth_token(
        &self,
        _username: &str,
        _password: &str,
        _timestamp: &str,
    ) -> Result<String> {
        Err(CasperError::Deprecated("client auth token signing"))
    }
}
