use std::{
    sync::{Arc, Mutex, Weak},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::RwLock;
use url::Url;

use crate::{
    config::SpotifyConfig,
    error::{AuthError, TokenStoreError},
    info,
    management::TokenStore,
    scheduler::ScheduledTask,
    success,
    types::{Credential, TokenResponse},
    utils, warning,
};

/// Longest wait before the first refresh of a credential restored from the
/// cache, whose original lifetime is unknown.
pub const FALLBACK_REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// The provider's accounts service: the two token grants this app uses.
#[async_trait]
pub trait OAuthClient: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AuthError>;
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError>;
}

/// [`OAuthClient`] for `accounts.spotify.com` using the confidential client
/// (client id + secret) authorization code flow.
pub struct SpotifyAccounts {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl SpotifyAccounts {
    pub fn new(config: &SpotifyConfig) -> Self {
        Self {
            http: Client::new(),
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
        }
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, String> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(form)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("{}: {}", status, body));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl OAuthClient for SpotifyAccounts {
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AuthError> {
        self.request_token(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &self.redirect_uri),
        ])
        .await
        .map_err(AuthError::Exchange)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        self.request_token(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
        .map_err(AuthError::Refresh)
    }
}

/// How a credential came to be installed; decides the first refresh delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialOrigin {
    /// Fresh from a token grant, its lifetime is known.
    Granted,
    /// Restored from the token cache at startup. Refreshed at half its
    /// remaining lifetime, at most [`FALLBACK_REFRESH_INTERVAL`] from now.
    Cached,
}

/// Next refresh delay for a token that lives `lifetime`.
pub fn refresh_delay(lifetime: Duration) -> Duration {
    lifetime / 2
}

/// Owner of the live credential.
///
/// Cloning is cheap; every clone shares the same credential, so the API client
/// always authorizes with whatever token was installed or refreshed last.
#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    oauth: Arc<dyn OAuthClient>,
    store: Arc<TokenStore>,
    auth_url: String,
    client_id: String,
    redirect_uri: String,
    scopes: Vec<String>,
    credential: RwLock<Option<Credential>>,
    /// Held from the authorization check until the credential is installed.
    authorizing: tokio::sync::Mutex<()>,
    refresh_task: Mutex<Option<ScheduledTask>>,
}

impl AuthSession {
    pub fn new(
        config: &SpotifyConfig,
        oauth: Arc<dyn OAuthClient>,
        store: Arc<TokenStore>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                oauth,
                store,
                auth_url: config.auth_url.clone(),
                client_id: config.client_id.clone(),
                redirect_uri: config.redirect_uri.clone(),
                scopes: config.scopes.clone(),
                credential: RwLock::new(None),
                authorizing: tokio::sync::Mutex::new(()),
                refresh_task: Mutex::new(None),
            }),
        }
    }

    /// Builds the provider's authorization URL.
    ///
    /// `state` is the anti-CSRF token; the callback must echo it back before
    /// the code is exchanged.
    pub fn authorization_url(&self, state: &str) -> Result<Url, url::ParseError> {
        let scope = self.inner.scopes.join(" ");
        Url::parse_with_params(
            &self.inner.auth_url,
            &[
                ("client_id", self.inner.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.inner.redirect_uri.as_str()),
                ("scope", scope.as_str()),
                ("state", state),
            ],
        )
    }

    pub async fn is_authorized(&self) -> bool {
        self.inner.credential.read().await.is_some()
    }

    pub async fn credential(&self) -> Option<Credential> {
        self.inner.credential.read().await.clone()
    }

    pub async fn access_token(&self) -> Result<String, AuthError> {
        self.inner
            .credential
            .read()
            .await
            .as_ref()
            .map(|c| c.access_token.clone())
            .ok_or(AuthError::NotAuthorized)
    }

    /// Exchanges an authorization code for a credential.
    ///
    /// # Errors
    ///
    /// [`AuthError::AlreadyAuthorized`] if a credential is already installed,
    /// without contacting the provider.
    pub async fn exchange_authorization_code(&self, code: &str) -> Result<Credential, AuthError> {
        if self.is_authorized().await {
            return Err(AuthError::AlreadyAuthorized);
        }

        let response = self.inner.oauth.exchange_code(code).await?;
        Ok(Credential::from_token_response(response, utils::now_ms(), None))
    }

    /// Exchanges `code` and installs the resulting credential.
    ///
    /// Concurrent calls are serialized, so only the first one installs a
    /// credential; the others fail with [`AuthError::AlreadyAuthorized`].
    pub async fn authorize(&self, code: &str) -> Result<Credential, AuthError> {
        let _authorizing = self.inner.authorizing.lock().await;
        let credential = self.exchange_authorization_code(code).await?;
        self.install(credential.clone(), CredentialOrigin::Granted)
            .await;
        Ok(credential)
    }

    /// Installs the cached credential if the store has a usable one.
    pub async fn restore(&self) -> Result<Credential, TokenStoreError> {
        let credential = self.inner.store.load().await?;
        self.install(credential.clone(), CredentialOrigin::Cached)
            .await;
        Ok(credential)
    }

    /// Activates `credential`, persists it, and (re)starts background refresh.
    pub async fn install(&self, credential: Credential, origin: CredentialOrigin) {
        let half_remaining = refresh_delay(credential.remaining_at(utils::now_ms()));
        let first_refresh = match origin {
            CredentialOrigin::Granted => half_remaining,
            CredentialOrigin::Cached => half_remaining.min(FALLBACK_REFRESH_INTERVAL),
        };

        self.persist(&credential).await;
        *self.inner.credential.write().await = Some(credential);
        self.schedule_refresh(first_refresh);

        success!(
            "Access token installed, next refresh in {}s",
            first_refresh.as_secs()
        );
    }

    /// Trades the refresh token for a new pair and returns the delay until
    /// the next refresh.
    pub async fn refresh(&self) -> Result<Duration, AuthError> {
        let refresh_token = self
            .inner
            .credential
            .read()
            .await
            .as_ref()
            .map(|c| c.refresh_token.clone())
            .ok_or(AuthError::NotAuthorized)?;

        let response = self.inner.oauth.refresh(&refresh_token).await?;
        let lifetime = Duration::from_secs(response.expires_in);
        let credential =
            Credential::from_token_response(response, utils::now_ms(), Some(&refresh_token));

        self.persist(&credential).await;
        *self.inner.credential.write().await = Some(credential);

        Ok(refresh_delay(lifetime))
    }

    /// Stops background refresh. The installed credential stays usable until
    /// it expires.
    pub fn shutdown(&self) {
        if let Some(task) = self.lock_refresh_task().take() {
            task.cancel();
        }
    }

    async fn persist(&self, credential: &Credential) {
        if let Err(e) = self.inner.store.save(credential).await {
            warning!(
                "Failed to save token to {}: {}",
                self.inner.store.path().display(),
                e
            );
        }
    }

    fn schedule_refresh(&self, first_delay: Duration) {
        let weak: Weak<SessionInner> = Arc::downgrade(&self.inner);
        let task = ScheduledTask::spawn(first_delay, move |cadence| {
            let weak = weak.clone();
            async move {
                let session = AuthSession {
                    inner: weak.upgrade()?,
                };
                match session.refresh().await {
                    Ok(next) => {
                        info!(
                            "Access token has been refreshed, next refresh in {}s",
                            next.as_secs()
                        );
                        Some(next)
                    }
                    Err(e) => {
                        warning!("{}; retrying in {}s", e, cadence.as_secs());
                        Some(cadence)
                    }
                }
            }
        });

        *self.lock_refresh_task() = Some(task);
    }

    fn lock_refresh_task(&self) -> std::sync::MutexGuard<'_, Option<ScheduledTask>> {
        match self.inner.refresh_task.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
