//! Auth provider seam.
//!
//! The provider owns the sign-in flow and hands back a [`Session`] carrying the
//! bearer token and the resolved [`Role`].
use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tokio::fs;
use tokio::time::timeout;

use crate::config::{AuthConfig, ServiceConfig};
use crate::logutil::redact_email;
use crate::session::{Role, Session};

use super::RemoteError;

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Session restored from a previous sign-in, if still valid.
    async fn check_session(&self) -> Result<Option<Session>, RemoteError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, RemoteError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: Option<&str>,
    ) -> Result<Session, RemoteError>;

    async fn sign_out(&self) -> Result<(), RemoteError>;
}

/// Session as cached on disk between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedSession {
    session: Session,
    /// Unix seconds; absent means no known expiry.
    #[serde(default)]
    expires_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<serde_json::Value>,
}

/// Password-grant auth against the hosted provider, with a JSON session cache.
pub struct HttpAuthProvider {
    client: reqwest::Client,
    auth_url: String,
    service_url: String,
    anon_key: String,
    admin_emails: Vec<String>,
    session_file: PathBuf,
    timeout: Duration,
}

impl HttpAuthProvider {
    pub fn new(auth: &AuthConfig, service: &ServiceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            auth_url: auth.url.trim_end_matches('/').to_string(),
            service_url: service.base_url.trim_end_matches('/').to_string(),
            anon_key: service.anon_key.clone(),
            admin_emails: auth.admin_emails.clone(),
            session_file: PathBuf::from(&auth.session_file),
            timeout: service.timeout(),
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, RemoteError> {
        let response = timeout(self.timeout, request.send())
            .await
            .map_err(|_| RemoteError::Timeout(self.timeout.as_secs()))??;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn store_session(&self, cached: &CachedSession) -> Result<(), RemoteError> {
        let content = serde_json::to_string_pretty(cached)?;
        fs::write(&self.session_file, content).await?;
        Ok(())
    }

    fn session_from_token(&self, token: TokenResponse, fallback_email: &str) -> CachedSession {
        let email = token.user.email.unwrap_or_else(|| fallback_email.to_string());
        let username = token
            .user
            .user_metadata
            .as_ref()
            .and_then(|m| m.get("username"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| Session::default_username(&email));
        let role = Role::for_email(&email, &self.admin_emails);
        let expires_at = token.expires_at.or_else(|| {
            token
                .expires_in
                .map(|secs| chrono::Utc::now().timestamp() + secs)
        });
        CachedSession {
            session: Session::new(&token.user.id, &email, &username, &token.access_token, role),
            expires_at,
        }
    }
}

#[async_trait]
impl AuthProvider for HttpAuthProvider {
    async fn check_session(&self) -> Result<Option<Session>, RemoteError> {
        let content = match fs::read_to_string(&self.session_file).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let cached: CachedSession = serde_json::from_str(&content)?;
        if let Some(expires_at) = cached.expires_at {
            if expires_at <= chrono::Utc::now().timestamp() {
                debug!("cached session expired at {}", expires_at);
                return Ok(None);
            }
        }
        let mut session = cached.session;
        // admin list may have changed since the session was cached
        session.role = Role::for_email(&session.email, &self.admin_emails);
        Ok(Some(session))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.auth_url);
        let request = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }));
        let response = self.send(request).await?;
        let token: TokenResponse = serde_json::from_str(&response.text().await?)?;

        let cached = self.session_from_token(token, email);
        self.store_session(&cached).await?;
        info!(
            "signed in as {} ({})",
            redact_email(&cached.session.email),
            cached.session.role.name()
        );
        Ok(cached.session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: Option<&str>,
    ) -> Result<Session, RemoteError> {
        let url = format!("{}/auth/signup", self.service_url);
        let request = self
            .client
            .post(&url)
            .bearer_auth(&self.anon_key)
            .json(&json!({ "email": email, "password": password, "username": username }));
        self.send(request).await?;
        info!("account created for {}", redact_email(email));
        self.sign_in(email, password).await
    }

    async fn sign_out(&self) -> Result<(), RemoteError> {
        if let Ok(Some(session)) = self.check_session().await {
            let url = format!("{}/auth/v1/logout", self.auth_url);
            let request = self
                .client
                .post(&url)
                .header("apikey", &self.anon_key)
                .bearer_auth(&session.access_token);
            if let Err(e) = self.send(request).await {
                warn!("remote sign-out failed: {}", e);
            }
        }
        match fs::remove_file(&self.session_file).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Local provider for offline runs and tests: any password is accepted and the user
/// id is derived from the email.
pub struct StaticAuthProvider {
    admin_emails: Vec<String>,
    current: Mutex<Option<Session>>,
}

impl StaticAuthProvider {
    pub fn new(admin_emails: Vec<String>) -> Self {
        Self {
            admin_emails,
            current: Mutex::new(None),
        }
    }

    /// Provider that already holds `session`.
    pub fn signed_in(session: Session) -> Self {
        Self {
            admin_emails: Vec::new(),
            current: Mutex::new(Some(session)),
        }
    }

    fn set(&self, session: Option<Session>) -> Result<(), RemoteError> {
        let mut guard = self
            .current
            .lock()
            .map_err(|_| RemoteError::Unavailable("auth lock poisoned".to_string()))?;
        *guard = session;
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn check_session(&self) -> Result<Option<Session>, RemoteError> {
        let guard = self
            .current
            .lock()
            .map_err(|_| RemoteError::Unavailable("auth lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    async fn sign_in(&self, email: &str, _password: &str) -> Result<Session, RemoteError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(RemoteError::NotAuthenticated);
        }
        let username = Session::default_username(email);
        let session = Session::new(
            &format!("local-{}", email.to_lowercase()),
            email,
            &username,
            "",
            Role::for_email(email, &self.admin_emails),
        );
        self.set(Some(session.clone()))?;
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: Option<&str>,
    ) -> Result<Session, RemoteError> {
        let mut session = self.sign_in(email, password).await?;
        if let Some(name) = username.filter(|n| !n.trim().is_empty()) {
            session.username = name.to_string();
            self.set(Some(session.clone()))?;
        }
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), RemoteError> {
        self.set(None)
    }
}
