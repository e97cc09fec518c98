//! Remote store: the key-value backed HTTP API holding global templates and per-user
//! records.
use async_trait::async_trait;
use log::{debug, trace};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::ServiceConfig;
use crate::journey::types::{Item, Narratives, Quest};
use crate::session::Session;

use super::records::{GlobalConfigRecord, NarrativesRecord, ProgressSave, UserDataRecord};
use super::RemoteError;

#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn health(&self) -> Result<(), RemoteError>;

    /// Global narratives and templates. Readable without a session.
    async fn fetch_global_config(
        &self,
        session: Option<&Session>,
    ) -> Result<GlobalConfigRecord, RemoteError>;

    async fn save_narratives(
        &self,
        session: &Session,
        narratives: &Narratives,
    ) -> Result<(), RemoteError>;

    async fn save_global_quests(&self, session: &Session, quests: &[Quest])
        -> Result<(), RemoteError>;

    async fn save_global_inventory(
        &self,
        session: &Session,
        inventory: &[Item],
    ) -> Result<(), RemoteError>;

    async fn fetch_user_data(&self, session: &Session) -> Result<UserDataRecord, RemoteError>;

    async fn save_user_progress(
        &self,
        session: &Session,
        save: &ProgressSave,
    ) -> Result<(), RemoteError>;

    /// Delete every per-user record so the next load starts from templates.
    async fn reset_user(&self, session: &Session) -> Result<(), RemoteError>;
}

/// [`RemoteStore`] over HTTP.
pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    timeout: Duration,
}

impl HttpRemoteStore {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            timeout: config.timeout(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn bearer<'a>(&'a self, session: Option<&'a Session>) -> &'a str {
        session
            .map(|s| s.access_token.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.anon_key)
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

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        session: Option<&Session>,
    ) -> Result<T, RemoteError> {
        let url = self.url(path);
        debug!("GET {}", url);
        let request = self.client.get(&url).bearer_auth(self.bearer(session));
        let response = self.send(request).await?;
        let text = timeout(self.timeout, response.text())
            .await
            .map_err(|_| RemoteError::Timeout(self.timeout.as_secs()))??;
        trace!("GET {} -> {} bytes", path, text.len());
        Ok(serde_json::from_str(&text)?)
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        session: &Session,
        body: &B,
    ) -> Result<(), RemoteError> {
        let url = self.url(path);
        debug!("POST {}", url);
        let request = self
            .client
            .post(&url)
            .bearer_auth(self.bearer(Some(session)))
            .json(body);
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn health(&self) -> Result<(), RemoteError> {
        let _: serde_json::Value = self.get_json("health", None).await?;
        Ok(())
    }

    async fn fetch_global_config(
        &self,
        session: Option<&Session>,
    ) -> Result<GlobalConfigRecord, RemoteError> {
        self.get_json("global/config", session).await
    }

    async fn save_narratives(
        &self,
        session: &Session,
        narratives: &Narratives,
    ) -> Result<(), RemoteError> {
        self.post_json("global/narratives", session, &NarrativesRecord::from(narratives))
            .await
    }

    async fn save_global_quests(
        &self,
        session: &Session,
        quests: &[Quest],
    ) -> Result<(), RemoteError> {
        self.post_json("global/quests", session, &json!({ "quests": quests }))
            .await
    }

    async fn save_global_inventory(
        &self,
        session: &Session,
        inventory: &[Item],
    ) -> Result<(), RemoteError> {
        self.post_json("global/inventory", session, &json!({ "inventory": inventory }))
            .await
    }

    async fn fetch_user_data(&self, session: &Session) -> Result<UserDataRecord, RemoteError> {
        let path = format!("user/data?userId={}", urlencoding::encode(&session.user_id));
        self.get_json(&path, Some(session)).await
    }

    async fn save_user_progress(
        &self,
        session: &Session,
        save: &ProgressSave,
    ) -> Result<(), RemoteError> {
        self.post_json("user/save", session, save).await
    }

    async fn reset_user(&self, session: &Session) -> Result<(), RemoteError> {
        self.post_json("user/reset", session, &json!({ "userId": session.user_id }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;

    #[test]
    fn urls_join_without_double_slash() {
        let store = HttpRemoteStore::new(&ServiceConfig {
            base_url: "https://svc.example/functions/v1/make-server/".into(),
            anon_key: "anon".into(),
            timeout_seconds: 5,
        });
        assert_eq!(
            store.url("global/config"),
            "https://svc.example/functions/v1/make-server/global/config"
        );
    }

    #[test]
    fn bearer_prefers_session_token() {
        let store = HttpRemoteStore::new(&ServiceConfig {
            anon_key: "anon".into(),
            ..ServiceConfig::default()
        });
        let session = Session::new("u", "a@b.c", "a", "tok", Role::Player);
        assert_eq!(store.bearer(Some(&session)), "tok");
        assert_eq!(store.bearer(None), "anon");
        let blank = Session::new("u", "a@b.c", "a", "", Role::Player);
        assert_eq!(store.bearer(Some(&blank)), "anon");
    }

    #[tokio::test]
    async fn unreachable_service_is_an_error() {
        let store = HttpRemoteStore::new(&ServiceConfig {
            base_url: "http://127.0.0.1:9".into(),
            anon_key: String::new(),
            timeout_seconds: 2,
        });
        assert!(store.health().await.is_err());
    }
}
