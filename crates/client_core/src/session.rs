//! Session store: the signed-in token and user, persisted across restarts.
//!
//! The store is authenticated exactly when a token is present. Nothing checks token
//! expiry locally; a stale token stays in place until the gateway rejects a request and
//! [`SessionStore::invalidate`] is called.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use shared::domain::User;
use storage::KeyValueStore;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

use crate::{error::SessionError, gateway::DirectoryGateway, ClientEvent};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub user: Option<User>,
    /// Set for sessions created in this process; rehydrated sessions leave it empty.
    pub signed_in_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

pub struct SessionStore {
    gateway: Arc<dyn DirectoryGateway>,
    storage: Arc<dyn KeyValueStore>,
    state: RwLock<SessionSnapshot>,
    events: broadcast::Sender<ClientEvent>,
}

impl SessionStore {
    /// Restores whatever token and user were last persisted.
    pub async fn rehydrate(
        gateway: Arc<dyn DirectoryGateway>,
        storage: Arc<dyn KeyValueStore>,
        events: broadcast::Sender<ClientEvent>,
    ) -> Result<Arc<Self>> {
        let token = storage.get_item(TOKEN_KEY).await?;
        let user = match storage.get_item(USER_KEY).await? {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(err) => {
                    warn!("ignoring unreadable persisted user: {err}");
                    None
                }
            },
            None => None,
        };

        gateway.set_auth_token(token.clone());
        if token.is_some() {
            info!(
                username = user.as_ref().map(|u| u.username.as_str()).unwrap_or("<unknown>"),
                "restored persisted session"
            );
        }

        Ok(Arc::new(Self {
            gateway,
            storage,
            state: RwLock::new(SessionSnapshot {
                token,
                user,
                signed_in_at: None,
            }),
            events,
        }))
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    /// Exchanges credentials for a session. On any failure the previous session is kept.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, SessionError> {
        let payload = match self.gateway.login(username, password).await {
            Ok(payload) => payload,
            Err(err) => {
                warn!(username, "login rejected: {err}");
                return Err(SessionError::Login(err));
            }
        };
        if payload.token.is_empty() {
            return Err(SessionError::EmptyLogin);
        }

        let user_json = serde_json::to_string(&payload.user)?;
        self.storage
            .set_items(&[(TOKEN_KEY, payload.token.as_str()), (USER_KEY, user_json.as_str())])
            .await
            .map_err(SessionError::Persist)?;

        let snapshot = {
            let mut guard = self.state.write().await;
            *guard = SessionSnapshot {
                token: Some(payload.token.clone()),
                user: Some(payload.user.clone()),
                signed_in_at: Some(Utc::now()),
            };
            guard.clone()
        };
        self.gateway.set_auth_token(Some(payload.token));
        info!(username = %payload.user.username, role = payload.user.role.as_str(), "signed in");
        let _ = self.events.send(ClientEvent::SessionChanged(snapshot));

        Ok(payload.user)
    }

    /// Clears the persisted and in-memory session. The in-memory session is cleared even
    /// when the storage write fails; the storage error is still returned.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let persisted = self
            .storage
            .remove_items(&[TOKEN_KEY, USER_KEY])
            .await
            .map_err(SessionError::Persist);

        let previous = {
            let mut guard = self.state.write().await;
            std::mem::take(&mut *guard)
        };
        self.gateway.set_auth_token(None);
        if let Some(user) = previous.user {
            info!(username = %user.username, "signed out");
        }
        let _ = self
            .events
            .send(ClientEvent::SessionChanged(SessionSnapshot::default()));

        persisted
    }

    /// Drops a session the gateway no longer accepts.
    pub async fn invalidate(&self) {
        if let Err(err) = self.logout().await {
            warn!("failed to clear persisted session after rejection: {err}");
        }
        let _ = self.events.send(ClientEvent::SessionExpired);
    }

    /// Asks the gateway who the token belongs to, signing out if it is rejected.
    pub async fn verify(&self) -> Result<Option<User>, crate::error::GatewayError> {
        if !self.is_authenticated().await {
            return Ok(None);
        }
        match self.gateway.current_user().await {
            Ok(user) => Ok(user),
            Err(err) if err.is_unauthorized() => {
                self.invalidate().await;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
