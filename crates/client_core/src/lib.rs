use std::sync::Arc;

use anyhow::Result;
use shared::domain::{Employee, EmployeeId};
use storage::KeyValueStore;
use tokio::sync::broadcast;
use tracing::warn;

pub mod error;
pub mod forms;
pub mod gateway;
pub mod list_controller;
pub mod session;
pub mod shell;
pub mod view;

pub use error::{FormError, GatewayError, SessionError};
pub use forms::EmployeeForm;
pub use gateway::{DirectoryGateway, GraphQlGateway};
pub use list_controller::{ListController, ListQuery, ListStatus, ListView, PAGE_SIZE};
pub use session::{SessionSnapshot, SessionStore, TOKEN_KEY, USER_KEY};
pub use shell::{Capabilities, Navigation, Route, ViewMode, ViewShell};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// A user-facing notice. Blocking notices must be acknowledged before the user continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub blocking: bool,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
            blocking: false,
        }
    }

    pub fn blocking_error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
            blocking: true,
        }
    }
}

/// Change notifications published to the view layer, which re-derives its output on each one.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    SessionChanged(SessionSnapshot),
    SessionExpired,
    ListUpdated(ListView),
    Notification(Notification),
}

/// Wires the gateway, session store and list controller over one event bus.
pub struct DirectoryClient {
    gateway: Arc<dyn DirectoryGateway>,
    session: Arc<SessionStore>,
    list: Arc<ListController>,
    events: broadcast::Sender<ClientEvent>,
}

impl DirectoryClient {
    pub async fn new_with_dependencies(
        gateway: Arc<dyn DirectoryGateway>,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let session = SessionStore::rehydrate(gateway.clone(), storage, events.clone()).await?;
        let list = Arc::new(ListController::new(gateway.clone(), events.clone()));
        Ok(Self {
            gateway,
            session,
            list,
            events,
        })
    }

    pub fn gateway(&self) -> &Arc<dyn DirectoryGateway> {
        &self.gateway
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn list(&self) -> &Arc<ListController> {
        &self.list
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub async fn capabilities(&self) -> Capabilities {
        Capabilities::for_user(self.session.current_user().await.as_ref())
    }

    /// Fetches one employee for the detail view.
    pub async fn employee_detail(&self, id: &EmployeeId) -> Result<Option<Employee>, GatewayError> {
        let result = self.gateway.employee(id).await;
        if let Err(err) = &result {
            self.expire_session_if_unauthorized(err).await;
        }
        result
    }

    /// Ends the session when the gateway has rejected its token.
    pub async fn expire_session_if_unauthorized(&self, err: &GatewayError) -> bool {
        if !err.is_unauthorized() {
            return false;
        }
        warn!("gateway rejected the session token; signing out");
        self.session.invalidate().await;
        true
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
