//! User session lifecycle.
//!
//! Login goes through the backend's `login` control action; the resulting
//! user is cached locally so a restart (or an offline launch) restores the
//! session without a round trip.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;

use safetycheck_core::{Role, User};
use safetycheck_gateway::{Action, Gateway, GatewayError};
use safetycheck_store::{LocalStore, keys};

#[derive(Debug, Error)]
pub enum SessionError {
    /// The backend rejected the credentials.
    #[error("authentication failed: {0}")]
    Rejected(String),

    /// The user table is empty; the first admin account must be registered.
    #[error("no users registered")]
    NoUsers,

    /// The ack was missing the user object.
    #[error("malformed login response")]
    MalformedResponse,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Holds the current user and its local cache.
pub struct SessionManager<S, G> {
    store: Arc<S>,
    gateway: Arc<G>,
    current: Mutex<Option<User>>,
}

impl<S: LocalStore, G: Gateway> SessionManager<S, G> {
    /// Load, restoring a cached session if one exists.
    pub async fn load(store: Arc<S>, gateway: Arc<G>) -> Self {
        let current = match store.get_json::<User>(keys::SESSION_USER).await {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!(%err, "failed to restore cached session");
                None
            }
        };
        Self {
            store,
            gateway,
            current: Mutex::new(current),
        }
    }

    pub async fn current(&self) -> Option<User> {
        self.current.lock().await.clone()
    }

    /// Authenticate against the backend and cache the session.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, SessionError> {
        let ack = self
            .gateway
            .post_action(&Action::Login {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;

        if !ack.is_success() {
            if ack.code() == Some("NO_USERS") {
                return Err(SessionError::NoUsers);
            }
            return Err(SessionError::Rejected(
                ack.message().unwrap_or("Authentication failed.").to_string(),
            ));
        }

        let raw = ack.field("user").ok_or(SessionError::MalformedResponse)?;
        let user = parse_user(raw, username).ok_or(SessionError::MalformedResponse)?;

        if let Err(err) = self.store.put_json(keys::SESSION_USER, &user).await {
            tracing::warn!(%err, "failed to cache session user");
        }
        *self.current.lock().await = Some(user.clone());
        tracing::info!(username = %user.username, role = %user.role, "logged in");
        Ok(user)
    }

    /// Register the first admin account (only offered when the user table is
    /// empty).
    pub async fn register_admin(
        &self,
        username: &str,
        password: &str,
        name: &str,
        position: &str,
    ) -> Result<(), SessionError> {
        let ack = self
            .gateway
            .post_action(&Action::RegisterUser {
                username: username.to_string(),
                password: password.to_string(),
                name: name.to_string(),
                position: position.to_string(),
                role: Role::Admin.as_str().to_string(),
            })
            .await?;

        if !ack.is_success() {
            return Err(SessionError::Rejected(
                ack.message().unwrap_or("Registration failed.").to_string(),
            ));
        }
        Ok(())
    }

    /// End the session and drop the cached copy.
    pub async fn logout(&self) {
        *self.current.lock().await = None;
        if let Err(err) = self.store.remove(keys::SESSION_USER).await {
            tracing::warn!(%err, "failed to clear cached session");
        }
    }
}

/// Normalize the backend's user object. Roles in the sheet are free text,
/// so anything unrecognized becomes `Inspector`.
fn parse_user(raw: &Value, fallback_username: &str) -> Option<User> {
    let obj = raw.as_object()?;
    let username = obj
        .get("username")
        .and_then(Value::as_str)
        .unwrap_or(fallback_username)
        .to_string();
    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(&username)
        .to_string();
    let role = Role::parse_lenient(obj.get("role").and_then(Value::as_str).unwrap_or(""));
    let position = obj
        .get("position")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .map(str::to_string);
    let last_login = obj
        .get("lastLogin")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(User {
        username,
        name,
        role,
        position,
        last_login,
    })
}
