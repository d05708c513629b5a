use serde_json::Value;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::api::ApiClient;
use crate::error::AppError;
use crate::models::{Credentials, Registration, Session};
use crate::storage::StoreHandle;

/// Storage key holding the serialized [`Session`].
pub const SESSION_KEY: &str = "currentUser";

/// Owns the current session and publishes every change to subscribers.
///
/// The persisted cell is always written before the new value is published, so a
/// subscriber never observes a session that a restart would not restore.
pub struct SessionManager {
    api: ApiClient,
    store: StoreHandle,
    current: watch::Sender<Option<Session>>,
}

impl SessionManager {
    /// Builds the manager from whatever session was last persisted. No expiry check is
    /// made; a stale token stays "logged in" until the backend rejects it.
    pub fn restore(api: ApiClient, store: StoreHandle) -> Self {
        let restored = load_persisted(&store);
        if restored.is_some() {
            info!("Restored persisted session");
        }

        SessionManager {
            api,
            store,
            current: watch::Sender::new(restored),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let credentials = validate_credentials(email, password)?;

        let session = self.api.login(&credentials).await.inspect_err(|err| {
            warn!(error = %err, "Login failed");
        })?;
        if session.token.is_empty() {
            warn!("Login response carried an empty token");
            return Err(AppError::Server(
                "login response has an empty token".to_string(),
            ));
        }

        self.store
            .set(SESSION_KEY, &serde_json::to_string(&session)?)?;
        self.current.send_replace(Some(session.clone()));
        info!(email = %credentials.email, "User logged in");

        Ok(session)
    }

    /// Creates an account. The new user is not logged in.
    pub async fn register(&self, registration: &Registration) -> Result<Value, AppError> {
        if registration.email.trim().is_empty() {
            return Err(AppError::Validation("Email is required"));
        }
        if registration.password.is_empty() {
            return Err(AppError::Validation("Password is required"));
        }

        let account = self.api.register(registration).await.inspect_err(|err| {
            warn!(error = %err, "Registration failed");
        })?;
        info!(email = %registration.email, "Account registered");

        Ok(account)
    }

    /// Clears the persisted cell, falling back to blanking it when removal fails, so a
    /// restart never brings the old session back.
    pub fn logout(&self) {
        if let Err(err) = self.store.remove(SESSION_KEY) {
            warn!(error = %err, "Failed to remove persisted session, blanking it");
            if let Err(err) = self.store.set(SESSION_KEY, "") {
                error!(error = %err, "Failed to clear persisted session");
            }
        }
        self.current.send_replace(None);
        info!("User logged out");
    }

    pub fn token(&self) -> Option<String> {
        self.current
            .borrow()
            .as_ref()
            .map(|session| session.token.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.borrow().is_some()
    }

    pub fn current_user(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    /// The receiver starts at the current value, including one restored at startup.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }
}

fn load_persisted(store: &StoreHandle) -> Option<Session> {
    let raw = match store.get(SESSION_KEY) {
        Ok(raw) => raw?,
        Err(err) => {
            warn!(error = %err, "Failed to read persisted session");
            return None;
        }
    };
    if raw.is_empty() {
        return None;
    }

    match serde_json::from_str::<Session>(&raw) {
        Ok(session) if !session.token.is_empty() => Some(session),
        Ok(_) => None,
        Err(err) => {
            warn!(error = %err, "Ignoring malformed persisted session");
            None
        }
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<Credentials, AppError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::Validation("Email is required"));
    }
    if !looks_like_email(email) {
        return Err(AppError::Validation("Please enter a valid email"));
    }
    if password.is_empty() {
        return Err(AppError::Validation("Password is required"));
    }

    Ok(Credentials {
        email: email.to_string(),
        password: password.to_string(),
    })
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
