use std::time::Duration;

use uuid::Uuid;

use crate::{
    storage::{keys, Storage},
    users::{Credential, Identity},
};

use super::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Anonymous,
    Authenticating,
    Authenticated(Identity),
}

/// Owns the credential list and the session identity.
///
/// Email and password comparisons are exact, and credentials are kept in
/// cleartext. Neither is suitable outside a single-user local install.
pub struct AuthGate {
    storage: Storage,
    state: AuthState,
    latency: Duration,
}

impl AuthGate {
    pub fn new(storage: Storage, latency: Duration) -> Self {
        Self {
            storage,
            state: AuthState::Anonymous,
            latency,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.state {
            AuthState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    /// Picks up the session left by a previous run, if any.
    pub async fn restore(&mut self) -> Result<Option<Identity>> {
        let identity = match self.storage.get_item::<Identity>(keys::CURRENT_USER).await {
            Ok(identity) => identity,
            Err(crate::db::Error::Serde(err)) => {
                tracing::warn!("ignoring unreadable session: {err}");
                None
            }
            Err(err) => return Err(err.into()),
        };

        self.state = match &identity {
            Some(identity) => AuthState::Authenticated(identity.clone()),
            None => AuthState::Anonymous,
        };

        Ok(identity)
    }

    pub async fn register(&mut self, email: &str, password: &str, name: &str) -> Result<Identity> {
        let previous = self.begin().await;

        let result = self.add_credential(email, password, name).await;

        self.settle(previous, result).await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<Identity> {
        let previous = self.begin().await;

        let result = self
            .credentials()
            .await
            .and_then(|users| {
                users
                    .iter()
                    .find(|u| u.email == email && u.password == password)
                    .map(Credential::identity)
                    .ok_or(Error::InvalidCredentials)
            });

        self.settle(previous, result).await
    }

    pub async fn logout(&mut self) -> Result<()> {
        self.storage.remove_item(keys::CURRENT_USER).await?;
        if let Some(identity) = self.identity() {
            tracing::info!("{} logged out", identity.email);
        }
        self.state = AuthState::Anonymous;
        Ok(())
    }

    async fn add_credential(&self, email: &str, password: &str, name: &str) -> Result<Identity> {
        let mut users = self.credentials().await?;
        if users.iter().any(|u| u.email == email) {
            return Err(Error::DuplicateEmail);
        }

        let credential = Credential {
            id: Uuid::now_v7(),
            email: email.to_owned(),
            password: password.to_owned(),
            name: name.to_owned(),
        };
        let identity = credential.identity();

        users.push(credential);
        self.storage.set_item(keys::USERS, &users).await?;
        tracing::info!("{email} registered");

        Ok(identity)
    }

    /// An unreadable credential list is an error, never an empty one: a register on top
    /// of it would overwrite every stored account.
    async fn credentials(&self) -> Result<Vec<Credential>> {
        let users = self.storage.get_item(keys::USERS).await.map_err(|err| {
            if let crate::db::Error::Serde(err) = &err {
                tracing::warn!("stored credentials are unreadable, refusing to touch them: {err}");
            }
            err
        })?;
        Ok(users.unwrap_or_default())
    }

    async fn begin(&mut self) -> AuthState {
        let previous = std::mem::replace(&mut self.state, AuthState::Authenticating);
        tokio::time::sleep(self.latency).await;
        previous
    }

    /// Stores the session on success, otherwise puts back the state held before the attempt.
    async fn settle(&mut self, previous: AuthState, result: Result<Identity>) -> Result<Identity> {
        let stored = match result {
            Ok(identity) => self
                .storage
                .set_item(keys::CURRENT_USER, &identity)
                .await
                .map(|_| identity)
                .map_err(Error::from),
            Err(err) => Err(err),
        };

        match stored {
            Ok(identity) => {
                tracing::info!("{} logged in", identity.email);
                self.state = AuthState::Authenticated(identity.clone());
                Ok(identity)
            }
            Err(err) => {
                tracing::debug!("authentication failed: {err}");
                self.state = previous;
                Err(err)
            }
        }
    }
}
