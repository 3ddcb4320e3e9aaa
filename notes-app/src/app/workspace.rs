use std::time::Duration;

use crate::{
    auth::{AuthGate, AuthState},
    notes::NoteStore,
    storage::Storage,
    users::Identity,
};

use super::errors::{Error, Result};

/// Application state for one running instance: the auth gate and, while someone
/// is logged in, that identity's notes.
pub struct Workspace {
    storage: Storage,
    gate: AuthGate,
    notes: Option<NoteStore>,
}

impl Workspace {
    /// Opens the workspace, resuming a stored session when there is one.
    pub async fn open(storage: Storage, auth_latency: Duration) -> Result<Self> {
        let mut gate = AuthGate::new(storage.clone(), auth_latency);
        let notes = match gate.restore().await? {
            Some(identity) => {
                tracing::info!("resuming session for {}", identity.email);
                Some(NoteStore::load(&storage, identity.id).await?)
            }
            None => None,
        };

        Ok(Self { storage, gate, notes })
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.gate.identity()
    }

    pub fn auth_state(&self) -> &AuthState {
        self.gate.state()
    }

    pub async fn register(&mut self, email: &str, password: &str, name: &str) -> Result<Identity> {
        let identity = self.gate.register(email, password, name).await?;
        self.switch_to(&identity).await?;
        Ok(identity)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<Identity> {
        let identity = self.gate.login(email, password).await?;
        self.switch_to(&identity).await?;
        Ok(identity)
    }

    pub async fn logout(&mut self) -> Result<()> {
        self.gate.logout().await?;
        self.notes = None;
        Ok(())
    }

    pub fn notes(&self) -> Result<&NoteStore> {
        self.notes.as_ref().ok_or(Error::Unauthorized)
    }

    /// Applies `f` to a copy of the active note collection and writes the whole copy back.
    /// The copy replaces the live collection only once it is stored.
    pub async fn mutate<R>(&mut self, f: impl FnOnce(&mut NoteStore) -> R) -> Result<R> {
        let mut next = self.notes.as_ref().ok_or(Error::Unauthorized)?.clone();
        let result = f(&mut next);
        next.save(&self.storage).await?;
        self.notes = Some(next);
        Ok(result)
    }

    async fn switch_to(&mut self, identity: &Identity) -> Result<()> {
        if self.notes.as_ref().is_some_and(|n| n.owner() == identity.id) {
            return Ok(());
        }
        self.notes = Some(NoteStore::load(&self.storage, identity.id).await?);
        Ok(())
    }
}
