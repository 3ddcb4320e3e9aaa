use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

/// The public face of an account, kept as the session record.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    pub name: String,
}

/// Stored account record. Only read while checking a login.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credential {
    pub id: UserId,
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Credential {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &"[redacted]")
            .finish()
    }
}
