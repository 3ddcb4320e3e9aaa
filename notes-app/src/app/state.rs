use std::sync::Arc;

use axum::extract::FromRef;
use tokio::sync::Mutex;

use super::workspace::Workspace;

/// The workspace has exactly one mutator at a time; requests queue on this lock.
pub type SharedWorkspace = Arc<Mutex<Workspace>>;

#[derive(FromRef, Clone)]
pub struct AppState {
    pub workspace: SharedWorkspace,
}
