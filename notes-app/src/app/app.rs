use std::{sync::Arc, time::Duration};

use axum::Router;
use tokio::sync::Mutex;

use crate::{auth, config::config, db::DB, notes, storage::Storage};

use super::{errors, state::AppState, workspace::Workspace};

pub async fn create_app(db: DB) -> errors::Result<Router> {
    let config = config();

    let storage = Storage::new(db);
    let workspace = Workspace::open(storage, Duration::from_millis(config.auth_latency_ms)).await?;

    let state = AppState {
        workspace: Arc::new(Mutex::new(workspace)),
    };

    let app = Router::new()
        .merge(auth::router(state.clone()))
        .merge(notes::router(state));

    Ok(app)
}
