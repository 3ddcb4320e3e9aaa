mod app;
mod attachments;
mod auth;
mod db;
mod notes;
mod shared;
mod storage;
mod users;

pub use app::{config, create_app, errors::{self, Error, Result}, state};
use db::init_db;
use shared::tracing::{add_tracing_layer, setup_tracing};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> errors::Result<()> {
    let config = config::config();

    setup_tracing(config.log_json);

    let conn = init_db().await?;

    let app = create_app(conn).await?;
    let app = add_tracing_layer(app);

    let port = config.port;
    let listener = TcpListener::bind(format!("127.0.0.1:{port}"))
        .await
        .map_err(|e| Error::Unexpected(e.to_string()))?;

    if let Ok(addr) = listener.local_addr() {
        tracing::info!("listening on http://{addr}");
    }

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Unexpected(e.to_string()))?;

    Ok(())
}
