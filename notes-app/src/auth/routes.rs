use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::{
    state::{AppState, SharedWorkspace},
    users::Identity,
    Error, Result,
};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl RegisterForm {
    fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() {
            return Err(Error::Validation("Email is required".into()));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation("Name is required".into()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .with_state(state)
}

pub async fn register(
    State(workspace): State<SharedWorkspace>,
    Json(form): Json<RegisterForm>,
) -> Result<Json<Identity>> {
    form.validate()?;

    let mut workspace = workspace.lock().await;
    let identity = workspace.register(&form.email, &form.password, &form.name).await?;

    Ok(Json(identity))
}

pub async fn login(State(workspace): State<SharedWorkspace>, Json(form): Json<LoginForm>) -> Result<Json<Identity>> {
    let mut workspace = workspace.lock().await;
    let identity = workspace.login(&form.email, &form.password).await?;

    Ok(Json(identity))
}

pub async fn logout(State(workspace): State<SharedWorkspace>) -> Result<StatusCode> {
    workspace.lock().await.logout().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(State(workspace): State<SharedWorkspace>) -> Result<Json<Identity>> {
    let workspace = workspace.lock().await;
    workspace.identity().cloned().map(Json).ok_or(Error::Unauthorized)
}
