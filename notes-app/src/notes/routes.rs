use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    config::config,
    state::{AppState, SharedWorkspace},
    Result,
};

use super::{
    form::{read_files, NoteForm},
    handlers, Note, NoteDraft, NotePatch, NoteQuery,
};

#[derive(Debug, Deserialize)]
struct NoteIdPath {
    note_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct AttachmentPath {
    note_id: Uuid,
    attachment_id: Uuid,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/v1/notes",
            get(find_notes)
                .post(create_note)
                .layer(DefaultBodyLimit::max(config().max_upload_bytes)),
        )
        .route(
            "/api/v1/notes/{note_id}",
            get(get_note)
                .patch(update_note)
                .delete(delete_note)
                .layer(DefaultBodyLimit::max(config().max_upload_bytes)),
        )
        .route("/api/v1/notes/{note_id}/archive", post(archive_note))
        .route("/api/v1/notes/{note_id}/pin", post(pin_note))
        .route("/api/v1/notes/{note_id}/restore", post(restore_note))
        .route("/api/v1/notes/{note_id}/duplicate", post(duplicate_note))
        .route("/api/v1/notes/{note_id}/trash", post(trash_note))
        .route("/api/v1/notes/{note_id}/purge", delete(purge_note))
        .route(
            "/api/v1/notes/{note_id}/attachments",
            post(upload_attachments).layer(DefaultBodyLimit::max(config().max_upload_bytes)),
        )
        .route(
            "/api/v1/notes/{note_id}/attachments/{attachment_id}",
            delete(remove_attachment),
        )
        .route("/api/v1/tags", get(find_tags))
        .with_state(state)
}

/// Rejected or unmatched mutations are not errors; they answer with an empty body.
fn note_or_no_content(note: Option<Note>) -> Response {
    match note {
        Some(note) => Json(note).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn find_notes(State(workspace): State<SharedWorkspace>, Query(query): Query<NoteQuery>) -> impl IntoResponse {
    handlers::find_notes(query, workspace).await.map(Json)
}

async fn find_tags(State(workspace): State<SharedWorkspace>) -> impl IntoResponse {
    handlers::find_tags(workspace).await.map(Json)
}

async fn create_note(
    State(workspace): State<SharedWorkspace>,
    NoteForm { fields, files }: NoteForm<NoteDraft>,
) -> Result<Response> {
    let note = handlers::create_note(fields, files, workspace).await?;
    Ok(match note {
        Some(note) => (StatusCode::CREATED, Json(note)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

async fn get_note(
    Path(NoteIdPath { note_id }): Path<NoteIdPath>,
    State(workspace): State<SharedWorkspace>,
) -> impl IntoResponse {
    handlers::get_note(note_id, workspace).await.map(Json)
}

async fn update_note(
    Path(NoteIdPath { note_id }): Path<NoteIdPath>,
    State(workspace): State<SharedWorkspace>,
    NoteForm { fields, files }: NoteForm<NotePatch>,
) -> Result<Response> {
    handlers::update_note(note_id, fields, files, workspace)
        .await
        .map(note_or_no_content)
}

async fn delete_note(
    Path(NoteIdPath { note_id }): Path<NoteIdPath>,
    State(workspace): State<SharedWorkspace>,
) -> Result<Response> {
    handlers::delete_note(note_id, workspace).await.map(note_or_no_content)
}

async fn trash_note(
    Path(NoteIdPath { note_id }): Path<NoteIdPath>,
    State(workspace): State<SharedWorkspace>,
) -> Result<Response> {
    handlers::trash_note(note_id, workspace).await.map(note_or_no_content)
}

async fn purge_note(
    Path(NoteIdPath { note_id }): Path<NoteIdPath>,
    State(workspace): State<SharedWorkspace>,
) -> Result<Response> {
    handlers::purge_note(note_id, workspace).await.map(note_or_no_content)
}

async fn archive_note(
    Path(NoteIdPath { note_id }): Path<NoteIdPath>,
    State(workspace): State<SharedWorkspace>,
) -> Result<Response> {
    handlers::archive_note(note_id, workspace).await.map(note_or_no_content)
}

async fn pin_note(
    Path(NoteIdPath { note_id }): Path<NoteIdPath>,
    State(workspace): State<SharedWorkspace>,
) -> Result<Response> {
    handlers::pin_note(note_id, workspace).await.map(note_or_no_content)
}

async fn restore_note(
    Path(NoteIdPath { note_id }): Path<NoteIdPath>,
    State(workspace): State<SharedWorkspace>,
) -> Result<Response> {
    handlers::restore_note(note_id, workspace).await.map(note_or_no_content)
}

async fn duplicate_note(
    Path(NoteIdPath { note_id }): Path<NoteIdPath>,
    State(workspace): State<SharedWorkspace>,
) -> Result<Response> {
    let note = handlers::duplicate_note(note_id, workspace).await?;
    Ok(match note {
        Some(note) => (StatusCode::CREATED, Json(note)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

async fn upload_attachments(
    Path(NoteIdPath { note_id }): Path<NoteIdPath>,
    State(workspace): State<SharedWorkspace>,
    multipart: Multipart,
) -> Result<Response> {
    let files = read_files(multipart).await?;
    handlers::add_attachments(note_id, files, workspace)
        .await
        .map(note_or_no_content)
}

async fn remove_attachment(
    Path(AttachmentPath { note_id, attachment_id }): Path<AttachmentPath>,
    State(workspace): State<SharedWorkspace>,
) -> Result<Response> {
    handlers::remove_attachment(note_id, attachment_id, workspace)
        .await
        .map(note_or_no_content)
}
