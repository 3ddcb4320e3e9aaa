use axum::{
    extract::{multipart::Field, FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{attachments::FileInput, Error, Result};

pub const FILES_FIELD: &str = "files";

/// Editor form for a note, sent as JSON or as `multipart/form-data`.
///
/// In the multipart case every text part becomes a field of `T` and every
/// `files` part is collected, unvalidated, into `files`.
#[derive(Debug)]
pub struct NoteForm<T> {
    pub fields: T,
    pub files: Vec<FileInput>,
}

impl<S, T> FromRequest<S> for NoteForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        if !is_multipart(req.headers()) {
            let Json(fields) = Json::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return Ok(Self { fields, files: vec![] });
        }

        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        read_form(multipart).await.map_err(IntoResponse::into_response)
    }
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"))
}

async fn read_form<T: DeserializeOwned>(mut multipart: Multipart) -> Result<NoteForm<T>> {
    let mut fields = Map::new();
    let mut files = vec![];

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if name == FILES_FIELD {
            files.push(read_file(field).await?);
        } else {
            fields.insert(name, Value::String(field.text().await?));
        }
    }

    let fields = serde_json::from_value(Value::Object(fields)).map_err(|e| Error::Validation(e.to_string()))?;
    Ok(NoteForm { fields, files })
}

pub async fn read_files(mut multipart: Multipart) -> Result<Vec<FileInput>> {
    let mut files = vec![];
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILES_FIELD) {
            files.push(read_file(field).await?);
        }
    }
    Ok(files)
}

async fn read_file(field: Field<'_>) -> Result<FileInput> {
    let name = field.file_name().unwrap_or("file").to_owned();
    let mime_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_owned();
    let bytes = field.bytes().await?;
    Ok(FileInput::new(name, mime_type, bytes.to_vec()))
}
