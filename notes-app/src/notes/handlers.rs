use serde::{Deserialize, Serialize};

use crate::{
    attachments::{self, Attachment, AttachmentId, FileInput},
    state::SharedWorkspace,
    Result,
};

use super::{query, Note, NoteDraft, NoteId, NotePatch, NoteQuery, NoteStore, ViewCounts};

#[derive(Debug, Serialize, Deserialize)]
pub struct FindNotesResponse {
    pub results: Vec<Note>,
    pub counts: ViewCounts,
    pub tags: Vec<String>,
}

pub async fn find_notes(query: NoteQuery, workspace: SharedWorkspace) -> Result<FindNotesResponse> {
    let workspace = workspace.lock().await;
    let store = workspace.notes()?;

    Ok(FindNotesResponse {
        results: query::derive(store.notes(), &query).into_iter().cloned().collect(),
        counts: query::counts(store.notes()),
        tags: store.all_tags(),
    })
}

pub async fn find_tags(workspace: SharedWorkspace) -> Result<Vec<String>> {
    let workspace = workspace.lock().await;
    Ok(workspace.notes()?.all_tags())
}

pub async fn get_note(note_id: NoteId, workspace: SharedWorkspace) -> Result<Note> {
    let workspace = workspace.lock().await;
    workspace
        .notes()?
        .get(note_id)
        .cloned()
        .ok_or_else(|| crate::Error::NotFound("Note not found".into()))
}

pub async fn create_note(
    mut draft: NoteDraft,
    files: Vec<FileInput>,
    workspace: SharedWorkspace,
) -> Result<Option<Note>> {
    draft.attachments.extend(encode_files(&workspace, files).await?);
    apply(workspace, |notes| notes.create(draft).cloned()).await
}

/// Uploaded files are appended to the note's attachments before the patch is merged.
pub async fn update_note(
    note_id: NoteId,
    mut patch: NotePatch,
    files: Vec<FileInput>,
    workspace: SharedWorkspace,
) -> Result<Option<Note>> {
    let encoded = encode_files(&workspace, files).await?;

    apply(workspace, |notes| {
        if !encoded.is_empty() {
            let mut attachments = match patch.attachments.take() {
                Some(attachments) => attachments,
                None => notes.get(note_id).map(|n| n.attachments.clone()).unwrap_or_default(),
            };
            attachments.extend(encoded);
            patch.attachments = Some(attachments);
        }
        notes.update(note_id, patch).cloned()
    })
    .await
}

/// First call moves the note to trash, second call removes it for good.
pub async fn delete_note(note_id: NoteId, workspace: SharedWorkspace) -> Result<Option<Note>> {
    apply(workspace, |notes| match notes.set_deleted(note_id)? {
        super::Deletion::Trashed => notes.get(note_id).cloned(),
        super::Deletion::Purged => None,
    })
    .await
}

pub async fn trash_note(note_id: NoteId, workspace: SharedWorkspace) -> Result<Option<Note>> {
    apply(workspace, |notes| notes.soft_delete(note_id).cloned()).await
}

pub async fn purge_note(note_id: NoteId, workspace: SharedWorkspace) -> Result<Option<Note>> {
    apply(workspace, |notes| notes.purge(note_id)).await
}

pub async fn archive_note(note_id: NoteId, workspace: SharedWorkspace) -> Result<Option<Note>> {
    apply(workspace, |notes| notes.toggle_archived(note_id).cloned()).await
}

pub async fn pin_note(note_id: NoteId, workspace: SharedWorkspace) -> Result<Option<Note>> {
    apply(workspace, |notes| notes.toggle_pinned(note_id).cloned()).await
}

pub async fn restore_note(note_id: NoteId, workspace: SharedWorkspace) -> Result<Option<Note>> {
    apply(workspace, |notes| notes.restore(note_id).cloned()).await
}

pub async fn duplicate_note(note_id: NoteId, workspace: SharedWorkspace) -> Result<Option<Note>> {
    apply(workspace, |notes| notes.duplicate(note_id).cloned()).await
}

pub async fn add_attachments(
    note_id: NoteId,
    files: Vec<FileInput>,
    workspace: SharedWorkspace,
) -> Result<Option<Note>> {
    let encoded = encode_files(&workspace, files).await?;
    apply(workspace, |notes| notes.add_attachments(note_id, encoded).cloned()).await
}

pub async fn remove_attachment(
    note_id: NoteId,
    attachment_id: AttachmentId,
    workspace: SharedWorkspace,
) -> Result<Option<Note>> {
    apply(workspace, |notes| notes.remove_attachment(note_id, attachment_id).cloned()).await
}

/// Files are encoded before the workspace is locked, so large uploads don't block other requests.
async fn encode_files(workspace: &SharedWorkspace, files: Vec<FileInput>) -> Result<Vec<Attachment>> {
    workspace.lock().await.notes()?;
    if files.is_empty() {
        return Ok(vec![]);
    }

    let encoded = attachments::encode_all(files).await;
    tracing::debug!("encoded {} attachment(s)", encoded.len());
    Ok(encoded)
}

async fn apply<R>(workspace: SharedWorkspace, f: impl FnOnce(&mut NoteStore) -> R) -> Result<R> {
    let mut workspace = workspace.lock().await;
    workspace.mutate(f).await
}
