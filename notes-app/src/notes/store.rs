use std::collections::BTreeSet;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    attachments::{Attachment, AttachmentId},
    db,
    storage::{keys, Storage},
    users::UserId,
};

use super::{Note, NoteDraft, NoteId, NotePatch};

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Deletion {
    /// Moved to the trash, recoverable with restore.
    Trashed,
    /// Removed permanently.
    Purged,
}

/// One identity's notes, newest first by insertion.
#[derive(Debug, Clone)]
pub struct NoteStore {
    owner: UserId,
    notes: Vec<Note>,
}

impl NoteStore {
    pub fn new(owner: UserId, notes: Vec<Note>) -> Self {
        Self { owner, notes }
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    fn get_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        self.notes.iter_mut().find(|n| n.id == id)
    }

    pub fn create(&mut self, draft: NoteDraft) -> Option<&Note> {
        if draft.is_blank() {
            tracing::debug!("ignoring blank note draft");
            return None;
        }

        let now = Utc::now();
        let note = Note {
            id: Uuid::now_v7(),
            title: draft.title,
            content: draft.content,
            created_at: now,
            updated_at: now,
            is_archived: false,
            is_deleted: false,
            is_pinned: false,
            color: draft.color,
            tags: draft.tags.into_vec(),
            attachments: draft.attachments,
        };

        tracing::debug!("note {} created", note.id);
        self.notes.insert(0, note);
        self.notes.first()
    }

    /// Merges `patch` into the note. A patch that would leave the note without title,
    /// content and attachments is ignored.
    pub fn update(&mut self, id: NoteId, patch: NotePatch) -> Option<&Note> {
        let note = self.get_mut(id)?;

        let title = patch.title.unwrap_or_else(|| note.title.clone());
        let content = patch.content.unwrap_or_else(|| note.content.clone());
        let attachments = patch.attachments.unwrap_or_else(|| note.attachments.clone());
        if title.trim().is_empty() && content.trim().is_empty() && attachments.is_empty() {
            tracing::debug!("ignoring update that would blank note {id}");
            return None;
        }

        note.title = title;
        note.content = content;
        note.attachments = attachments;
        if let Some(color) = patch.color {
            note.color = color;
        }
        if let Some(tags) = patch.tags {
            note.tags = tags.into_vec();
        }
        touch(note);

        Some(&*note)
    }

    pub fn soft_delete(&mut self, id: NoteId) -> Option<&Note> {
        let note = self.get_mut(id)?;
        note.is_deleted = true;
        Some(&*note)
    }

    /// Permanently removes a note that is already in the trash.
    pub fn purge(&mut self, id: NoteId) -> Option<Note> {
        let index = self.notes.iter().position(|n| n.id == id && n.is_deleted)?;
        tracing::debug!("note {id} purged");
        Some(self.notes.remove(index))
    }

    /// Two-stage delete: trashes a live note, purges a trashed one.
    pub fn set_deleted(&mut self, id: NoteId) -> Option<Deletion> {
        if self.get(id)?.is_deleted {
            self.purge(id).map(|_| Deletion::Purged)
        } else {
            self.soft_delete(id).map(|_| Deletion::Trashed)
        }
    }

    pub fn toggle_archived(&mut self, id: NoteId) -> Option<&Note> {
        let note = self.get_mut(id)?;
        note.is_archived = !note.is_archived;
        Some(&*note)
    }

    pub fn toggle_pinned(&mut self, id: NoteId) -> Option<&Note> {
        let note = self.get_mut(id)?;
        note.is_pinned = !note.is_pinned;
        touch(note);
        Some(&*note)
    }

    pub fn restore(&mut self, id: NoteId) -> Option<&Note> {
        let note = self.get_mut(id)?;
        note.is_deleted = false;
        note.is_archived = false;
        Some(&*note)
    }

    pub fn duplicate(&mut self, id: NoteId) -> Option<&Note> {
        let source = self.get(id)?;

        let now = Utc::now();
        let copy = Note {
            id: Uuid::now_v7(),
            title: format!("{} (Copy)", source.title),
            created_at: now,
            updated_at: now,
            is_deleted: false,
            attachments: source
                .attachments
                .iter()
                .map(|a| Attachment {
                    id: Uuid::now_v7(),
                    ..a.clone()
                })
                .collect(),
            ..source.clone()
        };

        tracing::debug!("note {id} duplicated as {}", copy.id);
        self.notes.insert(0, copy);
        self.notes.first()
    }

    pub fn add_attachments(&mut self, id: NoteId, attachments: Vec<Attachment>) -> Option<&Note> {
        let note = self.get_mut(id)?;
        if attachments.is_empty() {
            return Some(&*note);
        }
        note.attachments.extend(attachments);
        touch(note);
        Some(&*note)
    }

    /// Ignored when the attachment is the only thing keeping the note from being blank.
    pub fn remove_attachment(&mut self, id: NoteId, attachment_id: AttachmentId) -> Option<&Note> {
        let note = self.get_mut(id)?;
        let index = note.attachments.iter().position(|a| a.id == attachment_id)?;
        if note.attachments.len() == 1 && note.title.trim().is_empty() && note.content.trim().is_empty() {
            tracing::debug!("ignoring removal that would blank note {id}");
            return None;
        }
        note.attachments.remove(index);
        touch(note);
        Some(&*note)
    }

    /// Every tag in use, sorted and without repeats.
    pub fn all_tags(&self) -> Vec<String> {
        self.notes
            .iter()
            .flat_map(|n| n.tags.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub async fn load(storage: &Storage, owner: UserId) -> db::Result<Self> {
        let notes: Vec<Note> = storage.get_item_or_default(&keys::notes(owner)).await?;
        tracing::debug!("loaded {} notes for {owner}", notes.len());
        Ok(Self::new(owner, notes))
    }

    pub async fn save(&self, storage: &Storage) -> db::Result<()> {
        storage.set_item(&keys::notes(self.owner), &self.notes).await
    }
}

fn touch(note: &mut Note) {
    note.updated_at = Utc::now().max(note.created_at);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::init_test_db,
        notes::{query, Color, NoteQuery, Tags, View},
    };

    fn store() -> NoteStore {
        NoteStore::new(Uuid::now_v7(), vec![])
    }

    fn draft(title: &str, content: &str) -> NoteDraft {
        NoteDraft {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    fn attachment(name: &str) -> Attachment {
        Attachment {
            id: Uuid::now_v7(),
            name: name.into(),
            mime_type: "image/png".into(),
            url: "data:image/png;base64,AA==".into(),
            size: 1,
        }
    }

    fn in_view(store: &NoteStore, view: View, id: NoteId) -> bool {
        let q = NoteQuery {
            view,
            ..Default::default()
        };
        query::derive(store.notes(), &q).iter().any(|n| n.id == id)
    }

    #[test]
    fn create_rejects_blank_draft() {
        let mut store = store();

        assert!(store.create(draft("  ", "\n")).is_none());
        assert!(store.notes().is_empty());

        let only_attachment = NoteDraft {
            attachments: vec![attachment("a.png")],
            ..Default::default()
        };
        assert!(store.create(only_attachment).is_some());
    }

    #[test]
    fn create_prepends() {
        let mut store = store();
        let first = store.create(draft("first", "")).unwrap().id;
        let second = store.create(draft("second", "")).unwrap().id;

        assert_eq!(store.notes()[0].id, second);
        assert_eq!(store.notes()[1].id, first);

        let note = store.get(first).unwrap();
        assert_eq!(note.created_at, note.updated_at);
        assert!(!note.is_archived && !note.is_deleted && !note.is_pinned);
    }

    #[test]
    fn lifecycle_scenario() {
        let mut store = store();
        let id = store
            .create(NoteDraft {
                tags: Tags::List(vec![]),
                ..draft("Groceries", "milk, eggs")
            })
            .unwrap()
            .id;

        assert!(in_view(&store, View::Active, id));
        assert!(!in_view(&store, View::Archive, id));
        assert!(!in_view(&store, View::Trash, id));

        store.toggle_archived(id);
        assert!(!in_view(&store, View::Active, id));
        assert!(in_view(&store, View::Archive, id));

        assert_eq!(store.set_deleted(id), Some(Deletion::Trashed));
        assert!(!in_view(&store, View::Archive, id));
        assert!(in_view(&store, View::Trash, id));

        assert_eq!(store.set_deleted(id), Some(Deletion::Purged));
        assert!(store.get(id).is_none());
        assert!(!in_view(&store, View::Active, id));
        assert!(!in_view(&store, View::Archive, id));
        assert!(!in_view(&store, View::Trash, id));

        assert_eq!(store.set_deleted(id), None);
    }

    #[test]
    fn purge_requires_trash() {
        let mut store = store();
        let id = store.create(draft("keep", "")).unwrap().id;

        assert!(store.purge(id).is_none());
        store.soft_delete(id);
        assert_eq!(store.purge(id).map(|n| n.id), Some(id));
    }

    #[test]
    fn restore_clears_flags() {
        let mut store = store();
        let id = store.create(draft("a", "")).unwrap().id;
        store.toggle_archived(id);
        store.soft_delete(id);

        let note = store.restore(id).unwrap();
        assert!(!note.is_archived);
        assert!(!note.is_deleted);

        let note = store.restore(id).unwrap();
        assert!(!note.is_archived && !note.is_deleted);
    }

    #[test]
    fn pin_bumps_updated_archive_does_not() {
        let mut store = store();
        let id = store.create(draft("a", "")).unwrap().id;
        let created = store.get(id).unwrap().updated_at;

        std::thread::sleep(std::time::Duration::from_millis(5));
        let archived = store.toggle_archived(id).unwrap().updated_at;
        assert_eq!(archived, created);

        let pinned = store.toggle_pinned(id).unwrap();
        assert!(pinned.is_pinned);
        assert!(pinned.updated_at > created);
        assert!(pinned.updated_at >= pinned.created_at);
    }

    #[test]
    fn update_merges_patch() {
        let mut store = store();
        let id = store.create(draft("title", "content")).unwrap().id;

        let note = store
            .update(
                id,
                NotePatch {
                    content: Some("changed".into()),
                    color: Some(Color::Blue),
                    tags: Some(Tags::Text("a, b".into())),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(note.title, "title");
        assert_eq!(note.content, "changed");
        assert_eq!(note.color, Color::Blue);
        assert_eq!(note.tags, ["a", "b"]);
    }

    #[test]
    fn update_unknown_or_blanking_is_noop() {
        let mut store = store();
        let id = store.create(draft("title", "")).unwrap().id;

        assert!(store.update(Uuid::now_v7(), NotePatch::default()).is_none());

        let blank = NotePatch {
            title: Some(" ".into()),
            ..Default::default()
        };
        assert!(store.update(id, blank).is_none());
        assert_eq!(store.get(id).unwrap().title, "title");
    }

    #[test]
    fn duplicate_copies_fields() {
        let mut store = store();
        let id = store
            .create(NoteDraft {
                color: Color::Yellow,
                tags: Tags::List(vec!["x".into()]),
                attachments: vec![attachment("a.png")],
                ..draft("Plan", "body")
            })
            .unwrap()
            .id;
        store.toggle_pinned(id);
        store.soft_delete(id);

        let copy = store.duplicate(id).unwrap().clone();
        let source = store.get(id).unwrap();

        assert_ne!(copy.id, id);
        assert_eq!(store.notes()[0].id, copy.id);
        assert_eq!(copy.title, "Plan (Copy)");
        assert_eq!(copy.content, "body");
        assert_eq!(copy.color, Color::Yellow);
        assert_eq!(copy.tags, ["x"]);
        assert!(copy.is_pinned);
        assert!(!copy.is_deleted);
        assert!(copy.created_at >= source.created_at);
        assert_eq!(copy.attachments.len(), 1);
        assert_ne!(copy.attachments[0].id, source.attachments[0].id);
        assert_eq!(copy.attachments[0].url, source.attachments[0].url);
    }

    #[test]
    fn attachments_add_and_remove() {
        let mut store = store();
        let id = store.create(draft("a", "")).unwrap().id;

        let note = store.add_attachments(id, vec![attachment("1.png"), attachment("2.png")]).unwrap();
        let first = note.attachments[0].id;
        assert_eq!(note.attachments.len(), 2);

        let note = store.remove_attachment(id, first).unwrap();
        assert_eq!(note.attachments.len(), 1);
        assert_eq!(note.attachments[0].name, "2.png");

        assert!(store.remove_attachment(id, first).is_none());
        assert_eq!(store.get(id).unwrap().attachments.len(), 1);
    }

    #[test]
    fn remove_attachment_touches_and_keeps_note_non_blank() {
        let mut store = store();
        let id = store
            .create(NoteDraft {
                attachments: vec![attachment("only.png"), attachment("extra.png")],
                ..Default::default()
            })
            .unwrap()
            .id;
        let before = store.get(id).unwrap().clone();

        let note = store.remove_attachment(id, before.attachments[1].id).unwrap();
        assert!(note.updated_at >= before.updated_at);
        assert_eq!(note.attachments.len(), 1);

        let last = note.attachments[0].id;
        assert!(store.remove_attachment(id, last).is_none());
        assert_eq!(store.get(id).unwrap().attachments[0].name, "only.png");
    }

    #[test]
    fn all_tags_sorted_unique() {
        let mut store = store();
        store.create(NoteDraft {
            tags: Tags::List(vec!["work".into(), "home".into()]),
            ..draft("a", "")
        });
        store.create(NoteDraft {
            tags: Tags::List(vec!["home".into(), "Work".into()]),
            ..draft("b", "")
        });

        assert_eq!(store.all_tags(), ["Work", "home", "work"]);
    }

    #[tokio::test]
    async fn persist_round_trip() -> db::Result<()> {
        let storage = Storage::new(init_test_db().await?);
        let owner = Uuid::now_v7();

        let mut store = NoteStore::new(owner, vec![]);
        let id = store
            .create(NoteDraft {
                color: Color::Red,
                tags: Tags::List(vec!["t".into()]),
                attachments: vec![attachment("a.png")],
                ..draft("saved", "text")
            })
            .unwrap()
            .id;
        store.toggle_pinned(id);
        store.save(&storage).await?;

        let loaded = NoteStore::load(&storage, owner).await?;
        assert_eq!(loaded.notes(), store.notes());

        let other = NoteStore::load(&storage, Uuid::now_v7()).await?;
        assert!(other.notes().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_collection_resets() -> db::Result<()> {
        let storage = Storage::new(init_test_db().await?);
        let owner = Uuid::now_v7();
        storage.set_raw(&keys::notes(owner), "[{\"id\": 1".into()).await?;

        let loaded = NoteStore::load(&storage, owner).await?;
        assert!(loaded.notes().is_empty());
        Ok(())
    }
}
