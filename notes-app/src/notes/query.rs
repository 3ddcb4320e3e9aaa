//! Derivation of the visible note list. Everything here is a pure function of
//! its arguments, so the same inputs always yield the same list.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::Note;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Active,
    Archive,
    Trash,
}

impl View {
    /// The single view a note belongs to. Trash wins over archive.
    pub fn of(note: &Note) -> Self {
        if note.is_deleted {
            View::Trash
        } else if note.is_archived {
            View::Archive
        } else {
            View::Active
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Updated,
    Created,
    Title,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct NoteQuery {
    pub view: View,
    pub search: String,
    pub tag: Option<String>,
    #[serde(rename = "sort")]
    pub sort_by: SortBy,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewCounts {
    pub active: usize,
    pub archive: usize,
    pub trash: usize,
}

pub fn derive<'a>(notes: &'a [Note], query: &NoteQuery) -> Vec<&'a Note> {
    let search = query.search.to_lowercase();
    let tag = query.tag.as_deref().filter(|t| !t.is_empty());

    let mut results = notes
        .iter()
        .filter(|note| View::of(note) == query.view)
        .filter(|note| matches_search(note, &search))
        .filter(|note| tag.map_or(true, |tag| note.has_tag(tag)))
        .collect::<Vec<_>>();

    results.sort_by(|a, b| b.is_pinned.cmp(&a.is_pinned).then_with(|| compare(a, b, query.sort_by)));
    results
}

pub fn counts(notes: &[Note]) -> ViewCounts {
    notes.iter().fold(ViewCounts::default(), |mut counts, note| {
        match View::of(note) {
            View::Active => counts.active += 1,
            View::Archive => counts.archive += 1,
            View::Trash => counts.trash += 1,
        }
        counts
    })
}

/// `search` must already be lowercased.
fn matches_search(note: &Note, search: &str) -> bool {
    search.is_empty()
        || note.title.to_lowercase().contains(search)
        || note.content.to_lowercase().contains(search)
        || note.tags.iter().any(|t| t.to_lowercase().contains(search))
}

fn compare(a: &Note, b: &Note, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::Updated => b.updated_at.cmp(&a.updated_at),
        SortBy::Created => b.created_at.cmp(&a.created_at),
        SortBy::Title => compare_titles(&a.title, &b.title),
    }
}

// Case-insensitive first so "apple" and "Banana" sort the way a reader expects.
fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}
