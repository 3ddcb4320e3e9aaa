//! Attachment intake: validating uploaded files and turning them into
//! self-contained `data:` URLs stored inline with their note.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use uuid::Uuid;

pub const MAX_ATTACHMENT_BYTES: usize = 10 * 1024 * 1024;

pub type AttachmentId = Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    pub id: AttachmentId,
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub url: String,
    pub size: usize,
}

/// A file as received from the client, before validation.
#[derive(Debug, Clone)]
pub struct FileInput {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FileInput {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

pub fn accept(file: &FileInput) -> bool {
    let supported = file.mime_type.starts_with("image/") || file.mime_type == "application/pdf";
    supported && file.size() <= MAX_ATTACHMENT_BYTES
}

pub async fn encode(file: FileInput) -> Attachment {
    let FileInput { name, mime_type, bytes } = file;
    let size = bytes.len();

    let (mime_type, url) = tokio::task::spawn_blocking(move || {
        let url = format!("data:{mime_type};base64,{}", STANDARD.encode(&bytes));
        (mime_type, url)
    })
    .await
    .unwrap_or_else(|err| std::panic::resume_unwind(err.into_panic()));

    Attachment {
        id: Uuid::now_v7(),
        name,
        mime_type,
        url,
        size,
    }
}

/// Drops rejected files, encodes the rest concurrently and returns them in input order.
pub async fn encode_all(files: Vec<FileInput>) -> Vec<Attachment> {
    let mut tasks = JoinSet::new();
    let mut accepted = 0;

    for file in files {
        if !accept(&file) {
            tracing::debug!(
                "skipping attachment '{}' ({}, {} bytes)",
                file.name,
                file.mime_type,
                file.size()
            );
            continue;
        }
        let index = accepted;
        accepted += 1;
        tasks.spawn(async move { (index, encode(file).await) });
    }

    let mut slots: Vec<Option<Attachment>> = vec![None; accepted];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, attachment)) => slots[index] = Some(attachment),
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => tracing::error!("attachment encoding cancelled: {err}"),
        }
    }

    slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_by_type_and_size() {
        assert!(!accept(&FileInput::new("notes.txt", "text/plain", vec![0; 1024])));
        assert!(!accept(&FileInput::new("big.png", "image/png", vec![0; 11 * 1024 * 1024])));
        assert!(accept(&FileInput::new("small.png", "image/png", vec![0; 1024 * 1024])));
        assert!(accept(&FileInput::new("doc.pdf", "application/pdf", vec![1, 2, 3])));
        assert!(accept(&FileInput::new("edge.jpg", "image/jpeg", vec![0; MAX_ATTACHMENT_BYTES])));
        assert!(!accept(&FileInput::new("over.jpg", "image/jpeg", vec![0; MAX_ATTACHMENT_BYTES + 1])));
    }

    #[tokio::test]
    async fn encode_data_url() {
        let attachment = encode(FileInput::new("a.png", "image/png", b"hello".to_vec())).await;

        assert_eq!(attachment.name, "a.png");
        assert_eq!(attachment.mime_type, "image/png");
        assert_eq!(attachment.size, 5);
        assert_eq!(attachment.url, "data:image/png;base64,aGVsbG8=");
    }

    #[tokio::test]
    async fn encode_all_keeps_input_order() {
        let files = vec![
            FileInput::new("large.png", "image/png", vec![7; 4 * 1024 * 1024]),
            FileInput::new("readme.txt", "text/plain", vec![1]),
            FileInput::new("tiny.pdf", "application/pdf", vec![1]),
            FileInput::new("medium.gif", "image/gif", vec![3; 64 * 1024]),
        ];

        let attachments = encode_all(files).await;
        let names = attachments.iter().map(|a| a.name.as_str()).collect::<Vec<_>>();

        assert_eq!(names, ["large.png", "tiny.pdf", "medium.gif"]);
        assert_eq!(attachments[0].size, 4 * 1024 * 1024);
    }
}
