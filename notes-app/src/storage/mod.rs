//! Durable key-value storage with JSON values.
//!
//! Every value is written as one unit: a caller persisting a collection
//! replaces the whole serialized collection under its key.

use rusqlite::{named_params, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};

use crate::db::{self, DB};

pub mod keys {
    use uuid::Uuid;

    pub const USERS: &str = "users";
    pub const CURRENT_USER: &str = "currentUser";

    pub fn notes(owner: Uuid) -> String {
        format!("notes:{owner}")
    }
}

#[derive(Clone)]
pub struct Storage {
    db: DB,
}

impl Storage {
    pub fn new(db: DB) -> Self {
        Self { db }
    }

    pub async fn get_raw(&self, key: &str) -> db::Result<Option<String>> {
        let key = key.to_owned();
        let value = self
            .db
            .call(move |conn| {
                conn.query_row("SELECT value FROM kv WHERE key = ?", [key], |row| row.get::<_, String>(0))
                    .optional()
                    .map_err(|e| e.into())
            })
            .await?;

        Ok(value)
    }

    pub async fn set_raw(&self, key: &str, value: String) -> db::Result<()> {
        let key = key.to_owned();
        self.db
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO kv (key, value) VALUES (:key, :value)
                    ON CONFLICT(key) DO UPDATE SET value = :value, updated_at = CURRENT_TIMESTAMP"#,
                    named_params! {
                        ":key": key,
                        ":value": value,
                    },
                )?;
                Ok(())
            })
            .await?;

        Ok(())
    }

    /// Reads and decodes `key`. A value that fails to decode is reported as an error,
    /// callers choose how to recover.
    pub async fn get_item<T: DeserializeOwned>(&self, key: &str) -> db::Result<Option<T>> {
        match self.get_raw(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Like [`Storage::get_item`], but a corrupt value is logged and treated as absent.
    pub async fn get_item_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> db::Result<T> {
        match self.get_item(key).await {
            Ok(value) => Ok(value.unwrap_or_default()),
            Err(db::Error::Serde(err)) => {
                tracing::warn!("discarding corrupt value under '{key}': {err}");
                Ok(T::default())
            }
            Err(err) => Err(err),
        }
    }

    pub async fn set_item<T: Serialize>(&self, key: &str, value: &T) -> db::Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set_raw(key, raw).await
    }

    pub async fn remove_item(&self, key: &str) -> db::Result<()> {
        let key = key.to_owned();
        self.db
            .call(move |conn| {
                conn.execute("DELETE FROM kv WHERE key = ?", [key])?;
                Ok(())
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::db::init_test_db;

    #[derive(Debug, Serialize, Deserialize, PartialEq, Default)]
    struct Item {
        name: String,
    }

    #[tokio::test]
    async fn set_get_remove() -> db::Result<()> {
        let storage = Storage::new(init_test_db().await?);

        assert_eq!(storage.get_item::<Item>("item").await?, None);

        storage.set_item("item", &Item { name: "first".into() }).await?;
        storage.set_item("item", &Item { name: "second".into() }).await?;
        assert_eq!(storage.get_item::<Item>("item").await?, Some(Item { name: "second".into() }));

        storage.remove_item("item").await?;
        assert_eq!(storage.get_raw("item").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_value() -> db::Result<()> {
        let storage = Storage::new(init_test_db().await?);
        storage.set_raw("item", "{not json".into()).await?;

        assert!(matches!(storage.get_item::<Item>("item").await, Err(db::Error::Serde(_))));
        assert_eq!(storage.get_item_or_default::<Item>("item").await?, Item::default());
        Ok(())
    }
}
