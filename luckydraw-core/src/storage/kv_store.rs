use crate::error::Result;
use crate::storage::Storage;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

pub struct KvStore<'a> {
    storage: &'a Storage,
}

impl<'a> KvStore<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.storage.get_connection().await;

        let value = conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value)
    }

    pub async fn put(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.storage.get_connection().await;

        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().timestamp()],
        )?;

        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        let conn = self.storage.get_connection().await;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_overwrites_slot() {
        let storage = Storage::in_memory().await.unwrap();
        let kv = KvStore::new(&storage);

        assert_eq!(kv.get("winners").await.unwrap(), None);
        kv.put("winners", "{}").await.unwrap();
        kv.put("winners", r#"{"Ada":true}"#).await.unwrap();
        assert_eq!(
            kv.get("winners").await.unwrap().as_deref(),
            Some(r#"{"Ada":true}"#)
        );

        kv.remove("winners").await.unwrap();
        assert_eq!(kv.get("winners").await.unwrap(), None);
    }
}
