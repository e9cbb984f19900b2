use crate::error::Result;
use crate::storage::Storage;
use crate::types::WinnerEntry;
use chrono::Utc;
use rusqlite::params;

pub struct WinnerLog<'a> {
    storage: &'a Storage,
}

impl<'a> WinnerLog<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub async fn append(&self, entry: &WinnerEntry) -> Result<()> {
        let conn = self.storage.get_connection().await;

        conn.execute(
            "INSERT INTO winner_log (name, identifier, won_at) VALUES (?1, ?2, ?3)",
            params![entry.name, entry.identifier, entry.won_at.timestamp()],
        )?;

        Ok(())
    }

    /// Oldest first
    pub async fn list(&self) -> Result<Vec<WinnerEntry>> {
        let conn = self.storage.get_connection().await;

        let mut stmt =
            conn.prepare("SELECT name, identifier, won_at FROM winner_log ORDER BY seq ASC")?;

        let entry_iter = stmt.query_map([], |row| {
            Ok(WinnerEntry {
                name: row.get(0)?,
                identifier: row.get(1)?,
                won_at: chrono::DateTime::from_timestamp(row.get(2)?, 0)
                    .unwrap_or_else(Utc::now),
            })
        })?;

        let mut entries = Vec::new();
        for entry in entry_iter {
            entries.push(entry?);
        }

        Ok(entries)
    }

    pub async fn clear(&self) -> Result<()> {
        let conn = self.storage.get_connection().await;
        conn.execute("DELETE FROM winner_log", [])?;
        Ok(())
    }
}
