//! LuckyDraw core - roster loading, winner bookkeeping and local storage
//!
//! The draw engine builds on these pieces: a [`ParticipantRegistry`] holding
//! the current roster and a [`WinnerStore`] that remembers who has already
//! won and writes it through to a local SQLite database.

pub mod config;
pub mod error;
pub mod records;
pub mod registry;
pub mod storage;
pub mod types;
pub mod winners;

pub use config::DrawConfig;
pub use error::{LuckyDrawError, Result};
pub use records::{parse_records, CsvRecordSource, RecordSource};
pub use registry::ParticipantRegistry;
pub use storage::Storage;
pub use types::{Participant, ParticipantName, WinnerEntry, WinnerRecord};
pub use winners::{SqliteWinnerBackend, WinnerBackend, WinnerStore};

use std::path::Path;
use std::sync::Arc;

/// Opens the winner store described by `config` under `data_dir`.
///
/// Session-only configurations get a private in-memory database, so nothing
/// outlives the process. A database file that cannot be opened does not stop
/// the draw: winners are then kept for this session only.
pub async fn open_winner_store(data_dir: &Path, config: &DrawConfig) -> Result<WinnerStore> {
    config.validate()?;

    let storage = if config.persist_across_restarts {
        let db_path = data_dir.join(storage::DB_FILE);
        match Storage::new(&db_path).await {
            Ok(storage) => storage,
            Err(e) => {
                tracing::warn!(
                    "Cannot use winner database {}, keeping winners for this session only: {}",
                    db_path.display(),
                    e
                );
                Storage::in_memory().await?
            }
        }
    } else {
        tracing::info!("Winners are kept for this session only");
        Storage::in_memory().await?
    };

    let backend = Arc::new(SqliteWinnerBackend::new(
        Arc::new(storage),
        config.store_key.clone(),
    ));
    Ok(WinnerStore::initialize(backend, config).await)
}

/// Opens the durable winner database for inspection or reset.
///
/// Unlike [`open_winner_store`] an unusable database is an error here, and
/// the stored mapping is never cleared on open.
pub async fn open_history_store(data_dir: &Path, config: &DrawConfig) -> Result<WinnerStore> {
    config.validate()?;

    let storage = Storage::new(&data_dir.join(storage::DB_FILE)).await?;
    let backend = Arc::new(SqliteWinnerBackend::new(
        Arc::new(storage),
        config.store_key.clone(),
    ));
    let config = DrawConfig {
        reset_on_start: false,
        persist_across_restarts: true,
        ..config.clone()
    };
    Ok(WinnerStore::initialize(backend, &config).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_session_only_store_writes_nothing_to_disk() {
        let temp_dir = tempdir().unwrap();
        let config = DrawConfig {
            persist_across_restarts: false,
            ..DrawConfig::default()
        };

        let mut store = open_winner_store(temp_dir.path(), &config).await.unwrap();
        store.commit(&Participant::new(ParticipantName::new("Ada").unwrap(), None));
        assert!(store.persist().await);

        assert!(!temp_dir.path().join(storage::DB_FILE).exists());
        let reopened = open_winner_store(temp_dir.path(), &config).await.unwrap();
        assert!(reopened.is_empty());
    }

    #[tokio::test]
    async fn test_durable_store_creates_database() {
        let temp_dir = tempdir().unwrap();
        let store = open_winner_store(temp_dir.path(), &DrawConfig::default())
            .await
            .unwrap();
        assert!(store.is_empty());
        assert!(temp_dir.path().join(storage::DB_FILE).exists());
    }

    #[tokio::test]
    async fn test_unreadable_database_falls_back_to_session_store() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join(storage::DB_FILE);
        let junk = b"this is not an sqlite database, just some bytes".repeat(64);
        std::fs::write(&db_path, &junk).unwrap();

        let mut store = open_winner_store(temp_dir.path(), &DrawConfig::default())
            .await
            .unwrap();
        assert!(store.is_empty());

        store.commit(&Participant::new(ParticipantName::new("Ada").unwrap(), None));
        assert!(store.persist().await);
        assert!(store.contains("Ada"));
        assert_eq!(std::fs::read(&db_path).unwrap(), junk);
    }

    #[tokio::test]
    async fn test_history_store_reports_unreadable_database() {
        let temp_dir = tempdir().unwrap();
        let junk = b"this is not an sqlite database, just some bytes".repeat(64);
        std::fs::write(temp_dir.path().join(storage::DB_FILE), junk).unwrap();

        let result = open_history_store(temp_dir.path(), &DrawConfig::default()).await;
        assert!(matches!(result, Err(LuckyDrawError::Storage(_))));
    }

    #[tokio::test]
    async fn test_history_store_ignores_reset_on_start() {
        let temp_dir = tempdir().unwrap();
        let mut store = open_winner_store(temp_dir.path(), &DrawConfig::default())
            .await
            .unwrap();
        store.commit(&Participant::new(ParticipantName::new("Ada").unwrap(), None));
        assert!(store.persist().await);

        let config = DrawConfig {
            reset_on_start: true,
            persist_across_restarts: false,
            ..DrawConfig::default()
        };
        let history = open_history_store(temp_dir.path(), &config).await.unwrap();
        assert!(history.contains("Ada"));
    }
}
