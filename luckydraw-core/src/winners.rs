use crate::config::DrawConfig;
use crate::error::Result;
use crate::storage::{KvStore, Storage, WinnerLog};
use crate::types::{Participant, WinnerEntry, WinnerRecord};
use async_trait::async_trait;
use std::sync::Arc;

/// Durable home of the winner mapping.
#[async_trait]
pub trait WinnerBackend: Send + Sync {
    /// `None` when nothing has been stored yet
    async fn load(&self) -> Result<Option<WinnerRecord>>;

    /// Overwrites the stored mapping
    async fn save(&self, winners: &WinnerRecord) -> Result<()>;

    async fn append_log(&self, entry: &WinnerEntry) -> Result<()>;

    async fn history(&self) -> Result<Vec<WinnerEntry>>;

    async fn clear(&self) -> Result<()>;
}

/// Winner mapping kept in one `kv` slot, history in `winner_log`
pub struct SqliteWinnerBackend {
    storage: Arc<Storage>,
    key: String,
}

impl SqliteWinnerBackend {
    pub fn new(storage: Arc<Storage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }
}

#[async_trait]
impl WinnerBackend for SqliteWinnerBackend {
    async fn load(&self) -> Result<Option<WinnerRecord>> {
        let Some(raw) = KvStore::new(&self.storage).get(&self.key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable winner slot '{}': {}", self.key, e);
                Ok(None)
            }
        }
    }

    async fn save(&self, winners: &WinnerRecord) -> Result<()> {
        let raw = serde_json::to_string(winners)?;
        KvStore::new(&self.storage).put(&self.key, &raw).await
    }

    async fn append_log(&self, entry: &WinnerEntry) -> Result<()> {
        WinnerLog::new(&self.storage).append(entry).await
    }

    async fn history(&self) -> Result<Vec<WinnerEntry>> {
        WinnerLog::new(&self.storage).list().await
    }

    async fn clear(&self) -> Result<()> {
        KvStore::new(&self.storage).remove(&self.key).await?;
        WinnerLog::new(&self.storage).clear().await
    }
}

/// In-memory authority over who has won, written through to a backend.
///
/// Persistence failures never reach the caller: the in-memory record stays
/// authoritative and the failure is logged.
pub struct WinnerStore {
    record: WinnerRecord,
    unlogged: Vec<WinnerEntry>,
    backend: Arc<dyn WinnerBackend>,
}

impl WinnerStore {
    /// Starts from the stored mapping, or from nothing under `reset_on_start`.
    ///
    /// A backend that cannot be read or cleared leaves the store empty; later
    /// persists still try the backend.
    pub async fn initialize(backend: Arc<dyn WinnerBackend>, config: &DrawConfig) -> Self {
        let record = if config.reset_on_start {
            match backend.clear().await {
                Ok(()) => tracing::info!("Cleared stored winners at startup"),
                Err(e) => tracing::warn!("Failed to clear stored winners at startup: {}", e),
            }
            WinnerRecord::new()
        } else {
            match backend.load().await {
                Ok(restored) => {
                    let restored = restored.unwrap_or_default();
                    tracing::info!("Restored {} previous winners", restored.len());
                    restored
                }
                Err(e) => {
                    tracing::warn!("Failed to restore previous winners, starting empty: {}", e);
                    WinnerRecord::new()
                }
            }
        };

        Self {
            record,
            unlogged: Vec::new(),
            backend,
        }
    }

    /// Records the participant as a winner. Returns false if it already was one.
    pub fn commit(&mut self, participant: &Participant) -> bool {
        if !self.record.insert(participant.identity()) {
            tracing::debug!("'{}' already recorded as winner", participant.identity());
            return false;
        }

        self.unlogged.push(WinnerEntry::now(participant));
        true
    }

    /// Writes the full mapping, then any history entries not yet written.
    /// Returns whether everything reached the backend.
    pub async fn persist(&mut self) -> bool {
        if let Err(e) = self.backend.save(&self.record).await {
            tracing::warn!(
                "Failed to persist {} winners, keeping them in memory: {}",
                self.record.len(),
                e
            );
            return false;
        }

        while let Some(entry) = self.unlogged.first() {
            if let Err(e) = self.backend.append_log(entry).await {
                tracing::warn!("Failed to append '{}' to winner history: {}", entry.name, e);
                return false;
            }
            self.unlogged.remove(0);
        }

        true
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.record.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.record.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record.is_empty()
    }

    pub fn record(&self) -> &WinnerRecord {
        &self.record
    }

    pub async fn history(&self) -> Result<Vec<WinnerEntry>> {
        self.backend.history().await
    }

    /// Forget every winner, in memory and in the backend
    pub async fn clear(&mut self) -> Result<()> {
        self.backend.clear().await?;
        self.record = WinnerRecord::new();
        self.unlogged.clear();
        tracing::info!("Winner history cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LuckyDrawError;
    use crate::types::ParticipantName;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::tempdir;

    fn participant(name: &str) -> Participant {
        Participant::new(ParticipantName::new(name).unwrap(), None)
    }

    async fn sqlite_backend() -> Arc<SqliteWinnerBackend> {
        let storage = Arc::new(Storage::in_memory().await.unwrap());
        Arc::new(SqliteWinnerBackend::new(storage, "winners"))
    }

    /// Backend whose reads and writes can be switched off
    #[derive(Default)]
    struct FlakyBackend {
        broken: AtomicBool,
        unreadable: AtomicBool,
        inner: tokio::sync::Mutex<Option<WinnerRecord>>,
        log: tokio::sync::Mutex<Vec<WinnerEntry>>,
    }

    #[async_trait]
    impl WinnerBackend for FlakyBackend {
        async fn load(&self) -> Result<Option<WinnerRecord>> {
            if self.unreadable.load(Ordering::SeqCst) {
                return Err(LuckyDrawError::internal("database locked"));
            }
            Ok(self.inner.lock().await.clone())
        }

        async fn save(&self, winners: &WinnerRecord) -> Result<()> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(LuckyDrawError::internal("disk full"));
            }
            *self.inner.lock().await = Some(winners.clone());
            Ok(())
        }

        async fn append_log(&self, entry: &WinnerEntry) -> Result<()> {
            self.log.lock().await.push(entry.clone());
            Ok(())
        }

        async fn history(&self) -> Result<Vec<WinnerEntry>> {
            Ok(self.log.lock().await.clone())
        }

        async fn clear(&self) -> Result<()> {
            if self.unreadable.load(Ordering::SeqCst) {
                return Err(LuckyDrawError::internal("database locked"));
            }
            *self.inner.lock().await = None;
            self.log.lock().await.clear();
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_commit_is_idempotent() {
        let mut store = WinnerStore::initialize(sqlite_backend().await, &DrawConfig::default())
            .await;

        assert!(store.commit(&participant("Ada")));
        assert!(store.persist().await);
        let snapshot = store.record().clone();

        assert!(!store.commit(&participant("Ada")));
        assert!(store.persist().await);
        assert_eq!(store.record(), &snapshot);
        assert_eq!(store.history().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_winners_survive_restart_by_default() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("luckydraw.db");
        let config = DrawConfig::default();

        {
            let storage = Arc::new(Storage::new(&db_path).await.unwrap());
            let backend = Arc::new(SqliteWinnerBackend::new(storage, &config.store_key));
            let mut store = WinnerStore::initialize(backend, &config).await;
            store.commit(&participant("Grace"));
            assert!(store.persist().await);
        }

        let storage = Arc::new(Storage::new(&db_path).await.unwrap());
        let backend = Arc::new(SqliteWinnerBackend::new(storage, &config.store_key));
        let store = WinnerStore::initialize(backend, &config).await;
        assert!(store.contains("Grace"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_reset_on_start_clears_slot_and_history() {
        let backend = sqlite_backend().await;
        let mut store = WinnerStore::initialize(backend.clone(), &DrawConfig::default()).await;
        store.commit(&participant("Grace"));
        store.persist().await;

        let config = DrawConfig {
            reset_on_start: true,
            ..DrawConfig::default()
        };
        let store = WinnerStore::initialize(backend.clone(), &config).await;
        assert!(store.is_empty());
        assert_eq!(backend.load().await.unwrap(), None);
        assert!(store.history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_slot_starts_empty() {
        let storage = Arc::new(Storage::in_memory().await.unwrap());
        KvStore::new(&storage).put("winners", "not json").await.unwrap();

        let backend = Arc::new(SqliteWinnerBackend::new(storage, "winners"));
        let store = WinnerStore::initialize(backend, &DrawConfig::default()).await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_persist_failure_keeps_memory_authoritative() {
        let backend = Arc::new(FlakyBackend::default());
        let mut store = WinnerStore::initialize(backend.clone(), &DrawConfig::default()).await;

        backend.broken.store(true, Ordering::SeqCst);
        assert!(store.commit(&participant("Ada")));
        assert!(!store.persist().await);
        assert!(store.contains("Ada"));
        assert!(backend.history().await.unwrap().is_empty());

        // the next successful persist catches up on the missed write
        backend.broken.store(false, Ordering::SeqCst);
        store.commit(&participant("Linus"));
        assert!(store.persist().await);

        let stored = backend.load().await.unwrap().unwrap();
        assert!(stored.contains("Ada") && stored.contains("Linus"));
        let names: Vec<_> = backend
            .history()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Ada", "Linus"]);
    }

    #[tokio::test]
    async fn test_unreadable_backend_starts_empty_and_keeps_working() {
        let backend = Arc::new(FlakyBackend::default());
        let mut seeded = WinnerRecord::new();
        seeded.insert("Grace");
        *backend.inner.lock().await = Some(seeded);
        backend.unreadable.store(true, Ordering::SeqCst);

        let mut store = WinnerStore::initialize(backend.clone(), &DrawConfig::default()).await;
        assert!(store.is_empty());

        assert!(store.commit(&participant("Ada")));
        assert!(store.persist().await);
        assert!(store.contains("Ada"));
    }

    #[tokio::test]
    async fn test_failed_reset_still_starts_empty() {
        let backend = Arc::new(FlakyBackend::default());
        let mut seeded = WinnerRecord::new();
        seeded.insert("Grace");
        *backend.inner.lock().await = Some(seeded);
        backend.unreadable.store(true, Ordering::SeqCst);

        let config = DrawConfig {
            reset_on_start: true,
            ..DrawConfig::default()
        };
        let store = WinnerStore::initialize(backend, &config).await;
        assert!(store.is_empty());
        assert!(!store.contains("Grace"));
    }

    #[tokio::test]
    async fn test_clear_forgets_everything() {
        let backend = sqlite_backend().await;
        let mut store = WinnerStore::initialize(backend.clone(), &DrawConfig::default()).await;
        store.commit(&participant("Ada"));
        store.persist().await;

        store.clear().await.unwrap();
        assert!(store.is_empty());
        assert_eq!(backend.load().await.unwrap(), None);
    }
}
