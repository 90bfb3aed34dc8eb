use std::sync::Arc;

use essentials_core::model::{CompletionSet, LessonId};
use storage::repository::{KeyValueStore, StorageError};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::error::CompletionError;

/// Storage key holding the JSON array of completed lesson ids.
pub const COMPLETED_LESSONS_KEY: &str = "completedLessons";

/// Result of flipping a lesson's completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub set: CompletionSet,
    pub now_complete: bool,
}

/// Owns the persisted set of completed lessons.
///
/// Every operation runs under one async lock, so a toggle's
/// read-modify-write cannot interleave with another toggle, a load or a
/// reset. Mutations re-read the persisted value instead of trusting the
/// published copy, and the published copy only advances after the write
/// succeeded.
pub struct CompletionStore {
    values: Arc<dyn KeyValueStore>,
    key: String,
    ops: Mutex<()>,
    published: watch::Sender<CompletionSet>,
}

impl CompletionStore {
    #[must_use]
    pub fn new(values: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(values, COMPLETED_LESSONS_KEY)
    }

    #[must_use]
    pub fn with_key(values: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let (published, _) = watch::channel(CompletionSet::new());
        Self {
            values,
            key: key.into(),
            ops: Mutex::new(()),
            published,
        }
    }

    /// Load the persisted completion set.
    ///
    /// Absent, malformed, or unreadable data yields an empty set; this never
    /// fails. Subscribers are only updated when the read itself succeeded.
    pub async fn load(&self) -> CompletionSet {
        let _op = self.ops.lock().await;
        match self.read_persisted().await {
            Ok(set) => {
                debug!(completed = set.len(), "loaded completion set");
                self.published.send_replace(set.clone());
                set
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to read completion set; using empty set");
                CompletionSet::new()
            }
        }
    }

    /// Flip completion of `lesson_id` against the freshest persisted value.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::Storage` if the current value cannot be read
    /// or the new value cannot be written. Nothing is published in that case.
    pub async fn toggle(&self, lesson_id: &LessonId) -> Result<ToggleOutcome, CompletionError> {
        let _op = self.ops.lock().await;
        let mut set = self.read_persisted().await?;
        let now_complete = set.toggle(lesson_id.clone());
        self.persist(&set).await?;
        self.published.send_replace(set.clone());

        info!(lesson_id = %lesson_id, now_complete, "toggled lesson completion");
        Ok(ToggleOutcome { set, now_complete })
    }

    /// Mark `lesson_id` complete if it is not already. Does not write when it
    /// is already present.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::Storage` if persistence fails.
    pub async fn mark_complete(&self, lesson_id: &LessonId) -> Result<CompletionSet, CompletionError> {
        let _op = self.ops.lock().await;
        let mut set = self.read_persisted().await?;
        if set.insert(lesson_id.clone()) {
            self.persist(&set).await?;
            info!(lesson_id = %lesson_id, "marked lesson complete");
        }
        self.published.send_replace(set.clone());
        Ok(set)
    }

    /// Delete all progress.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::Storage` if the stored value cannot be removed.
    pub async fn reset(&self) -> Result<(), CompletionError> {
        let _op = self.ops.lock().await;
        self.values.remove(&self.key).await?;
        self.published.send_replace(CompletionSet::new());
        info!("reset lesson progress");
        Ok(())
    }

    /// Last committed completion set.
    #[must_use]
    pub fn current(&self) -> CompletionSet {
        self.published.borrow().clone()
    }

    #[must_use]
    pub fn is_complete(&self, lesson_id: &LessonId) -> bool {
        self.published.borrow().contains(lesson_id)
    }

    /// Receiver notified whenever a new completion set is committed.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CompletionSet> {
        self.published.subscribe()
    }

    async fn read_persisted(&self) -> Result<CompletionSet, StorageError> {
        let Some(raw) = self.values.get(&self.key).await? else {
            return Ok(CompletionSet::new());
        };
        match CompletionSet::decode_salvaged(&raw) {
            Ok((set, 0)) => Ok(set),
            Ok((set, skipped)) => {
                warn!(key = %self.key, skipped, kept = set.len(), "skipped invalid entries in completion set");
                Ok(set)
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "discarding malformed completion set");
                Ok(CompletionSet::new())
            }
        }
    }

    async fn persist(&self, set: &CompletionSet) -> Result<(), CompletionError> {
        let encoded = set.encode()?;
        self.values.set(&self.key, &encoded).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FlakyStore;
    use storage::repository::InMemoryRepository;

    fn lid(raw: &str) -> LessonId {
        LessonId::new(raw).unwrap()
    }

    fn store_over(repo: &InMemoryRepository) -> CompletionStore {
        CompletionStore::new(Arc::new(repo.clone()))
    }

    #[tokio::test]
    async fn absent_key_loads_empty() {
        let store = store_over(&InMemoryRepository::new());
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_blob_loads_empty() {
        let repo = InMemoryRepository::new();
        repo.set(COMPLETED_LESSONS_KEY, "not json").await.unwrap();
        let store = store_over(&repo);
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn bad_entries_do_not_cost_valid_progress() {
        let repo = InMemoryRepository::new();
        repo.set(COMPLETED_LESSONS_KEY, r#"["a","b",""]"#).await.unwrap();
        let store = store_over(&repo);
        assert_eq!(store.load().await.len(), 2);

        store.toggle(&lid("c")).await.unwrap();
        assert_eq!(
            repo.get(COMPLETED_LESSONS_KEY).await.unwrap().as_deref(),
            Some(r#"["a","b","c"]"#)
        );
    }

    #[tokio::test]
    async fn toggle_twice_restores_membership() {
        let repo = InMemoryRepository::new();
        repo.set(COMPLETED_LESSONS_KEY, r#"["a"]"#).await.unwrap();
        let store = store_over(&repo);
        let before = store.load().await;

        let first = store.toggle(&lid("b")).await.unwrap();
        assert!(first.now_complete);
        let second = store.toggle(&lid("b")).await.unwrap();
        assert!(!second.now_complete);

        assert_eq!(second.set, before);
        assert_eq!(store.load().await, before);
    }

    #[tokio::test]
    async fn toggle_is_visible_to_a_fresh_store() {
        let repo = InMemoryRepository::new();
        store_over(&repo).toggle(&lid("x1")).await.unwrap();

        let reloaded = store_over(&repo).load().await;
        assert!(reloaded.contains(&lid("x1")));
    }

    #[tokio::test]
    async fn toggle_reads_the_persisted_value_not_the_cached_one() {
        let repo = InMemoryRepository::new();
        let store = store_over(&repo);
        store.load().await;

        // Another writer on the same key.
        repo.set(COMPLETED_LESSONS_KEY, r#"["other"]"#).await.unwrap();

        let outcome = store.toggle(&lid("mine")).await.unwrap();
        assert!(outcome.set.contains(&lid("other")));
        assert!(outcome.set.contains(&lid("mine")));
    }

    #[tokio::test]
    async fn failed_write_keeps_published_state() {
        let flaky = FlakyStore::new();
        let store = CompletionStore::new(Arc::new(flaky.clone()));
        store.toggle(&lid("a")).await.unwrap();

        flaky.fail_writes(true);
        let err = store.toggle(&lid("b")).await.unwrap_err();
        assert!(matches!(err, CompletionError::Storage(_)));
        assert!(!store.is_complete(&lid("b")));
        assert!(store.is_complete(&lid("a")));

        flaky.fail_writes(false);
        let persisted = store.load().await;
        assert!(!persisted.contains(&lid("b")));
    }

    #[tokio::test]
    async fn unreadable_store_loads_empty_without_publishing() {
        let flaky = FlakyStore::new();
        let store = CompletionStore::new(Arc::new(flaky.clone()));
        store.toggle(&lid("a")).await.unwrap();

        flaky.fail_reads(true);
        assert!(store.load().await.is_empty());
        assert!(store.is_complete(&lid("a")));

        let err = store.toggle(&lid("b")).await.unwrap_err();
        assert!(matches!(err, CompletionError::Storage(_)));
    }

    #[tokio::test]
    async fn reset_deletes_the_blob() {
        let repo = InMemoryRepository::new();
        let store = store_over(&repo);
        store.toggle(&lid("a")).await.unwrap();
        store.toggle(&lid("b")).await.unwrap();

        store.reset().await.unwrap();
        assert_eq!(repo.get(COMPLETED_LESSONS_KEY).await.unwrap(), None);
        assert!(store.load().await.is_empty());
        assert!(store.current().is_empty());
    }

    #[tokio::test]
    async fn mark_complete_is_idempotent() {
        let flaky = FlakyStore::new();
        let store = CompletionStore::new(Arc::new(flaky.clone()));
        store.mark_complete(&lid("a")).await.unwrap();
        let writes = flaky.writes();

        let set = store.mark_complete(&lid("a")).await.unwrap();
        assert!(set.contains(&lid("a")));
        assert_eq!(flaky.writes(), writes);
    }

    #[tokio::test]
    async fn subscribers_see_committed_sets() {
        let store = store_over(&InMemoryRepository::new());
        let mut rx = store.subscribe();

        store.toggle(&lid("a")).await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().contains(&lid("a")));
    }
}
