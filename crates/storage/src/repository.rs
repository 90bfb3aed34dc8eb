use async_trait::async_trait;
use essentials_core::model::{Block, Lesson, LessonId, Path, PathId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape for a path, matching the content store documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub order: i64,
}

impl PathRecord {
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        Self {
            id: path.id().to_string(),
            title: path.title().to_owned(),
            description: path.description().to_owned(),
            order: path.order(),
        }
    }

    /// Convert the record back into a domain `Path`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the id or title is blank.
    pub fn into_path(self) -> Result<Path, StorageError> {
        let id = PathId::new(self.id).map_err(ser)?;
        Path::new(id, self.title, self.description, self.order).map_err(ser)
    }
}

/// Persisted shape for a lesson. `blocks` may be absent in stored documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonRecord {
    pub id: String,
    pub path_id: String,
    pub order: i64,
    pub title: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl LessonRecord {
    #[must_use]
    pub fn from_lesson(lesson: &Lesson) -> Self {
        Self {
            id: lesson.id().to_string(),
            path_id: lesson.path_id().to_string(),
            order: lesson.order(),
            title: lesson.title().to_owned(),
            blocks: lesson.blocks().to_vec(),
        }
    }

    /// Convert the record back into a domain `Lesson`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if an id or the title is blank.
    pub fn into_lesson(self) -> Result<Lesson, StorageError> {
        let id = LessonId::new(self.id).map_err(ser)?;
        let path_id = PathId::new(self.path_id).map_err(ser)?;
        Lesson::new(id, path_id, self.order, self.title, self.blocks).map_err(ser)
    }
}

/// Content document accepted by the seeding tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedDocument {
    #[serde(default)]
    pub paths: Vec<PathRecord>,
    #[serde(default)]
    pub lessons: Vec<LessonRecord>,
}

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Asynchronous string key-value store used for on-device preferences and
/// progress.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read. An absent key
    /// is `Ok(None)`, not an error.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read-only view over curriculum content.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// List all paths ordered by `order`, then id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the content store is unavailable.
    async fn list_paths(&self) -> Result<Vec<Path>, StorageError>;

    /// List lessons ordered by `order`, then id. With `Some(path_id)` only
    /// that path's lessons are returned; with `None` every lesson is.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the content store is unavailable.
    async fn list_lessons(&self, path_id: Option<&PathId>) -> Result<Vec<Lesson>, StorageError>;

    /// Fetch a lesson by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the content store is unavailable; a missing
    /// lesson is `Ok(None)`.
    async fn get_lesson(&self, id: &LessonId) -> Result<Option<Lesson>, StorageError>;
}

/// Write side of the content store, used only for seeding.
#[async_trait]
pub trait ContentWriter: Send + Sync {
    /// Persist or update a path.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the path cannot be stored.
    async fn upsert_path(&self, path: &Path) -> Result<(), StorageError>;

    /// Persist or update a lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lesson cannot be stored.
    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError>;
}

fn sort_lessons(lessons: &mut [Lesson]) {
    lessons.sort_by(|a, b| a.order().cmp(&b.order()).then_with(|| a.id().cmp(b.id())));
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    paths: Arc<Mutex<HashMap<PathId, Path>>>,
    lessons: Arc<Mutex<HashMap<LessonId, Lesson>>>,
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            paths: Arc::new(Mutex::new(HashMap::new())),
            lessons: Arc::new(Mutex::new(HashMap::new())),
            values: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

#[async_trait]
impl ContentRepository for InMemoryRepository {
    async fn list_paths(&self) -> Result<Vec<Path>, StorageError> {
        let guard = self
            .paths
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut paths: Vec<Path> = guard.values().cloned().collect();
        paths.sort_by(|a, b| a.order().cmp(&b.order()).then_with(|| a.id().cmp(b.id())));
        Ok(paths)
    }

    async fn list_lessons(&self, path_id: Option<&PathId>) -> Result<Vec<Lesson>, StorageError> {
        let guard = self
            .lessons
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut lessons: Vec<Lesson> = guard
            .values()
            .filter(|lesson| path_id.is_none_or(|wanted| lesson.path_id() == wanted))
            .cloned()
            .collect();
        sort_lessons(&mut lessons);
        Ok(lessons)
    }

    async fn get_lesson(&self, id: &LessonId) -> Result<Option<Lesson>, StorageError> {
        let guard = self
            .lessons
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(id).cloned())
    }
}

#[async_trait]
impl ContentWriter for InMemoryRepository {
    async fn upsert_path(&self, path: &Path) -> Result<(), StorageError> {
        let mut guard = self
            .paths
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(path.id().clone(), path.clone());
        Ok(())
    }

    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        let mut guard = self
            .lessons
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(lesson.id().clone(), lesson.clone());
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub content: Arc<dyn ContentRepository>,
    pub values: Arc<dyn KeyValueStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from(InMemoryRepository::new())
    }
}

impl From<InMemoryRepository> for Storage {
    fn from(repo: InMemoryRepository) -> Self {
        let content: Arc<dyn ContentRepository> = Arc::new(repo.clone());
        let values: Arc<dyn KeyValueStore> = Arc::new(repo);
        Self { content, values }
    }
}
