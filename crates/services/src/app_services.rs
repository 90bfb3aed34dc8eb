use std::sync::Arc;

use storage::repository::Storage;

use crate::completion_store::CompletionStore;
use crate::error::AppServicesError;
use crate::lesson_service::LessonService;
use crate::theme_store::ThemeModeStore;

/// Owns the app's stores and services; screens receive `Arc`s from here.
#[derive(Clone)]
pub struct AppServices {
    completion: Arc<CompletionStore>,
    theme: Arc<ThemeModeStore>,
    lessons: Arc<LessonService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and load persisted state.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let services = Self::from_storage(&storage);
        services.hydrate().await;
        Ok(services)
    }

    /// Services over fresh in-memory storage.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_storage(&Storage::in_memory())
    }

    #[must_use]
    pub fn from_storage(storage: &Storage) -> Self {
        let completion = Arc::new(CompletionStore::new(Arc::clone(&storage.values)));
        let theme = Arc::new(ThemeModeStore::new(Arc::clone(&storage.values)));
        let lessons = Arc::new(LessonService::new(
            Arc::clone(&storage.content),
            Arc::clone(&completion),
            Arc::clone(&theme),
        ));

        Self {
            completion,
            theme,
            lessons,
        }
    }

    /// Read persisted completion and theme so `current()` reflects storage.
    pub async fn hydrate(&self) {
        let (completed, mode) = tokio::join!(self.completion.load(), self.theme.load());
        tracing::debug!(completed = completed.len(), mode = %mode, "hydrated app state");
    }

    #[must_use]
    pub fn completion(&self) -> Arc<CompletionStore> {
        Arc::clone(&self.completion)
    }

    #[must_use]
    pub fn theme(&self) -> Arc<ThemeModeStore> {
        Arc::clone(&self.theme)
    }

    #[must_use]
    pub fn lessons(&self) -> Arc<LessonService> {
        Arc::clone(&self.lessons)
    }
}
