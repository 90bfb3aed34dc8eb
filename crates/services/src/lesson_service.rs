use std::collections::HashMap;
use std::sync::Arc;

use essentials_core::model::{ColorScheme, CompletionSet, Lesson, LessonId, Path, PathId};
use essentials_core::{Progress, progress, sequence};
use storage::repository::{ContentRepository, StorageError};
use tracing::{debug, warn};

use crate::completion_store::CompletionStore;
use crate::refresh::Latest;
use crate::theme_store::ThemeModeStore;

/// One row of a path's lesson list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonEntry {
    pub lesson_id: LessonId,
    pub title: String,
    pub order: i64,
    pub is_complete: bool,
}

/// A path's lessons in order, with completion flags and section progress.
#[derive(Debug, Clone, PartialEq)]
pub struct PathOverview {
    pub path: Option<Path>,
    pub path_id: PathId,
    pub entries: Vec<LessonEntry>,
    pub progress: Progress,
    /// First unfinished lesson of the path.
    pub next_lesson_id: Option<LessonId>,
}

/// Everything the home screen renders from.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub completed_count: usize,
    pub total_count: usize,
    pub progress_ratio: f64,
    pub completed: CompletionSet,
    pub next_lesson_id: Option<LessonId>,
    pub effective_theme: ColorScheme,
}

impl ProgressSnapshot {
    #[must_use]
    pub fn is_lesson_complete(&self, lesson_id: &LessonId) -> bool {
        self.completed.contains(lesson_id)
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress::from_counts(self.completed_count, self.total_count)
    }
}

/// Joins curriculum content with the learner's completion state.
///
/// Content-store failures are logged and read as "no content"; callers get
/// `None` or empty lists instead of errors.
pub struct LessonService {
    content: Arc<dyn ContentRepository>,
    completion: Arc<CompletionStore>,
    theme: Arc<ThemeModeStore>,
    latest: Latest<ProgressSnapshot>,
}

impl LessonService {
    #[must_use]
    pub fn new(
        content: Arc<dyn ContentRepository>,
        completion: Arc<CompletionStore>,
        theme: Arc<ThemeModeStore>,
    ) -> Self {
        Self {
            content,
            completion,
            theme,
            latest: Latest::new(),
        }
    }

    pub async fn paths(&self) -> Vec<Path> {
        or_empty(self.content.list_paths().await, "paths")
    }

    pub async fn lesson(&self, lesson_id: &LessonId) -> Option<Lesson> {
        match self.content.get_lesson(lesson_id).await {
            Ok(Some(lesson)) => Some(lesson),
            Ok(None) => {
                debug!(lesson_id = %lesson_id, "lesson not found");
                None
            }
            Err(err) => {
                warn!(lesson_id = %lesson_id, error = %err, "failed to fetch lesson");
                None
            }
        }
    }

    pub async fn path_lessons(&self, path_id: &PathId) -> Vec<Lesson> {
        or_empty(self.content.list_lessons(Some(path_id)).await, "path lessons")
    }

    async fn all_lessons(&self) -> Vec<Lesson> {
        or_empty(self.content.list_lessons(None).await, "lessons")
    }

    pub async fn path_overview(&self, path_id: &PathId) -> PathOverview {
        let path = self
            .paths()
            .await
            .into_iter()
            .find(|path| path.id() == path_id);
        let lessons = self.path_lessons(path_id).await;
        let completed = self.completion.load().await;

        let entries = sequence::path_sequence(&lessons)
            .into_iter()
            .map(|lesson| LessonEntry {
                lesson_id: lesson.id().clone(),
                title: lesson.title().to_owned(),
                order: lesson.order(),
                is_complete: completed.contains(lesson.id()),
            })
            .collect();

        PathOverview {
            path,
            path_id: path_id.clone(),
            entries,
            progress: Progress::of(&lessons, &completed),
            next_lesson_id: sequence::next_incomplete_in_path(&lessons, &completed)
                .map(|lesson| lesson.id().clone()),
        }
    }

    /// Every path with its section progress, in path order.
    pub async fn paths_with_progress(&self) -> Vec<(Path, Progress)> {
        let paths = self.paths().await;
        let lessons = self.all_lessons().await;
        let completed = self.completion.load().await;

        let mut per_path: HashMap<PathId, Progress> =
            progress::by_path(&paths, &lessons, &completed).into_iter().collect();
        paths
            .into_iter()
            .map(|path| {
                let progress = per_path.remove(path.id()).unwrap_or_else(Progress::empty);
                (path, progress)
            })
            .collect()
    }

    pub async fn overall_progress(&self) -> Progress {
        let lessons = self.all_lessons().await;
        let completed = self.completion.load().await;
        Progress::of(&lessons, &completed)
    }

    /// First unfinished lesson across the whole curriculum.
    pub async fn continue_learning(&self) -> Option<LessonId> {
        let paths = self.paths().await;
        let lessons = self.all_lessons().await;
        let completed = self.completion.load().await;
        sequence::next_incomplete(&paths, &lessons, &completed).map(|lesson| lesson.id().clone())
    }

    /// Lesson after `lesson_id` within its own path.
    pub async fn next_lesson_after(&self, lesson_id: &LessonId) -> Option<LessonId> {
        let lesson = self.lesson(lesson_id).await?;
        let siblings = self.path_lessons(lesson.path_id()).await;
        sequence::next_in_path(&siblings, lesson_id).map(|next| next.id().clone())
    }

    pub async fn previous_lesson_before(&self, lesson_id: &LessonId) -> Option<LessonId> {
        let lesson = self.lesson(lesson_id).await?;
        let siblings = self.path_lessons(lesson.path_id()).await;
        sequence::previous_in_path(&siblings, lesson_id).map(|prev| prev.id().clone())
    }

    pub async fn snapshot(&self, platform: ColorScheme) -> ProgressSnapshot {
        let paths = self.paths().await;
        let lessons = self.all_lessons().await;
        let completed = self.completion.load().await;
        let mode = self.theme.load().await;

        let overall = Progress::of(&lessons, &completed);
        let next_lesson_id =
            sequence::next_incomplete(&paths, &lessons, &completed).map(|l| l.id().clone());

        ProgressSnapshot {
            completed_count: overall.completed,
            total_count: overall.total,
            progress_ratio: overall.ratio,
            completed,
            next_lesson_id,
            effective_theme: mode.effective(platform),
        }
    }

    /// Recompute the snapshot and keep it unless a later refresh finished
    /// first. Returns whether this refresh's result was kept.
    pub async fn refresh(&self, platform: ColorScheme) -> bool {
        let ticket = self.latest.begin();
        let snapshot = self.snapshot(platform).await;
        self.latest.publish(ticket, snapshot)
    }

    /// Result of the newest completed refresh.
    #[must_use]
    pub fn latest_snapshot(&self) -> Option<ProgressSnapshot> {
        self.latest.get()
    }
}

fn or_empty<T: Default>(result: Result<T, StorageError>, what: &'static str) -> T {
    result.unwrap_or_else(|err| {
        warn!(error = %err, "failed to list {what}; treating as empty");
        T::default()
    })
}
