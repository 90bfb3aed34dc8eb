#![forbid(unsafe_code)]

pub mod app_services;
pub mod completion_store;
pub mod error;
pub mod lesson_service;
pub mod refresh;
pub mod theme_store;

#[cfg(test)]
mod test_support;

pub use app_services::AppServices;
pub use completion_store::{COMPLETED_LESSONS_KEY, CompletionStore, ToggleOutcome};
pub use error::{AppServicesError, CompletionError, ThemeError};
pub use lesson_service::{LessonEntry, LessonService, PathOverview, ProgressSnapshot};
pub use refresh::{Latest, RefreshGate, RefreshTicket};
pub use theme_store::{THEME_MODE_KEY, ThemeModeStore};
