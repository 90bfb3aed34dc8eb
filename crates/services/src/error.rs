//! Shared error types for the services crate.

use thiserror::Error;

use essentials_core::model::{CompletionCodecError, ThemeModeError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `CompletionStore` mutations.
///
/// Reads never fail; only a write that could not be persisted is reported,
/// and in that case the published completion set is left unchanged.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompletionError {
    #[error(transparent)]
    Codec(#[from] CompletionCodecError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ThemeModeStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ThemeError {
    #[error(transparent)]
    Invalid(#[from] ThemeModeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
