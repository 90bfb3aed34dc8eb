use std::sync::Arc;

use essentials_core::model::{ColorScheme, ThemeMode};
use storage::repository::KeyValueStore;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::error::ThemeError;

/// Storage key holding `light`, `dark` or `system`.
pub const THEME_MODE_KEY: &str = "themeMode";

/// Persisted appearance preference with change notification.
pub struct ThemeModeStore {
    values: Arc<dyn KeyValueStore>,
    ops: Mutex<()>,
    published: watch::Sender<ThemeMode>,
}

impl ThemeModeStore {
    #[must_use]
    pub fn new(values: Arc<dyn KeyValueStore>) -> Self {
        let (published, _) = watch::channel(ThemeMode::default());
        Self {
            values,
            ops: Mutex::new(()),
            published,
        }
    }

    /// Read the stored mode, falling back to `System` when it is unset,
    /// unrecognised or cannot be read.
    pub async fn load(&self) -> ThemeMode {
        let _op = self.ops.lock().await;
        let raw = match self.values.get(THEME_MODE_KEY).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "failed to read theme mode; using system");
                return ThemeMode::default();
            }
        };

        let mode = match raw.as_deref().map(str::parse::<ThemeMode>) {
            None => ThemeMode::default(),
            Some(Ok(mode)) => mode,
            Some(Err(err)) => {
                warn!(error = %err, "ignoring stored theme mode");
                ThemeMode::default()
            }
        };
        debug!(mode = %mode, "loaded theme mode");
        self.published.send_replace(mode);
        mode
    }

    /// Persist `mode`.
    ///
    /// # Errors
    ///
    /// Returns `ThemeError::Storage` if the write fails; subscribers keep the
    /// previous mode.
    pub async fn set(&self, mode: ThemeMode) -> Result<(), ThemeError> {
        let _op = self.ops.lock().await;
        self.values.set(THEME_MODE_KEY, mode.as_str()).await?;
        self.published.send_replace(mode);
        info!(mode = %mode, "theme mode changed");
        Ok(())
    }

    /// Parse and persist a raw mode string.
    ///
    /// # Errors
    ///
    /// Returns `ThemeError::Invalid` without writing anything when `raw` is
    /// not exactly `light`, `dark` or `system`.
    pub async fn set_str(&self, raw: &str) -> Result<ThemeMode, ThemeError> {
        let mode: ThemeMode = raw.parse()?;
        self.set(mode).await?;
        Ok(mode)
    }

    #[must_use]
    pub fn current(&self) -> ThemeMode {
        *self.published.borrow()
    }

    /// Scheme to render with right now.
    #[must_use]
    pub fn effective_now(&self, platform: ColorScheme) -> ColorScheme {
        self.current().effective(platform)
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ThemeMode> {
        self.published.subscribe()
    }
}
