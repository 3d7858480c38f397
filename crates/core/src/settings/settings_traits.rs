//! Repository traits for settings.

use async_trait::async_trait;

use crate::errors::Result;
use crate::settings::Settings;

/// Repository trait for the persisted application settings.
#[async_trait]
pub trait SettingsRepositoryTrait: Send + Sync {
    /// Get the stored settings. Fails with `NotFound` before the first save.
    fn get_settings(&self) -> Result<Settings>;

    /// Replace the stored settings.
    async fn save_settings(&self, settings: &Settings) -> Result<()>;
}
