use super::SettingsRepositoryTrait;
use crate::errors::{Error, Result};
use crate::reminders::ReminderPreferences;
use crate::settings::{Settings, SettingsUpdate};
use async_trait::async_trait;
use chrono_tz::Tz;
use log::debug;
use std::sync::Arc;

// Define the trait for SettingsService
#[async_trait]
pub trait SettingsServiceTrait: Send + Sync {
    fn get_settings(&self) -> Result<Settings>;

    async fn update_settings(&self, update: &SettingsUpdate) -> Result<Settings>;

    /// Switches and display context handed to the reminder scheduler.
    fn reminder_preferences(&self) -> Result<ReminderPreferences>;

    fn timezone(&self) -> Result<Tz>;
}

pub struct SettingsService {
    settings_repository: Arc<dyn SettingsRepositoryTrait>,
}

impl SettingsService {
    pub fn new(settings_repository: Arc<dyn SettingsRepositoryTrait>) -> Self {
        SettingsService {
            settings_repository,
        }
    }
}

// Implement the trait for SettingsService
#[async_trait]
impl SettingsServiceTrait for SettingsService {
    fn get_settings(&self) -> Result<Settings> {
        match self.settings_repository.get_settings() {
            Ok(settings) => Ok(settings),
            Err(Error::NotFound(_)) => Ok(Settings::default()),
            Err(e) => Err(e),
        }
    }

    async fn update_settings(&self, update: &SettingsUpdate) -> Result<Settings> {
        let current = self.get_settings()?;
        let merged = current.merged(update);
        if merged == current {
            debug!("Settings update is a no-op");
            return Ok(current);
        }

        self.settings_repository.save_settings(&merged).await?;
        Ok(merged)
    }

    fn reminder_preferences(&self) -> Result<ReminderPreferences> {
        self.get_settings().map(|s| s.reminder_preferences())
    }

    fn timezone(&self) -> Result<Tz> {
        self.get_settings().map(|s| s.timezone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::CurrencySymbol;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockSettingsRepository {
        stored: Mutex<Option<Settings>>,
        saves: Mutex<usize>,
    }

    #[async_trait]
    impl SettingsRepositoryTrait for MockSettingsRepository {
        fn get_settings(&self) -> Result<Settings> {
            self.stored
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| Error::NotFound("settings".to_string()))
        }

        async fn save_settings(&self, settings: &Settings) -> Result<()> {
            *self.stored.lock().unwrap() = Some(settings.clone());
            *self.saves.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[test]
    fn test_defaults_when_nothing_stored() {
        let service = SettingsService::new(Arc::new(MockSettingsRepository::default()));
        let settings = service.get_settings().unwrap();
        assert_eq!(settings, Settings::default());

        let preferences = service.reminder_preferences().unwrap();
        assert!(preferences.allows_reminders());
        assert_eq!(preferences.currency_symbol, "€");
    }

    #[tokio::test]
    async fn test_update_merges_and_persists() {
        let repository = Arc::new(MockSettingsRepository::default());
        let service = SettingsService::new(repository.clone());

        let updated = service
            .update_settings(&SettingsUpdate {
                reminders_enabled: Some(false),
                currency_symbol: Some(CurrencySymbol::Pound),
                timezone: Some(chrono_tz::Europe::Madrid),
                ..SettingsUpdate::default()
            })
            .await
            .unwrap();

        assert!(!updated.reminders_enabled);
        assert!(updated.notifications_enabled);
        assert_eq!(service.timezone().unwrap(), chrono_tz::Europe::Madrid);
        assert!(!service.reminder_preferences().unwrap().allows_reminders());
        assert_eq!(*repository.saves.lock().unwrap(), 1);

        // Re-applying the same values does not write again
        service
            .update_settings(&SettingsUpdate {
                reminders_enabled: Some(false),
                ..SettingsUpdate::default()
            })
            .await
            .unwrap();
        assert_eq!(*repository.saves.lock().unwrap(), 1);
    }

    #[test]
    fn test_currency_symbol_serialization() {
        assert_eq!(
            serde_json::to_string(&CurrencySymbol::Dollar).unwrap(),
            "\"$\""
        );
        assert_eq!(CurrencySymbol::parse("GBP"), Some(CurrencySymbol::Pound));
        assert_eq!(CurrencySymbol::parse("¥"), None);
    }
}
