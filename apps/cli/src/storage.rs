use std::path::Path;
use std::sync::RwLock;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use subtrack_core::errors::{Error, Result};
use subtrack_core::settings::{Settings, SettingsRepositoryTrait};
use subtrack_core::{NewSubscription, Subscription, SubscriptionRepositoryTrait};

/// A snapshot entry: either a stored record or bare form input.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SnapshotEntry {
    Stored(Box<Subscription>),
    New(Box<NewSubscription>),
}

/// On-disk JSON snapshot read at start-up.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub settings: Option<Settings>,
    #[serde(default)]
    pub subscriptions: Vec<SnapshotEntry>,
}

impl Snapshot {
    /// Reads the snapshot; a missing file is an empty collection.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::warn!(
                "Data file {} not found, starting with no subscriptions",
                path.display()
            );
            return Ok(Snapshot::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Materializes every entry, building form input as of `now`.
    ///
    /// Stored records are checked like form input; one bad entry fails the
    /// whole load.
    pub fn into_subscriptions(
        self,
        now: DateTime<Utc>,
        tz: Tz,
    ) -> anyhow::Result<Vec<Subscription>> {
        self.subscriptions
            .into_iter()
            .enumerate()
            .map(|(index, entry)| match entry {
                SnapshotEntry::Stored(subscription) => subscription
                    .validate()
                    .map(|_| *subscription)
                    .with_context(|| format!("invalid subscription at index {}", index)),
                SnapshotEntry::New(new) => Subscription::from_new(*new, now, tz)
                    .with_context(|| format!("invalid subscription at index {}", index)),
            })
            .collect()
    }
}

/// In-memory store backing both repositories for one run.
pub struct MemoryStore {
    settings: RwLock<Option<Settings>>,
    subscriptions: RwLock<Vec<Subscription>>,
}

impl MemoryStore {
    pub fn new(settings: Option<Settings>, subscriptions: Vec<Subscription>) -> Self {
        MemoryStore {
            settings: RwLock::new(settings),
            subscriptions: RwLock::new(subscriptions),
        }
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> Error {
    Error::Repository("store lock poisoned".to_string())
}

#[async_trait]
impl SettingsRepositoryTrait for MemoryStore {
    fn get_settings(&self) -> Result<Settings> {
        self.settings
            .read()
            .map_err(poisoned)?
            .clone()
            .ok_or_else(|| Error::NotFound("settings".to_string()))
    }

    async fn save_settings(&self, settings: &Settings) -> Result<()> {
        *self.settings.write().map_err(poisoned)? = Some(settings.clone());
        Ok(())
    }
}

#[async_trait]
impl SubscriptionRepositoryTrait for MemoryStore {
    fn get_subscription(&self, subscription_id: &str) -> Result<Subscription> {
        self.subscriptions
            .read()
            .map_err(poisoned)?
            .iter()
            .find(|s| s.id == subscription_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("subscription {}", subscription_id)))
    }

    fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        Ok(self.subscriptions.read().map_err(poisoned)?.clone())
    }

    async fn insert_subscription(&self, subscription: Subscription) -> Result<Subscription> {
        let mut subscriptions = self.subscriptions.write().map_err(poisoned)?;
        if subscriptions.iter().any(|s| s.id == subscription.id) {
            return Err(Error::Repository(format!(
                "subscription {} already exists",
                subscription.id
            )));
        }
        subscriptions.push(subscription.clone());
        Ok(subscription)
    }

    async fn update_subscription(&self, subscription: Subscription) -> Result<Subscription> {
        let mut subscriptions = self.subscriptions.write().map_err(poisoned)?;
        let slot = subscriptions
            .iter_mut()
            .find(|s| s.id == subscription.id)
            .ok_or_else(|| Error::NotFound(format!("subscription {}", subscription.id)))?;
        *slot = subscription.clone();
        Ok(subscription)
    }

    async fn set_reminder_ids(
        &self,
        subscription_id: &str,
        reminder_ids: Vec<String>,
    ) -> Result<()> {
        let mut subscriptions = self.subscriptions.write().map_err(poisoned)?;
        let slot = subscriptions
            .iter_mut()
            .find(|s| s.id == subscription_id)
            .ok_or_else(|| Error::NotFound(format!("subscription {}", subscription_id)))?;
        slot.scheduled_reminder_ids = Some(reminder_ids);
        Ok(())
    }

    async fn delete_subscription(&self, subscription_id: &str) -> Result<()> {
        let mut subscriptions = self.subscriptions.write().map_err(poisoned)?;
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != subscription_id);
        if subscriptions.len() == before {
            return Err(Error::NotFound(format!("subscription {}", subscription_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use std::io::Write;

    const SNAPSHOT: &str = r##"{
        "settings": {
            "language": "es",
            "currencySymbol": "€",
            "notificationsEnabled": true,
            "remindersEnabled": true,
            "promotionsEnabled": false,
            "timezone": "Europe/Madrid"
        },
        "subscriptions": [
            {
                "id": "gym",
                "name": "Gym",
                "startDate": "2023-06-01",
                "frequency": "monthly",
                "price": 30,
                "color": "#4CAF50",
                "category": "Sport",
                "nextPaymentDate": "2023-07-01",
                "createdAt": "2023-06-01T10:00:00",
                "updatedAt": "2023-06-01T10:00:00"
            },
            {
                "name": "Streamly",
                "startDate": "2024-01-31",
                "frequency": "monthly",
                "price": 9.99,
                "category": "Entertainment"
            }
        ]
    }"##;

    #[test]
    fn test_load_mixed_snapshot() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT.as_bytes()).unwrap();

        let snapshot = Snapshot::load(file.path()).unwrap();
        let settings = snapshot.settings.clone().unwrap();
        assert_eq!(settings.timezone, chrono_tz::Europe::Madrid);

        let now = Utc.with_ymd_and_hms(2024, 2, 15, 12, 0, 0).unwrap();
        let subscriptions = snapshot.into_subscriptions(now, settings.timezone).unwrap();
        assert_eq!(subscriptions.len(), 2);
        assert_eq!(subscriptions[0].id, "gym");
        // Stored records keep their cached date as written
        assert_eq!(
            subscriptions[0].next_payment_date,
            NaiveDate::from_ymd_opt(2023, 7, 1).unwrap()
        );
        assert_eq!(
            subscriptions[1].next_payment_date,
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_invalid_stored_record_fails_load() {
        let raw = r##"{
            "subscriptions": [{
                "id": "gym",
                "name": "Gym",
                "startDate": "2023-06-01",
                "frequency": "monthly",
                "price": 30,
                "color": "#4CAF50",
                "reminderSettings": {
                    "enabled": true,
                    "daysBeforePayment": 45,
                    "notificationTime": "09:00"
                },
                "nextPaymentDate": "2023-07-01",
                "createdAt": "2023-06-01T10:00:00",
                "updatedAt": "2023-06-01T10:00:00"
            }]
        }"##;
        let snapshot: Snapshot = serde_json::from_str(raw).unwrap();
        assert!(matches!(snapshot.subscriptions[0], SnapshotEntry::Stored(_)));

        let now = Utc.with_ymd_and_hms(2024, 2, 15, 12, 0, 0).unwrap();
        let err = snapshot
            .into_subscriptions(now, chrono_tz::UTC)
            .unwrap_err();
        assert!(err.to_string().contains("index 0"));
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = Snapshot::load(&dir.path().join("absent.json")).unwrap();
        assert!(snapshot.settings.is_none());
        assert!(snapshot.subscriptions.is_empty());
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new(None, Vec::new());
        assert!(matches!(store.get_settings(), Err(Error::NotFound(_))));
        store.save_settings(&Settings::default()).await.unwrap();
        assert_eq!(store.get_settings().unwrap(), Settings::default());

        assert!(matches!(
            store.set_reminder_ids("missing", Vec::new()).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            store.delete_subscription("missing").await,
            Err(Error::NotFound(_))
        ));
    }
}
