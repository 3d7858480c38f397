use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::errors::Result;
use crate::settings::{Settings, SettingsUpdate};
use crate::subscriptions::{Category, NewSubscription, Subscription, SubscriptionUpdate};

/// Store that owns the subscription collection.
///
/// `list_subscriptions` returns records in insertion order; aggregation
/// relies on it for tie-breaking.
#[async_trait]
pub trait SubscriptionRepositoryTrait: Send + Sync {
    fn get_subscription(&self, subscription_id: &str) -> Result<Subscription>;
    fn list_subscriptions(&self) -> Result<Vec<Subscription>>;
    async fn insert_subscription(&self, subscription: Subscription) -> Result<Subscription>;
    async fn update_subscription(&self, subscription: Subscription) -> Result<Subscription>;
    /// Replaces the stored reminder handles of one subscription.
    async fn set_reminder_ids(&self, subscription_id: &str, reminder_ids: Vec<String>)
        -> Result<()>;
    async fn delete_subscription(&self, subscription_id: &str) -> Result<()>;
}

/// Trait for subscription lifecycle operations
#[async_trait]
pub trait SubscriptionServiceTrait: Send + Sync {
    fn get_subscription(&self, subscription_id: &str) -> Result<Subscription>;
    fn list_subscriptions(&self) -> Result<Vec<Subscription>>;
    async fn create_subscription(
        &self,
        new_subscription: NewSubscription,
        now: DateTime<Utc>,
    ) -> Result<Subscription>;
    async fn update_subscription(
        &self,
        subscription_id: &str,
        update: SubscriptionUpdate,
        now: DateTime<Utc>,
    ) -> Result<Subscription>;
    async fn delete_subscription(&self, subscription_id: &str) -> Result<()>;
    async fn rebuild_all_reminders(&self, now: DateTime<Utc>) -> Result<usize>;
    async fn update_settings(&self, update: SettingsUpdate, now: DateTime<Utc>)
        -> Result<Settings>;
    fn get_sorted_by_next_payment(&self, now: DateTime<Utc>) -> Result<Vec<Subscription>>;
    fn get_by_category(&self, category: Option<Category>) -> Result<Vec<Subscription>>;
    fn get_total_monthly(&self) -> Result<Decimal>;
    fn get_total_yearly(&self) -> Result<Decimal>;
}
