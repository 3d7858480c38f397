use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use rust_decimal::Decimal;

use super::{
    Category, NewSubscription, Subscription, SubscriptionRepositoryTrait,
    SubscriptionServiceTrait, SubscriptionUpdate,
};
use crate::aggregation;
use crate::errors::{Error, Result};
use crate::reminders::{ReminderScheduler, ScheduledReminders};
use crate::settings::{Settings, SettingsServiceTrait, SettingsUpdate};
use crate::utils::time_utils::local_date_from_utc;

/// Keeps the stored collection and the delivery layer's reminders in step.
pub struct SubscriptionService {
    repository: Arc<dyn SubscriptionRepositoryTrait>,
    scheduler: Arc<ReminderScheduler>,
    settings_service: Arc<dyn SettingsServiceTrait>,
}

impl SubscriptionService {
    pub fn new(
        repository: Arc<dyn SubscriptionRepositoryTrait>,
        scheduler: Arc<ReminderScheduler>,
        settings_service: Arc<dyn SettingsServiceTrait>,
    ) -> Self {
        Self {
            repository,
            scheduler,
            settings_service,
        }
    }

    /// Stores the outcome of a scheduling attempt on the record.
    ///
    /// A permission refusal turns the subscription's reminders off instead of
    /// failing the save. A delivery-layer failure stores an empty list and
    /// keeps the reminder flag, so the next rebuild tries again. Anything else
    /// is returned.
    async fn store_reminders(
        &self,
        mut subscription: Subscription,
        scheduled: Result<ScheduledReminders>,
    ) -> Result<Subscription> {
        match scheduled {
            Ok(outcome) => {
                subscription.scheduled_reminder_ids = Some(outcome.reminder_ids);
            }
            Err(Error::PermissionDenied) => {
                warn!(
                    "Notification permission denied, disabling reminders for {}",
                    subscription.id
                );
                subscription.reminder_settings.enabled = false;
                subscription.scheduled_reminder_ids = Some(Vec::new());
            }
            Err(Error::Delivery(e)) => {
                warn!(
                    "Reminders for {} not scheduled: {}. Saving without reminders.",
                    subscription.id, e
                );
                subscription.scheduled_reminder_ids = Some(Vec::new());
            }
            Err(e) => return Err(e),
        }
        self.repository.update_subscription(subscription).await
    }
}

#[async_trait]
impl SubscriptionServiceTrait for SubscriptionService {
    fn get_subscription(&self, subscription_id: &str) -> Result<Subscription> {
        self.repository.get_subscription(subscription_id)
    }

    fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        self.repository.list_subscriptions()
    }

    async fn create_subscription(
        &self,
        new_subscription: NewSubscription,
        now: DateTime<Utc>,
    ) -> Result<Subscription> {
        let preferences = self.settings_service.reminder_preferences()?;
        let subscription = Subscription::from_new(new_subscription, now, preferences.timezone)?;
        debug!("Creating subscription {} ({})", subscription.name, subscription.id);

        let inserted = self.repository.insert_subscription(subscription).await?;
        let scheduled = self
            .scheduler
            .schedule_upcoming(&inserted, &preferences, now)
            .await;
        self.store_reminders(inserted, scheduled).await
    }

    async fn update_subscription(
        &self,
        subscription_id: &str,
        update: SubscriptionUpdate,
        now: DateTime<Utc>,
    ) -> Result<Subscription> {
        let preferences = self.settings_service.reminder_preferences()?;
        let previous = self.repository.get_subscription(subscription_id)?;
        let updated = previous.apply_update(update, now, preferences.timezone)?;

        let scheduled = self
            .scheduler
            .reschedule_for_edit(&previous, &updated, &preferences, now)
            .await;
        self.store_reminders(updated, scheduled).await
    }

    async fn delete_subscription(&self, subscription_id: &str) -> Result<()> {
        let subscription = self.repository.get_subscription(subscription_id)?;
        let summary = self.scheduler.cancel_all(&subscription).await;
        if summary.failed > 0 {
            warn!(
                "{} reminders of {} could not be cancelled before deletion",
                summary.failed, subscription_id
            );
        }
        self.repository.delete_subscription(subscription_id).await
    }

    async fn rebuild_all_reminders(&self, now: DateTime<Utc>) -> Result<usize> {
        let preferences = self.settings_service.reminder_preferences()?;
        let subscriptions = self.repository.list_subscriptions()?;
        let outcome = self
            .scheduler
            .rebuild_all(&subscriptions, &preferences, now)
            .await;

        // Empty lists left by a refusal are written back too
        let total = outcome.total_scheduled();
        for entry in outcome.rebuilt {
            if let Err(e) = self
                .repository
                .set_reminder_ids(&entry.subscription_id, entry.reminders.reminder_ids)
                .await
            {
                error!(
                    "Failed to store rebuilt reminders for {}: {}. Skipping.",
                    entry.subscription_id, e
                );
            }
        }

        if outcome.permission_denied {
            warn!(
                "Reminder rebuild stopped by a permission refusal after {} reminders",
                total
            );
            return Err(Error::PermissionDenied);
        }

        info!(
            "Reminder rebuild finished: {} reminders across {} subscriptions",
            total,
            subscriptions.len()
        );
        Ok(total)
    }

    async fn update_settings(
        &self,
        update: SettingsUpdate,
        now: DateTime<Utc>,
    ) -> Result<Settings> {
        let before = self.settings_service.get_settings()?;
        let settings = self.settings_service.update_settings(&update).await?;
        if settings != before && update.affects_reminders() {
            match self.rebuild_all_reminders(now).await {
                Ok(_) => {}
                Err(e) if e.is_recoverable() => {
                    warn!("Settings saved but reminders not rebuilt: {}", e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(settings)
    }

    fn get_sorted_by_next_payment(&self, now: DateTime<Utc>) -> Result<Vec<Subscription>> {
        let today = local_date_from_utc(now, self.settings_service.timezone()?);
        let subscriptions = self.repository.list_subscriptions()?;
        Ok(aggregation::sorted_by_next_payment(&subscriptions, today))
    }

    fn get_by_category(&self, category: Option<Category>) -> Result<Vec<Subscription>> {
        let subscriptions = self.repository.list_subscriptions()?;
        Ok(aggregation::filter_by_category(&subscriptions, category))
    }

    fn get_total_monthly(&self) -> Result<Decimal> {
        Ok(aggregation::total_monthly(
            &self.repository.list_subscriptions()?,
        ))
    }

    fn get_total_yearly(&self) -> Result<Decimal> {
        Ok(aggregation::total_yearly(
            &self.repository.list_subscriptions()?,
        ))
    }
}
