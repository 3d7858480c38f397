use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};

use super::reminders_planner::{plan_reminders, reminder_content};
use super::{
    CancellationSummary, RebuildOutcome, RebuiltReminders, ReminderDeliveryTrait,
    ReminderPreferences, ReminderRequest, ScheduledReminders,
};
use crate::constants::REMINDER_HORIZON_CYCLES;
use crate::errors::{Error, Result};
use crate::subscriptions::Subscription;

/// Turns reminder plans into delivery-layer requests.
///
/// All calls to the delivery layer are awaited one at a time, so handles come
/// back in chronological order and a rebuild finishes one subscription before
/// starting the next. Per-reminder failures are logged and counted, never
/// propagated.
pub struct ReminderScheduler {
    delivery: Arc<dyn ReminderDeliveryTrait>,
    horizon_cycles: usize,
}

impl ReminderScheduler {
    pub fn new(delivery: Arc<dyn ReminderDeliveryTrait>) -> Self {
        ReminderScheduler {
            delivery,
            horizon_cycles: REMINDER_HORIZON_CYCLES,
        }
    }

    pub fn with_horizon(mut self, horizon_cycles: usize) -> Self {
        self.horizon_cycles = horizon_cycles;
        self
    }

    /// Schedules the upcoming reminders of one subscription.
    ///
    /// Returns an empty outcome when reminders are disabled globally or for
    /// the subscription. Fails with `PermissionDenied` when the delivery layer
    /// refuses, with `Delivery` when the permission query itself fails, and
    /// with `InvalidConfiguration` for an unschedulable recurrence; individual
    /// schedule failures are only counted.
    pub async fn schedule_upcoming(
        &self,
        subscription: &Subscription,
        preferences: &ReminderPreferences,
        now: DateTime<Utc>,
    ) -> Result<ScheduledReminders> {
        if !preferences.allows_reminders() || !subscription.reminder_settings.enabled {
            debug!(
                "Reminders disabled for subscription {}, nothing to schedule",
                subscription.id
            );
            return Ok(ScheduledReminders::default());
        }

        let planned = plan_reminders(
            subscription,
            now,
            preferences.timezone,
            self.horizon_cycles,
        )?;
        let skipped = planned.iter().filter(|p| !p.is_eligible()).count();
        if skipped == planned.len() {
            debug!(
                "No eligible reminders for subscription {} within {} cycles",
                subscription.id, self.horizon_cycles
            );
            return Ok(ScheduledReminders {
                skipped,
                ..ScheduledReminders::default()
            });
        }

        if !self.delivery.has_permission().await? {
            warn!(
                "Notification permission missing, reminders for {} not scheduled",
                subscription.id
            );
            return Err(Error::PermissionDenied);
        }

        let (title, body) = reminder_content(subscription, &preferences.currency_symbol);
        let mut outcome = ScheduledReminders {
            skipped,
            ..ScheduledReminders::default()
        };

        for reminder in planned {
            if let Some(reason) = reminder.skip_reason {
                debug!(
                    "Skipping reminder for {} at {} ({:?})",
                    subscription.id, reminder.fire_at, reason
                );
                continue;
            }

            let request = ReminderRequest {
                fire_at: reminder.fire_at,
                title: title.clone(),
                body: body.clone(),
                correlation_id: subscription.id.clone(),
            };
            match self.delivery.schedule(request).await {
                Ok(reminder_id) => outcome.reminder_ids.push(reminder_id),
                Err(e) => {
                    error!(
                        "Failed to schedule reminder for {} at {}: {}. Skipping.",
                        subscription.id, reminder.fire_at, e
                    );
                    outcome.failed += 1;
                }
            }
        }

        info!(
            "Scheduled {} reminders for {} ({} skipped, {} failed)",
            outcome.reminder_ids.len(),
            subscription.name,
            outcome.skipped,
            outcome.failed
        );
        Ok(outcome)
    }

    /// Cancels every stored handle of `previous`, then schedules `updated`.
    ///
    /// Cancellation always runs to completion first, even when every call
    /// fails.
    pub async fn reschedule_for_edit(
        &self,
        previous: &Subscription,
        updated: &Subscription,
        preferences: &ReminderPreferences,
        now: DateTime<Utc>,
    ) -> Result<ScheduledReminders> {
        let cancelled = self.cancel_all(previous).await;
        debug!(
            "Cancelled {} reminders of {} before rescheduling ({} failed)",
            cancelled.cancelled, previous.id, cancelled.failed
        );
        self.schedule_upcoming(updated, preferences, now).await
    }

    /// Best-effort cancellation of a subscription's stored handles.
    pub async fn cancel_all(&self, subscription: &Subscription) -> CancellationSummary {
        let mut summary = CancellationSummary::default();
        for reminder_id in subscription.reminder_ids() {
            match self.delivery.cancel(reminder_id).await {
                Ok(()) => summary.cancelled += 1,
                Err(e) => {
                    warn!(
                        "Could not cancel reminder {} of {}: {}",
                        reminder_id, subscription.id, e
                    );
                    summary.failed += 1;
                }
            }
        }
        summary
    }

    /// Clears everything the delivery layer holds and schedules every
    /// subscription again, sequentially.
    ///
    /// Subscriptions whose scheduling fails get an empty list and the rebuild
    /// continues. A permission refusal stops further delivery calls: handles
    /// already issued are kept, and the subscription that was refused plus
    /// every later one get an empty list.
    pub async fn rebuild_all(
        &self,
        subscriptions: &[Subscription],
        preferences: &ReminderPreferences,
        now: DateTime<Utc>,
    ) -> RebuildOutcome {
        if let Err(e) = self.delivery.cancel_all().await {
            warn!("Bulk reminder cancellation failed: {}. Continuing rebuild.", e);
        }

        let mut outcome = RebuildOutcome {
            rebuilt: Vec::with_capacity(subscriptions.len()),
            permission_denied: false,
        };
        for subscription in subscriptions {
            let reminders = if outcome.permission_denied {
                ScheduledReminders::default()
            } else {
                match self
                    .schedule_upcoming(subscription, preferences, now)
                    .await
                {
                    Ok(reminders) => reminders,
                    Err(Error::PermissionDenied) => {
                        warn!(
                            "Notification permission revoked while rebuilding {}; remaining subscriptions get no reminders",
                            subscription.id
                        );
                        outcome.permission_denied = true;
                        ScheduledReminders::default()
                    }
                    Err(e) => {
                        error!(
                            "Could not rebuild reminders for {}: {}. Skipping.",
                            subscription.id, e
                        );
                        ScheduledReminders::default()
                    }
                }
            };
            outcome.rebuilt.push(RebuiltReminders {
                subscription_id: subscription.id.clone(),
                reminders,
            });
        }

        info!(
            "Rebuilt reminders for {} subscriptions ({} scheduled)",
            outcome.rebuilt.len(),
            outcome.total_scheduled()
        );
        outcome
    }
}
