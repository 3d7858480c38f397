//! Reminder scheduling models.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::utils::time_utils::DEFAULT_TZ;

/// Global switches and display context the scheduler needs.
///
/// Passed explicitly so scheduling never reads process-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPreferences {
    pub notifications_enabled: bool,
    pub reminders_enabled: bool,
    pub currency_symbol: String,
    pub timezone: Tz,
}

impl Default for ReminderPreferences {
    fn default() -> Self {
        ReminderPreferences {
            notifications_enabled: true,
            reminders_enabled: true,
            currency_symbol: "€".to_string(),
            timezone: DEFAULT_TZ,
        }
    }
}

impl ReminderPreferences {
    pub fn allows_reminders(&self) -> bool {
        self.notifications_enabled && self.reminders_enabled
    }
}

/// Request handed to the delivery layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRequest {
    pub fire_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
    /// Subscription the reminder belongs to
    pub correlation_id: String,
}

/// Why a reminder was deliberately not scheduled. Not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// Reminders are switched off globally or for this subscription
    Disabled,
    /// The reminder instant is not after "now"
    InPast,
    /// The reminder would fire within the minimum lead time
    TooImminent,
}

/// One cycle of the reminder horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedReminder {
    pub payment_date: NaiveDate,
    pub fire_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<SkipReason>,
}

impl PlannedReminder {
    pub fn is_eligible(&self) -> bool {
        self.skip_reason.is_none()
    }
}

/// Outcome of scheduling one subscription's reminders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledReminders {
    /// Handles in chronological order; replaces the stored list
    pub reminder_ids: Vec<String>,
    /// Eligible reminders the delivery layer rejected
    pub failed: usize,
    /// Cycles skipped as past, too imminent or disabled
    pub skipped: usize,
}

/// Outcome of a best-effort cancellation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationSummary {
    pub cancelled: usize,
    pub failed: usize,
}

/// New reminder list for one subscription after a full rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuiltReminders {
    pub subscription_id: String,
    pub reminders: ScheduledReminders,
}

/// Result of a full rebuild.
///
/// `rebuilt` holds one entry per subscription, in input order, even when the
/// rebuild stopped early: subscriptions never reached get an empty list, since
/// the bulk cancellation already dropped their old handles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuildOutcome {
    pub rebuilt: Vec<RebuiltReminders>,
    /// The delivery layer refused permission part way through
    pub permission_denied: bool,
}

impl RebuildOutcome {
    pub fn total_scheduled(&self) -> usize {
        self.rebuilt
            .iter()
            .map(|entry| entry.reminders.reminder_ids.len())
            .sum()
    }
}
