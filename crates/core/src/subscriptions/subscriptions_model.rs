//! Subscription domain models.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{
    DEFAULT_DAYS_BEFORE_PAYMENT, DEFAULT_NOTIFICATION_TIME, MAX_DAYS_BEFORE_PAYMENT,
    PALETTE_COLORS,
};
use crate::errors::{Error, Result, ValidationError};
use crate::schedule::{next_occurrence_at_or_after, occurrences_since, Recurrence};
use crate::utils::time_utils::local_date_from_utc;

/// Billing frequency as stored on a subscription record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Yearly,
    Custom,
}

impl Frequency {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
            Frequency::Custom => "custom",
        }
    }
}

/// Spending category of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Category {
    Home,
    Entertainment,
    Culture,
    Sport,
    Music,
    Mobility,
    Productivity,
    News,
    Gaming,
    Food,
    Work,
    Education,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Category::Home,
        Category::Entertainment,
        Category::Culture,
        Category::Sport,
        Category::Music,
        Category::Mobility,
        Category::Productivity,
        Category::News,
        Category::Gaming,
        Category::Food,
        Category::Work,
        Category::Education,
        Category::Other,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::Home => "Home",
            Category::Entertainment => "Entertainment",
            Category::Culture => "Culture",
            Category::Sport => "Sport",
            Category::Music => "Music",
            Category::Mobility => "Mobility",
            Category::Productivity => "Productivity",
            Category::News => "News",
            Category::Gaming => "Gaming",
            Category::Food => "Food",
            Category::Work => "Work",
            Category::Education => "Education",
            Category::Other => "Other",
        }
    }
}

/// Per-subscription reminder preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSettings {
    pub enabled: bool,
    pub days_before_payment: u32,
    /// Local time of day in `HH:mm`
    pub notification_time: String,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        ReminderSettings {
            enabled: true,
            days_before_payment: DEFAULT_DAYS_BEFORE_PAYMENT,
            notification_time: DEFAULT_NOTIFICATION_TIME.to_string(),
        }
    }
}

impl ReminderSettings {
    pub fn validate(&self) -> Result<()> {
        if self.days_before_payment > MAX_DAYS_BEFORE_PAYMENT {
            return Err(Error::InvalidConfiguration(format!(
                "daysBeforePayment must be between 0 and {}, got {}",
                MAX_DAYS_BEFORE_PAYMENT, self.days_before_payment
            )));
        }
        self.time_of_day().map(|_| ())
    }

    /// Parses `notification_time` as a wall-clock time.
    pub fn time_of_day(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(self.notification_time.trim(), "%H:%M").map_err(|_| {
            Error::InvalidConfiguration(format!(
                "notificationTime must be HH:mm, got '{}'",
                self.notification_time
            ))
        })
    }
}

/// Domain model representing a tracked subscription
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_interval_days: Option<u32>,
    /// Price charged once per cycle
    pub price: Decimal,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default)]
    pub reminder_settings: ReminderSettings,
    /// Handles issued by the delivery layer, in chronological order
    #[serde(default)]
    pub scheduled_reminder_ids: Option<Vec<String>>,
    /// Snapshot taken at the last create/update; may be stale
    pub next_payment_date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Subscription {
    pub fn recurrence(&self) -> Result<Recurrence> {
        Recurrence::new(self.frequency, self.custom_interval_days)
    }

    /// Next payment recomputed from `start_date`; authoritative over the
    /// cached `next_payment_date`.
    pub fn live_next_payment_date(&self, today: NaiveDate) -> Result<NaiveDate> {
        next_occurrence_at_or_after(self.start_date, &self.recurrence()?, today)
    }

    /// Number of charges made up to and including `today`.
    pub fn charges_since_start(&self, today: NaiveDate) -> Result<u64> {
        occurrences_since(self.start_date, &self.recurrence()?, today)
    }

    /// Cumulative spend: one full price per charge so far.
    pub fn total_spent(&self, today: NaiveDate) -> Result<Decimal> {
        self.charges_since_start(today)
            .map(|charges| self.price * Decimal::from(charges))
    }

    pub fn reminder_ids(&self) -> &[String] {
        self.scheduled_reminder_ids.as_deref().unwrap_or(&[])
    }

    /// Checks a record read back from storage against the same rules form
    /// input goes through.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingField("id".to_string()).into());
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        if self.price < Decimal::ZERO {
            return Err(ValidationError::InvalidInput(format!(
                "price must not be negative, got {}",
                self.price
            ))
            .into());
        }
        self.recurrence()?;
        self.reminder_settings.validate()
    }

    /// Builds a subscription from form input.
    pub fn from_new(new: NewSubscription, now: DateTime<Utc>, tz: Tz) -> Result<Subscription> {
        let id = new
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let fields = new.fields;
        fields.validate()?;

        let recurrence = Recurrence::new(fields.frequency, fields.custom_interval_days)?;
        let next_payment_date =
            next_occurrence_at_or_after(fields.start_date, &recurrence, local_date_from_utc(now, tz))?;
        let color = non_empty(fields.color).unwrap_or_else(|| palette_color(&id).to_string());
        let timestamp = now.naive_utc();

        Ok(Subscription {
            id,
            name: fields.name.trim().to_string(),
            start_date: fields.start_date,
            frequency: fields.frequency,
            custom_interval_days: recurrence.custom_interval_days(),
            price: fields.price,
            color,
            payment_method: non_empty(fields.payment_method),
            description: non_empty(fields.description),
            category: fields.category,
            account: non_empty(fields.account),
            reminder_settings: fields.reminder_settings,
            scheduled_reminder_ids: Some(Vec::new()),
            next_payment_date,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Returns the edited subscription.
    ///
    /// Blank optional text keeps the previous value. The next payment date is
    /// recomputed and the reminder handles are cleared; the caller stores the
    /// list produced by rescheduling.
    pub fn apply_update(
        &self,
        update: SubscriptionUpdate,
        now: DateTime<Utc>,
        tz: Tz,
    ) -> Result<Subscription> {
        update.validate()?;

        let recurrence = Recurrence::new(update.frequency, update.custom_interval_days)?;
        let next_payment_date =
            next_occurrence_at_or_after(update.start_date, &recurrence, local_date_from_utc(now, tz))?;

        Ok(Subscription {
            id: self.id.clone(),
            name: update.name.trim().to_string(),
            start_date: update.start_date,
            frequency: update.frequency,
            custom_interval_days: recurrence.custom_interval_days(),
            price: update.price,
            color: non_empty(update.color).unwrap_or_else(|| self.color.clone()),
            payment_method: non_empty(update.payment_method).or_else(|| self.payment_method.clone()),
            description: non_empty(update.description).or_else(|| self.description.clone()),
            category: update.category,
            account: non_empty(update.account).or_else(|| self.account.clone()),
            reminder_settings: update.reminder_settings,
            scheduled_reminder_ids: None,
            next_payment_date,
            created_at: self.created_at,
            updated_at: now.naive_utc(),
        })
    }
}

/// Editable fields of a subscription, as submitted by a form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionUpdate {
    pub name: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub custom_interval_days: Option<u32>,
    pub price: Decimal,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub reminder_settings: ReminderSettings,
}

impl SubscriptionUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        if self.price < Decimal::ZERO {
            return Err(ValidationError::InvalidInput(format!(
                "price must not be negative, got {}",
                self.price
            ))
            .into());
        }
        self.reminder_settings.validate()
    }
}

/// Input model for creating a new subscription
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscription {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub fields: SubscriptionUpdate,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Deterministic palette pick so the same id always gets the same colour.
fn palette_color(id: &str) -> &'static str {
    let sum = id.bytes().fold(0usize, |acc, b| acc.wrapping_add(b as usize));
    PALETTE_COLORS[sum % PALETTE_COLORS.len()]
}
