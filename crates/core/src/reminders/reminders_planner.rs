//! Pure planning of reminder instants over a finite horizon.

use chrono::{DateTime, Days, Duration, Utc};
use chrono_tz::Tz;

use super::{PlannedReminder, SkipReason};
use crate::constants::MIN_REMINDER_LEAD_SECONDS;
use crate::errors::{Error, Result};
use crate::schedule::{advance_by, first_index_after};
use crate::subscriptions::Subscription;
use crate::utils::money_utils::format_with_symbol;
use crate::utils::time_utils::{local_date_from_utc, local_instant_to_utc};

/// Plans `horizon_cycles` reminders starting at the next payment date.
///
/// The next payment is recomputed from `start_date` rather than read from the
/// cached field. Each reminder fires `days_before_payment` days ahead of its
/// payment at `notification_time` local time in `tz`; those not strictly
/// later than `now + 60s` carry a skip reason, as do all of them when the
/// subscription's reminders are switched off.
pub fn plan_reminders(
    subscription: &Subscription,
    now: DateTime<Utc>,
    tz: Tz,
    horizon_cycles: usize,
) -> Result<Vec<PlannedReminder>> {
    let recurrence = subscription.recurrence()?;
    let settings = &subscription.reminder_settings;
    settings.validate()?;
    let time_of_day = settings.time_of_day()?;

    let today = local_date_from_utc(now, tz);
    let first_index = first_index_after(subscription.start_date, &recurrence, today)?;
    let earliest_allowed = now + Duration::seconds(MIN_REMINDER_LEAD_SECONDS);

    let mut planned = Vec::with_capacity(horizon_cycles);
    for offset in 0..horizon_cycles {
        let index = u32::try_from(offset)
            .ok()
            .and_then(|offset| first_index.checked_add(offset))
            .ok_or_else(|| {
                Error::InvalidConfiguration("reminder horizon is too long".to_string())
            })?;
        let payment_date = advance_by(subscription.start_date, &recurrence, index)?;

        let reminder_day = payment_date
            .checked_sub_days(Days::new(u64::from(settings.days_before_payment)))
            .ok_or_else(|| {
                Error::InvalidConfiguration(format!(
                    "reminder for {} falls before the supported calendar range",
                    payment_date
                ))
            })?;
        let fire_at =
            local_instant_to_utc(reminder_day.and_time(time_of_day), tz).ok_or_else(|| {
                Error::InvalidConfiguration(format!(
                    "reminder time {} on {} does not exist in {}",
                    settings.notification_time, reminder_day, tz
                ))
            })?;

        let skip_reason = if !settings.enabled {
            Some(SkipReason::Disabled)
        } else if fire_at <= now {
            Some(SkipReason::InPast)
        } else if fire_at <= earliest_allowed {
            Some(SkipReason::TooImminent)
        } else {
            None
        };

        planned.push(PlannedReminder {
            payment_date,
            fire_at,
            skip_reason,
        });
    }

    Ok(planned)
}

/// Title and body shown for a subscription's reminder.
pub fn reminder_content(subscription: &Subscription, currency_symbol: &str) -> (String, String) {
    let days = subscription.reminder_settings.days_before_payment;
    let price = format_with_symbol(subscription.price, currency_symbol);
    let title = format!("Upcoming payment: {}", subscription.name);
    let body = match days {
        0 => format!("{} is due today ({}).", subscription.name, price),
        1 => format!("1 day left to pay {} ({}).", subscription.name, price),
        _ => format!("{} days left to pay {} ({}).", days, subscription.name, price),
    };
    (title, body)
}
