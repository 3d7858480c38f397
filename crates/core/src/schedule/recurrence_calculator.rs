//! Next-payment and historical-charge calculations.
//!
//! All comparisons are between calendar days. Callers holding an instant
//! convert it once with [`local_date_from_utc`] and pass the resulting day.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::calendar::advance_by;
use super::recurrence_model::{CycleStep, Recurrence};
use crate::errors::{Error, Result};
use crate::utils::time_utils::{days_between, local_date_from_utc};

/// Index of the first occurrence strictly after `day`.
///
/// Index 0 is the anchor itself, so the returned value is also the number of
/// occurrences on or before `day`.
pub(crate) fn first_index_after(
    anchor: NaiveDate,
    recurrence: &Recurrence,
    day: NaiveDate,
) -> Result<u32> {
    if anchor > day {
        return Ok(0);
    }

    let estimate = match recurrence.step()? {
        CycleStep::Days(step) => {
            let elapsed = days_between(anchor, day) as u64;
            elapsed / step + 1
        }
        CycleStep::Months(step) => {
            let elapsed = (day.year() - anchor.year()) as i64 * 12 + day.month() as i64
                - anchor.month() as i64;
            elapsed as u64 / u64::from(step)
        }
    };
    let mut index = u32::try_from(estimate).map_err(|_| {
        Error::InvalidConfiguration(format!("too many cycles between {} and {}", anchor, day))
    })?;

    // Month estimates can land one cycle early because of day-of-month
    // clamping; walk forward until the occurrence is past `day`.
    while advance_by(anchor, recurrence, index)? <= day {
        index += 1;
    }
    while index > 0 && advance_by(anchor, recurrence, index - 1)? > day {
        index -= 1;
    }
    Ok(index)
}

/// First occurrence strictly after `reference_day`.
///
/// Returns `anchor` unchanged when it is already after the reference day.
/// A subscription starting today is therefore due again one cycle from today.
pub fn next_occurrence_at_or_after(
    anchor: NaiveDate,
    recurrence: &Recurrence,
    reference_day: NaiveDate,
) -> Result<NaiveDate> {
    let index = first_index_after(anchor, recurrence, reference_day)?;
    advance_by(anchor, recurrence, index)
}

/// Number of occurrences on or before `reference_day`, counting the anchor.
pub fn occurrences_since(
    anchor: NaiveDate,
    recurrence: &Recurrence,
    reference_day: NaiveDate,
) -> Result<u64> {
    first_index_after(anchor, recurrence, reference_day).map(u64::from)
}

/// All occurrences within `[from, to]`, in ascending order.
pub fn occurrences_between(
    anchor: NaiveDate,
    recurrence: &Recurrence,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<NaiveDate>> {
    if from > to || anchor > to {
        return Ok(Vec::new());
    }

    let mut index = match from.pred_opt() {
        Some(day_before) if from > anchor => first_index_after(anchor, recurrence, day_before)?,
        _ => 0,
    };

    let mut dates = Vec::new();
    loop {
        let occurrence = advance_by(anchor, recurrence, index)?;
        if occurrence > to {
            break;
        }
        dates.push(occurrence);
        index += 1;
    }
    Ok(dates)
}

/// [`next_occurrence_at_or_after`] for an instant observed in `tz`.
pub fn next_payment_date(
    anchor: NaiveDate,
    recurrence: &Recurrence,
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<NaiveDate> {
    next_occurrence_at_or_after(anchor, recurrence, local_date_from_utc(now, tz))
}

/// Signed number of days from `today` until `date`.
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    days_between(today, date)
}

/// How long a subscription has been running, in display buckets of
/// 30-day months and 365-day years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "camelCase")]
pub enum SubscriptionAge {
    Days { days: i64 },
    Months { months: i64 },
    #[serde(rename_all = "camelCase")]
    YearsAndMonths { years: i64, months: i64 },
}

pub fn subscription_age(start_date: NaiveDate, today: NaiveDate) -> SubscriptionAge {
    let days = days_between(start_date, today).max(0);
    if days < 30 {
        SubscriptionAge::Days { days }
    } else if days < 365 {
        SubscriptionAge::Months { months: days / 30 }
    } else {
        SubscriptionAge::YearsAndMonths {
            years: days / 365,
            months: (days % 365) / 30,
        }
    }
}
