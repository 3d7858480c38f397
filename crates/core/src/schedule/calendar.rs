//! Date-only calendar arithmetic.
//!
//! Month and year steps clamp to the last day of the target month
//! (Jan 31 + 1 month = Feb 28/29, Feb 29 + 1 year = Feb 28).

use chrono::{Days, Months, NaiveDate};

use super::recurrence_model::{CycleStep, Recurrence};
use crate::errors::{Error, Result};
use crate::subscriptions::Frequency;

/// Steps `date` forward by exactly one cycle.
pub fn advance(date: NaiveDate, recurrence: &Recurrence) -> Result<NaiveDate> {
    advance_by(date, recurrence, 1)
}

/// Returns the occurrence `cycles` cycles after `anchor`.
///
/// The result is always measured from the anchor, so a month-end anchor keeps
/// its day of month after passing through a shorter month
/// (Jan 31 -> Feb 29 -> Mar 31).
pub fn advance_by(anchor: NaiveDate, recurrence: &Recurrence, cycles: u32) -> Result<NaiveDate> {
    let stepped = match recurrence.step()? {
        CycleStep::Days(days) => days
            .checked_mul(u64::from(cycles))
            .and_then(|total| anchor.checked_add_days(Days::new(total))),
        CycleStep::Months(months) => months
            .checked_mul(cycles)
            .and_then(|total| anchor.checked_add_months(Months::new(total))),
    };

    stepped.ok_or_else(|| {
        Error::InvalidConfiguration(format!(
            "{} cycles of {:?} from {} leave the supported calendar range",
            cycles, recurrence, anchor
        ))
    })
}

/// [`advance`] for a raw frequency/interval pair as stored on a record.
pub fn advance_frequency(
    date: NaiveDate,
    frequency: Frequency,
    custom_interval_days: Option<u32>,
) -> Result<NaiveDate> {
    let recurrence = Recurrence::new(frequency, custom_interval_days)?;
    advance(date, &recurrence)
}
