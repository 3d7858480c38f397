//! Recurrence rule consumed by calendar arithmetic.

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::subscriptions::Frequency;

/// A validated billing cycle.
///
/// This is the only type the calendar arithmetic understands. Records carry
/// a [`Frequency`] plus an optional interval and are converted with
/// [`Recurrence::new`], which rejects a custom cycle without a positive
/// interval instead of substituting a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Recurrence {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    #[serde(rename_all = "camelCase")]
    Custom { interval_days: u32 },
}

/// How one cycle moves a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CycleStep {
    Days(u64),
    Months(u32),
}

impl Recurrence {
    pub fn new(frequency: Frequency, custom_interval_days: Option<u32>) -> Result<Self> {
        let recurrence = match frequency {
            Frequency::Daily => Recurrence::Daily,
            Frequency::Weekly => Recurrence::Weekly,
            Frequency::Monthly => Recurrence::Monthly,
            Frequency::Yearly => Recurrence::Yearly,
            Frequency::Custom => match custom_interval_days {
                Some(interval_days) => Recurrence::Custom { interval_days },
                None => {
                    return Err(Error::InvalidConfiguration(
                        "custom frequency requires customIntervalDays".to_string(),
                    ))
                }
            },
        };
        recurrence.step()?;
        Ok(recurrence)
    }

    pub fn frequency(&self) -> Frequency {
        match self {
            Recurrence::Daily => Frequency::Daily,
            Recurrence::Weekly => Frequency::Weekly,
            Recurrence::Monthly => Frequency::Monthly,
            Recurrence::Yearly => Frequency::Yearly,
            Recurrence::Custom { .. } => Frequency::Custom,
        }
    }

    pub fn custom_interval_days(&self) -> Option<u32> {
        match self {
            Recurrence::Custom { interval_days } => Some(*interval_days),
            _ => None,
        }
    }

    pub(crate) fn step(&self) -> Result<CycleStep> {
        match *self {
            Recurrence::Daily => Ok(CycleStep::Days(1)),
            Recurrence::Weekly => Ok(CycleStep::Days(7)),
            Recurrence::Monthly => Ok(CycleStep::Months(1)),
            Recurrence::Yearly => Ok(CycleStep::Months(12)),
            Recurrence::Custom { interval_days } if interval_days >= 1 => {
                Ok(CycleStep::Days(u64::from(interval_days)))
            }
            Recurrence::Custom { interval_days } => Err(Error::InvalidConfiguration(format!(
                "customIntervalDays must be at least 1, got {}",
                interval_days
            ))),
        }
    }
}
