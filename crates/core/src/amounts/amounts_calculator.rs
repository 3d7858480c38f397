//! Frequency normalization of subscription prices.
//!
//! These are display approximations built from fixed averages
//! (30.44 days and 4.33 weeks per month), not exact calendar conversions.
//! No currency conversion is applied.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{
    AVERAGE_DAYS_PER_MONTH, AVERAGE_WEEKS_PER_MONTH, DAYS_PER_YEAR,
    DEFAULT_CUSTOM_INTERVAL_DAYS, MONTHS_PER_YEAR, WEEKS_PER_YEAR,
};
use crate::subscriptions::{Frequency, Subscription};

/// Reporting period for aggregated figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Month,
    Year,
}

/// Monthly and yearly equivalents of one subscription's price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonetaryEquivalents {
    pub monthly: Decimal,
    pub yearly: Decimal,
}

/// Custom intervals fall back to 30 days when missing and never go below 1.
fn display_interval_days(custom_interval_days: Option<u32>) -> Decimal {
    Decimal::from(custom_interval_days.unwrap_or(DEFAULT_CUSTOM_INTERVAL_DAYS).max(1))
}

pub fn monthly_amount(
    price: Decimal,
    frequency: Frequency,
    custom_interval_days: Option<u32>,
) -> Decimal {
    match frequency {
        Frequency::Daily => price * AVERAGE_DAYS_PER_MONTH,
        Frequency::Weekly => price * AVERAGE_WEEKS_PER_MONTH,
        Frequency::Monthly => price,
        Frequency::Yearly => price / MONTHS_PER_YEAR,
        Frequency::Custom => {
            price * (AVERAGE_DAYS_PER_MONTH / display_interval_days(custom_interval_days))
        }
    }
}

pub fn yearly_amount(
    price: Decimal,
    frequency: Frequency,
    custom_interval_days: Option<u32>,
) -> Decimal {
    match frequency {
        Frequency::Daily => price * DAYS_PER_YEAR,
        Frequency::Weekly => price * WEEKS_PER_YEAR,
        Frequency::Monthly => price * MONTHS_PER_YEAR,
        Frequency::Yearly => price,
        Frequency::Custom => price * (DAYS_PER_YEAR / display_interval_days(custom_interval_days)),
    }
}

pub fn normalize(subscription: &Subscription) -> MonetaryEquivalents {
    MonetaryEquivalents {
        monthly: amount_for_period(subscription, Period::Month),
        yearly: amount_for_period(subscription, Period::Year),
    }
}

pub fn amount_for_period(subscription: &Subscription, period: Period) -> Decimal {
    match period {
        Period::Month => monthly_amount(
            subscription.price,
            subscription.frequency,
            subscription.custom_interval_days,
        ),
        Period::Year => yearly_amount(
            subscription.price,
            subscription.frequency,
            subscription.custom_interval_days,
        ),
    }
}
