//! Portfolio-level folds over the subscription collection.
//!
//! Ordering always uses the next payment recomputed from `start_date`; the
//! cached `next_payment_date` on a record can be stale and is never read here.
//! Subscriptions whose recurrence is invalid are kept but sort last.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use log::warn;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::aggregation_model::{
    AccumulatedSpend, CategoryBreakdownItem, CategoryGroup, PaymentHighlight, PortfolioSummary,
    TrendPoint, UpcomingPayment,
};
use crate::amounts::{amount_for_period, Period};
use crate::constants::{CALENDAR_WINDOW_MONTHS, DISPLAY_DECIMAL_PRECISION, TREND_PERIODS};
use crate::errors::Result;
use crate::schedule::{days_until, occurrences_between};
use crate::subscriptions::{Category, Subscription};
use crate::utils::time_utils::to_date_key;

pub fn total_monthly(subscriptions: &[Subscription]) -> Decimal {
    total_for_period(subscriptions, Period::Month)
}

pub fn total_yearly(subscriptions: &[Subscription]) -> Decimal {
    total_for_period(subscriptions, Period::Year)
}

pub fn total_for_period(subscriptions: &[Subscription], period: Period) -> Decimal {
    subscriptions
        .iter()
        .map(|s| amount_for_period(s, period))
        .sum()
}

fn live_next_payment(subscription: &Subscription, today: NaiveDate) -> Option<NaiveDate> {
    match subscription.live_next_payment_date(today) {
        Ok(date) => Some(date),
        Err(e) => {
            warn!(
                "Cannot compute next payment for {}: {}",
                subscription.id, e
            );
            None
        }
    }
}

/// Stable ascending order by live next payment; invalid recurrences last.
fn sort_by_live_next_payment(subscriptions: &mut [Subscription], today: NaiveDate) {
    subscriptions.sort_by_cached_key(|s| match live_next_payment(s, today) {
        Some(date) => (false, date),
        None => (true, NaiveDate::MAX),
    });
}

pub fn sorted_by_next_payment(subscriptions: &[Subscription], today: NaiveDate) -> Vec<Subscription> {
    let mut sorted = subscriptions.to_vec();
    sort_by_live_next_payment(&mut sorted, today);
    sorted
}

/// Partitions by category in order of first appearance.
pub fn group_by_category(subscriptions: &[Subscription], today: NaiveDate) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();
    for subscription in subscriptions {
        match groups
            .iter_mut()
            .find(|g| g.category == subscription.category)
        {
            Some(group) => group.subscriptions.push(subscription.clone()),
            None => groups.push(CategoryGroup {
                category: subscription.category,
                subscriptions: vec![subscription.clone()],
            }),
        }
    }

    for group in &mut groups {
        sort_by_live_next_payment(&mut group.subscriptions, today);
    }
    groups
}

/// `None` keeps every subscription.
pub fn filter_by_category(
    subscriptions: &[Subscription],
    category: Option<Category>,
) -> Vec<Subscription> {
    subscriptions
        .iter()
        .filter(|s| category.map_or(true, |c| s.category == c))
        .cloned()
        .collect()
}

/// Per-category totals for the period, largest first.
pub fn category_breakdown(
    subscriptions: &[Subscription],
    period: Period,
) -> Vec<CategoryBreakdownItem> {
    let total = total_for_period(subscriptions, period);

    let mut by_category: Vec<(Category, Decimal)> = Vec::new();
    for subscription in subscriptions {
        let amount = amount_for_period(subscription, period);
        match by_category
            .iter_mut()
            .find(|(c, _)| *c == subscription.category)
        {
            Some((_, sum)) => *sum += amount,
            None => by_category.push((subscription.category, amount)),
        }
    }

    let mut items: Vec<CategoryBreakdownItem> = by_category
        .into_iter()
        .map(|(category, amount)| CategoryBreakdownItem {
            category,
            amount,
            percentage: if total.is_zero() {
                Decimal::ZERO
            } else {
                (amount / total * dec!(100)).round_dp(1)
            },
        })
        .collect();
    items.sort_by(|a, b| b.amount.cmp(&a.amount));
    items
}

/// Category with the largest share; the first one wins a tie.
pub fn dominant_category(breakdown: &[CategoryBreakdownItem]) -> Option<&CategoryBreakdownItem> {
    breakdown
        .iter()
        .reduce(|best, item| if best.amount >= item.amount { best } else { item })
}

/// Spending level over the last six months (or years), oldest first.
///
/// A subscription counts from the month (or year) it started in.
pub fn spending_trend(
    subscriptions: &[Subscription],
    period: Period,
    today: NaiveDate,
) -> Vec<TrendPoint> {
    let mut points = Vec::with_capacity(TREND_PERIODS as usize);
    for back in (0..TREND_PERIODS).rev() {
        let (period_start, label) = match period {
            Period::Month => {
                let Some(start) = today
                    .with_day(1)
                    .and_then(|first| first.checked_sub_months(Months::new(back)))
                else {
                    continue;
                };
                (start, start.format("%Y-%m").to_string())
            }
            Period::Year => {
                let Some(start) = NaiveDate::from_ymd_opt(today.year() - back as i32, 1, 1) else {
                    continue;
                };
                (start, start.format("%Y").to_string())
            }
        };

        let amount = subscriptions
            .iter()
            .filter(|s| match period {
                Period::Month => {
                    (s.start_date.year(), s.start_date.month())
                        <= (period_start.year(), period_start.month())
                }
                Period::Year => s.start_date.year() <= period_start.year(),
            })
            .map(|s| amount_for_period(s, period))
            .sum();

        points.push(TrendPoint {
            label,
            period_start,
            amount,
        });
    }
    points
}

/// Average change per step between the first and last trend points.
pub fn average_change(trend: &[TrendPoint]) -> Decimal {
    match (trend.first(), trend.last()) {
        (Some(first), Some(last)) if trend.len() >= 2 => ((last.amount - first.amount)
            / Decimal::from(trend.len() - 1))
        .round_dp(DISPLAY_DECIMAL_PRECISION),
        _ => Decimal::ZERO,
    }
}

/// Most expensive subscription for the period; the first one wins a tie.
pub fn highest_payment(subscriptions: &[Subscription], period: Period) -> Option<PaymentHighlight> {
    subscriptions
        .iter()
        .map(|s| PaymentHighlight {
            subscription_id: s.id.clone(),
            name: s.name.clone(),
            amount: amount_for_period(s, period),
        })
        .reduce(|best, item| if best.amount >= item.amount { best } else { item })
}

/// The next `limit` payments across the collection.
pub fn upcoming_payments(
    subscriptions: &[Subscription],
    today: NaiveDate,
    limit: usize,
) -> Vec<UpcomingPayment> {
    let mut upcoming: Vec<UpcomingPayment> = subscriptions
        .iter()
        .filter_map(|s| {
            live_next_payment(s, today).map(|payment_date| UpcomingPayment {
                subscription_id: s.id.clone(),
                name: s.name.clone(),
                payment_date,
                days_until: days_until(payment_date, today),
                price: s.price,
            })
        })
        .collect();
    upcoming.sort_by_key(|p| p.payment_date);
    upcoming.truncate(limit);
    upcoming
}

pub fn accumulated_spend(subscription: &Subscription, today: NaiveDate) -> Result<AccumulatedSpend> {
    let charges = subscription.charges_since_start(today)?;
    Ok(AccumulatedSpend {
        subscription_id: subscription.id.clone(),
        name: subscription.name.clone(),
        charges,
        total_spent: subscription.price * Decimal::from(charges),
    })
}

/// Subscription with the highest cumulative spend so far.
pub fn most_accumulated(subscriptions: &[Subscription], today: NaiveDate) -> Option<AccumulatedSpend> {
    subscriptions
        .iter()
        .filter_map(|s| match accumulated_spend(s, today) {
            Ok(spend) => Some(spend),
            Err(e) => {
                warn!("Cannot count charges for {}: {}", s.id, e);
                None
            }
        })
        .reduce(|best, item| {
            if best.total_spent >= item.total_spent {
                best
            } else {
                item
            }
        })
}

/// Earliest-started subscription; the first one wins a tie.
pub fn oldest_subscription(subscriptions: &[Subscription]) -> Option<&Subscription> {
    subscriptions
        .iter()
        .reduce(|oldest, s| if oldest.start_date <= s.start_date { oldest } else { s })
}

/// Payment days within `[from, to]`, keyed by local date key, each listing
/// subscription ids in collection order.
pub fn payment_calendar(
    subscriptions: &[Subscription],
    from: NaiveDate,
    to: NaiveDate,
) -> BTreeMap<String, Vec<String>> {
    let mut calendar: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for subscription in subscriptions {
        let dates = match subscription
            .recurrence()
            .and_then(|r| occurrences_between(subscription.start_date, &r, from, to))
        {
            Ok(dates) => dates,
            Err(e) => {
                warn!(
                    "Skipping {} in payment calendar: {}",
                    subscription.id, e
                );
                continue;
            }
        };
        for date in dates {
            calendar
                .entry(to_date_key(date))
                .or_default()
                .push(subscription.id.clone());
        }
    }
    calendar
}

/// Payment calendar from `today` through the next six months.
pub fn upcoming_payment_calendar(
    subscriptions: &[Subscription],
    today: NaiveDate,
) -> BTreeMap<String, Vec<String>> {
    let end = today
        .checked_add_months(Months::new(CALENDAR_WINDOW_MONTHS))
        .unwrap_or(NaiveDate::MAX);
    payment_calendar(subscriptions, today, end)
}

pub fn portfolio_summary(subscriptions: &[Subscription], today: NaiveDate) -> PortfolioSummary {
    PortfolioSummary {
        subscription_count: subscriptions.len(),
        total_monthly: total_monthly(subscriptions),
        total_yearly: total_yearly(subscriptions),
        next_payment: upcoming_payments(subscriptions, today, 1).into_iter().next(),
    }
}
