//! Portfolio aggregation models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::subscriptions::{Category, Subscription};

/// Subscriptions of one category, ordered by next payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGroup {
    pub category: Category,
    pub subscriptions: Vec<Subscription>,
}

/// Share of one category in the period total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdownItem {
    pub category: Category,
    pub amount: Decimal,
    /// Percentage of the total, one decimal place
    pub percentage: Decimal,
}

/// Spending level at the start of one month or year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// `YYYY-MM` for months, `YYYY` for years
    pub label: String,
    pub period_start: NaiveDate,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHighlight {
    pub subscription_id: String,
    pub name: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingPayment {
    pub subscription_id: String,
    pub name: String,
    pub payment_date: NaiveDate,
    pub days_until: i64,
    pub price: Decimal,
}

/// Everything a subscription has cost since it started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccumulatedSpend {
    pub subscription_id: String,
    pub name: String,
    pub charges: u64,
    pub total_spent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub subscription_count: usize,
    pub total_monthly: Decimal,
    pub total_yearly: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_payment: Option<UpcomingPayment>,
}
