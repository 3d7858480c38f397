//! Aggregation module - totals, groupings and statistics over the collection.

mod aggregation_calculator;
mod aggregation_model;


pub use aggregation_calculator::{
    accumulated_spend, average_change, category_breakdown, dominant_category, filter_by_category,
    group_by_category, highest_payment, most_accumulated, oldest_subscription, payment_calendar,
    portfolio_summary, sorted_by_next_payment, spending_trend, total_for_period, total_monthly,
    total_yearly, upcoming_payment_calendar, upcoming_payments,
};
pub use aggregation_model::{
    AccumulatedSpend, CategoryBreakdownItem, CategoryGroup, PaymentHighlight, PortfolioSummary,
    TrendPoint, UpcomingPayment,
};
