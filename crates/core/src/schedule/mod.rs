//! Schedule module - calendar arithmetic and recurrence calculations.

mod calendar;
mod recurrence_calculator;
mod recurrence_model;

pub use calendar::{advance, advance_by, advance_frequency};
pub(crate) use recurrence_calculator::first_index_after;
pub use recurrence_calculator::{
    days_until, next_occurrence_at_or_after, next_payment_date, occurrences_between,
    occurrences_since, subscription_age, SubscriptionAge,
};
pub use recurrence_model::Recurrence;
