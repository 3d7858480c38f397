//! Amount normalizer - per-cycle prices expressed as monthly and yearly figures.

mod amounts_calculator;

pub use amounts_calculator::{
    amount_for_period, monthly_amount, normalize, yearly_amount, MonetaryEquivalents, Period,
};
