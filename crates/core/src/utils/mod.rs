pub mod money_utils;
pub mod time_utils;

pub use money_utils::format_with_symbol;
pub use time_utils::{from_date_key, local_date_from_utc, local_instant_to_utc, to_date_key};
