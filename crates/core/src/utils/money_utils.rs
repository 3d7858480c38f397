use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::DISPLAY_DECIMAL_PRECISION;

/// Renders an amount with two decimals, a comma separator and the symbol
/// appended, e.g. `9,99€`. No currency conversion happens here.
pub fn format_with_symbol(value: Decimal, symbol: &str) -> String {
    let rounded = value.round_dp_with_strategy(
        DISPLAY_DECIMAL_PRECISION,
        RoundingStrategy::MidpointAwayFromZero,
    );
    format!(
        "{:.prec$}{}",
        rounded,
        symbol,
        prec = DISPLAY_DECIMAL_PRECISION as usize
    )
    .replacen('.', ",", 1)
}
