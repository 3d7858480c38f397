use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Number of consecutive billing cycles covered by one reminder schedule
pub const REMINDER_HORIZON_CYCLES: usize = 12;

/// Reminders firing within this many seconds of "now" are not scheduled
pub const MIN_REMINDER_LEAD_SECONDS: i64 = 60;

/// Upper bound for `ReminderSettings::days_before_payment`
pub const MAX_DAYS_BEFORE_PAYMENT: u32 = 30;

/// Default reminder offset for new subscriptions
pub const DEFAULT_DAYS_BEFORE_PAYMENT: u32 = 3;

/// Default reminder time of day for new subscriptions
pub const DEFAULT_NOTIFICATION_TIME: &str = "09:00";

/// Interval assumed for display figures when a custom interval is missing
pub const DEFAULT_CUSTOM_INTERVAL_DAYS: u32 = 30;

/// Average calendar days in a month, used for monthly equivalents
pub const AVERAGE_DAYS_PER_MONTH: Decimal = dec!(30.44);

/// Average weeks in a month, used for monthly equivalents
pub const AVERAGE_WEEKS_PER_MONTH: Decimal = dec!(4.33);

/// Days in a year, used for yearly equivalents
pub const DAYS_PER_YEAR: Decimal = dec!(365);

/// Weeks in a year, used for yearly equivalents
pub const WEEKS_PER_YEAR: Decimal = dec!(52);

/// Months in a year
pub const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Months ahead covered by the payment calendar
pub const CALENDAR_WINDOW_MONTHS: u32 = 6;

/// Number of points in a spending trend
pub const TREND_PERIODS: u32 = 6;

/// Number of entries in the upcoming payments list
pub const UPCOMING_PAYMENTS_LIMIT: usize = 5;

/// Decimal precision for normalized amounts
pub const DECIMAL_PRECISION: u32 = 6;

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Colours handed out to subscriptions created without one
pub const PALETTE_COLORS: [&str; 12] = [
    "#2196F3", "#4CAF50", "#FF9800", "#9C27B0", "#F44336", "#00BCD4", "#FFC107", "#795548",
    "#607D8B", "#E91E63", "#3F51B5", "#8BC34A",
];
