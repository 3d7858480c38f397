use std::path::PathBuf;

const DEFAULT_DATA_FILE: &str = "subscriptions.json";

/// Runtime configuration read from the environment (and an optional `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub data_file: PathBuf,
    /// IANA zone overriding the stored settings, e.g. `Europe/Madrid`
    pub timezone: Option<String>,
    /// `€`, `$`, `£` or their ISO codes
    pub currency_symbol: Option<String>,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let data_file = std::env::var("SUBTRACK_DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_FILE));
        let timezone = non_blank_var("SUBTRACK_TIMEZONE");
        let currency_symbol = non_blank_var("SUBTRACK_CURRENCY_SYMBOL");
        let log_format =
            std::env::var("SUBTRACK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        Config {
            data_file,
            timezone,
            currency_symbol,
            log_format,
        }
    }
}

fn non_blank_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
