//! Application settings models.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::reminders::ReminderPreferences;
use crate::utils::time_utils::DEFAULT_TZ;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Es,
    Ca,
    #[default]
    En,
}

/// Display symbol appended to amounts. Amounts are never converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CurrencySymbol {
    #[default]
    #[serde(rename = "€")]
    Euro,
    #[serde(rename = "$")]
    Dollar,
    #[serde(rename = "£")]
    Pound,
}

impl CurrencySymbol {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CurrencySymbol::Euro => "€",
            CurrencySymbol::Dollar => "$",
            CurrencySymbol::Pound => "£",
        }
    }

    pub fn parse(symbol: &str) -> Option<Self> {
        match symbol.trim() {
            "€" | "EUR" => Some(CurrencySymbol::Euro),
            "$" | "USD" => Some(CurrencySymbol::Dollar),
            "£" | "GBP" => Some(CurrencySymbol::Pound),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub language: Language,
    pub currency_symbol: CurrencySymbol,
    pub notifications_enabled: bool,
    pub reminders_enabled: bool,
    pub promotions_enabled: bool,
    pub timezone: Tz,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            language: Language::default(),
            currency_symbol: CurrencySymbol::default(),
            notifications_enabled: true,
            reminders_enabled: true,
            promotions_enabled: false,
            timezone: DEFAULT_TZ,
        }
    }
}

impl Settings {
    pub fn reminder_preferences(&self) -> ReminderPreferences {
        ReminderPreferences {
            notifications_enabled: self.notifications_enabled,
            reminders_enabled: self.reminders_enabled,
            currency_symbol: self.currency_symbol.as_str().to_string(),
            timezone: self.timezone,
        }
    }

    /// Returns these settings with every present field of `update` applied.
    pub fn merged(&self, update: &SettingsUpdate) -> Settings {
        Settings {
            language: update.language.unwrap_or(self.language),
            currency_symbol: update.currency_symbol.unwrap_or(self.currency_symbol),
            notifications_enabled: update
                .notifications_enabled
                .unwrap_or(self.notifications_enabled),
            reminders_enabled: update.reminders_enabled.unwrap_or(self.reminders_enabled),
            promotions_enabled: update.promotions_enabled.unwrap_or(self.promotions_enabled),
            timezone: update.timezone.unwrap_or(self.timezone),
        }
    }
}

/// Partial settings change; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub language: Option<Language>,
    pub currency_symbol: Option<CurrencySymbol>,
    pub notifications_enabled: Option<bool>,
    pub reminders_enabled: Option<bool>,
    pub promotions_enabled: Option<bool>,
    pub timezone: Option<Tz>,
}

impl SettingsUpdate {
    /// Whether applying this update can change which reminders exist.
    pub fn affects_reminders(&self) -> bool {
        self.notifications_enabled.is_some()
            || self.reminders_enabled.is_some()
            || self.timezone.is_some()
            || self.currency_symbol.is_some()
    }
}
