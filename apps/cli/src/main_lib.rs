use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use subtrack_core::reminders::ReminderScheduler;
use subtrack_core::settings::{
    CurrencySymbol, SettingsService, SettingsServiceTrait, SettingsUpdate,
};
use subtrack_core::SubscriptionService;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::delivery::LogDelivery;
use crate::storage::{MemoryStore, Snapshot};

pub struct AppState {
    pub settings_service: Arc<dyn SettingsServiceTrait>,
    pub subscription_service: Arc<SubscriptionService>,
    pub delivery: Arc<LogDelivery>,
}

pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if config.log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Environment overrides applied on top of the stored settings.
fn settings_overrides(config: &Config) -> anyhow::Result<SettingsUpdate> {
    let timezone = config
        .timezone
        .as_deref()
        .map(|name| {
            name.parse::<Tz>()
                .map_err(|e| anyhow!("invalid SUBTRACK_TIMEZONE '{}': {}", name, e))
        })
        .transpose()?;
    let currency_symbol = config
        .currency_symbol
        .as_deref()
        .map(|symbol| {
            CurrencySymbol::parse(symbol)
                .ok_or_else(|| anyhow!("unsupported SUBTRACK_CURRENCY_SYMBOL '{}'", symbol))
        })
        .transpose()?;

    Ok(SettingsUpdate {
        timezone,
        currency_symbol,
        ..SettingsUpdate::default()
    })
}

pub fn build_state(config: &Config, now: DateTime<Utc>) -> anyhow::Result<AppState> {
    let mut snapshot = Snapshot::load(&config.data_file)?;
    tracing::info!("Data file in use: {}", config.data_file.display());

    let settings = snapshot
        .settings
        .take()
        .unwrap_or_default()
        .merged(&settings_overrides(config)?);
    let subscriptions = snapshot.into_subscriptions(now, settings.timezone)?;
    tracing::info!(
        "Loaded {} subscriptions (time zone {})",
        subscriptions.len(),
        settings.timezone
    );

    let store = Arc::new(MemoryStore::new(Some(settings), subscriptions));
    let settings_service: Arc<dyn SettingsServiceTrait> =
        Arc::new(SettingsService::new(store.clone()));
    let delivery = Arc::new(LogDelivery::default());
    let scheduler = Arc::new(ReminderScheduler::new(delivery.clone()));
    let subscription_service = Arc::new(SubscriptionService::new(
        store,
        scheduler,
        settings_service.clone(),
    ));

    Ok(AppState {
        settings_service,
        subscription_service,
        delivery,
    })
}
