mod config;
mod delivery;
mod main_lib;
mod storage;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use subtrack_core::aggregation::{
    self, AccumulatedSpend, CategoryBreakdownItem, PaymentHighlight, PortfolioSummary, TrendPoint,
    UpcomingPayment,
};
use subtrack_core::amounts::Period;
use subtrack_core::constants::UPCOMING_PAYMENTS_LIMIT;
use subtrack_core::schedule::{subscription_age, SubscriptionAge};
use subtrack_core::utils::{format_with_symbol, local_date_from_utc};
use subtrack_core::{Category, SubscriptionServiceTrait};

use config::Config;
use main_lib::{build_state, init_tracing};

#[derive(Parser)]
#[command(name = "subtrack")]
#[command(about = "Subscription tracker: payments, reminders and spending reports", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild reminders and print the portfolio summary (default)
    Summary,
    /// List subscriptions
    List {
        /// Only this category, e.g. "Entertainment"
        #[arg(short, long, value_parser = parse_category)]
        category: Option<Category>,

        /// Order by next payment date instead of insertion order
        #[arg(long)]
        sorted: bool,
    },
    /// Spending statistics for a period
    Stats {
        #[arg(short, long, value_enum, default_value = "month")]
        period: PeriodArg,
    },
    /// Payment days over the next six months
    Calendar,
    /// Rebuild reminders and print every pending one
    Rebuild,
}

#[derive(Clone, Copy, ValueEnum)]
enum PeriodArg {
    Month,
    Year,
}

impl From<PeriodArg> for Period {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Month => Period::Month,
            PeriodArg::Year => Period::Year,
        }
    }
}

fn parse_category(value: &str) -> Result<Category, String> {
    Category::ALL
        .into_iter()
        .find(|c| c.as_str().eq_ignore_ascii_case(value.trim()))
        .ok_or_else(|| format!("unknown category '{}'", value))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryReport {
    #[serde(flatten)]
    summary: PortfolioSummary,
    total_monthly_display: String,
    total_yearly_display: String,
    reminders_scheduled: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OldestSubscription {
    subscription_id: String,
    name: String,
    start_date: NaiveDate,
    age: SubscriptionAge,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsReport {
    period: Period,
    total: Decimal,
    total_display: String,
    breakdown: Vec<CategoryBreakdownItem>,
    dominant_category: Option<Category>,
    trend: Vec<TrendPoint>,
    average_change: Decimal,
    highest_payment: Option<PaymentHighlight>,
    upcoming: Vec<UpcomingPayment>,
    most_accumulated: Option<AccumulatedSpend>,
    oldest: Option<OldestSubscription>,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();
    init_tracing(&config);

    let now = Utc::now();
    let state = build_state(&config, now)?;
    let settings = state.settings_service.get_settings()?;
    let symbol = settings.currency_symbol.as_str();
    let today = local_date_from_utc(now, settings.timezone);
    let service = &state.subscription_service;

    match cli.command.unwrap_or(Commands::Summary) {
        Commands::Summary => {
            let reminders_scheduled = match service.rebuild_all_reminders(now).await {
                Ok(count) => count,
                Err(e) if e.is_recoverable() => {
                    tracing::warn!("Reminders not rebuilt: {}", e);
                    0
                }
                Err(e) => return Err(e.into()),
            };
            let summary = aggregation::portfolio_summary(&service.list_subscriptions()?, today);
            print_json(&SummaryReport {
                total_monthly_display: format_with_symbol(summary.total_monthly, symbol),
                total_yearly_display: format_with_symbol(summary.total_yearly, symbol),
                summary,
                reminders_scheduled,
            })?;
        }
        Commands::List { category, sorted } => {
            let subscriptions = if sorted {
                aggregation::filter_by_category(&service.get_sorted_by_next_payment(now)?, category)
            } else {
                service.get_by_category(category)?
            };
            print_json(&subscriptions)?;
        }
        Commands::Stats { period } => {
            let period = Period::from(period);
            let subscriptions = service.list_subscriptions()?;
            let total = aggregation::total_for_period(&subscriptions, period);
            let breakdown = aggregation::category_breakdown(&subscriptions, period);
            let trend = aggregation::spending_trend(&subscriptions, period, today);

            print_json(&StatsReport {
                period,
                total,
                total_display: format_with_symbol(total, symbol),
                dominant_category: aggregation::dominant_category(&breakdown).map(|b| b.category),
                breakdown,
                average_change: aggregation::average_change(&trend),
                trend,
                highest_payment: aggregation::highest_payment(&subscriptions, period),
                upcoming: aggregation::upcoming_payments(
                    &subscriptions,
                    today,
                    UPCOMING_PAYMENTS_LIMIT,
                ),
                most_accumulated: aggregation::most_accumulated(&subscriptions, today),
                oldest: aggregation::oldest_subscription(&subscriptions).map(|s| {
                    OldestSubscription {
                        subscription_id: s.id.clone(),
                        name: s.name.clone(),
                        start_date: s.start_date,
                        age: subscription_age(s.start_date, today),
                    }
                }),
            })?;
        }
        Commands::Calendar => {
            let subscriptions = service.list_subscriptions()?;
            print_json(&aggregation::upcoming_payment_calendar(&subscriptions, today))?;
        }
        Commands::Rebuild => {
            let scheduled = service.rebuild_all_reminders(now).await?;
            tracing::info!("{} reminders pending", scheduled);
            print_json(&state.delivery.pending()?)?;
        }
    }

    Ok(())
}
