mod cli;

use anyhow::bail;
use chrono::{Duration as ChronoDuration, Local};
use clap::Parser;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

use securitydb_core::reports::{AverageRelation, ReportingStore};
use securitydb_core::settings::Settings;
use securitydb_core::sync::{UpdateOptions, UpdateService};
use securitydb_core::universe::universe_by_name;
use securitydb_market_data::ProviderRegistry;
use securitydb_storage_sqlite::{create_pool, init, run_migrations, SqlitePriceStore};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let settings = Settings::load(&cli.settings)?;
    let database = settings.database(cli.command.database_key())?;
    init(&database.path)?;
    let pool = create_pool(&database.path)?;
    run_migrations(&pool)?;
    let store = Arc::new(SqlitePriceStore::new(pool));

    match cli.command {
        Commands::Update {
            delay,
            cutoff_hour,
            max_attempts,
            ref universes,
            ..
        } => {
            let registry =
                Arc::new(ProviderRegistry::from_settings(&settings.provider_settings()));
            if registry.is_empty() {
                bail!("No usable providers configured in {}", cli.settings);
            }

            let service = UpdateService::new(store, registry, settings.source_urls());
            let options = UpdateOptions {
                cutoff_hour,
                delay: Duration::from_secs(delay),
                max_attempts,
                sampling: cli.command.sampling(),
                ..UpdateOptions::default()
            };

            let mut incomplete = false;
            for name in universes {
                let Some(universe) = universe_by_name(name) else {
                    bail!("Unknown universe: {}", name);
                };

                info!("Updating universe {} ({} symbols)", name, universe.len());
                let report = service.run(&universe, &options).await?;

                info!(
                    "{}: {} processed, {} up to date, {} rows inserted, {} removed",
                    name,
                    report.processed,
                    report.up_to_date,
                    report.rows_inserted,
                    report.removed.len()
                );
                for failure in &report.failed {
                    warn!("{}: {} failed: {}", name, failure.symbol, failure.error);
                }
                if !report.is_complete() {
                    incomplete = true;
                }
            }

            if incomplete {
                bail!("One or more symbols failed to update");
            }
        }
        Commands::Report {
            average_days,
            range_days,
            ..
        } => {
            print_report(store.as_ref(), average_days, range_days)?;
        }
    }

    Ok(())
}

fn print_report(
    store: &dyn ReportingStore,
    average_days: u32,
    range_days: u32,
) -> anyhow::Result<()> {
    let now = Local::now().naive_local();
    let average_start = now - ChronoDuration::days(i64::from(average_days));
    let range_start = now - ChronoDuration::days(i64::from(range_days));

    println!("Closes relative to {}-day average:", average_days);
    for relation in [AverageRelation::Above, AverageRelation::Below] {
        let label = match relation {
            AverageRelation::Above => "above",
            AverageRelation::Below => "below",
        };
        for row in store.closes_relative_to_average(average_start, relation)? {
            println!(
                "  {:<8} {} average (close {:.2}, average {:.2})",
                row.symbol, label, row.latest_close, row.average_close
            );
        }
    }

    println!("\nTraded range over the last {} days:", range_days);
    for row in store.range_summary(range_start, now)? {
        println!(
            "  {:<8} high {:.2}  low {:.2}",
            row.symbol, row.highest, row.lowest
        );
    }

    println!("\nClose extremes over the last {} days:", range_days);
    for row in store.close_extremes(range_start, now)? {
        println!(
            "  {:<8} highest close {:.2}  lowest close {:.2}",
            row.symbol, row.highest_close, row.lowest_close
        );
    }

    Ok(())
}
