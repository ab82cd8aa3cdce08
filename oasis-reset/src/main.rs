use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oasis_core::{DemoRepository, ResetClock, StayPricing};
use oasis_reset::ResetOrchestrator;
use oasis_store::app_config::{Config, ResetBackend};
use oasis_store::{seed, DbClient, InMemoryDemoRepository, PostgresDemoRepository};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oasis_reset=info,oasis_store=info,oasis_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run().await {
        tracing::error!("Demo reset failed: {:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load config")?;
    let seeds = seed::load(config.reset.seed_dir.as_deref()).context("Failed to load seed data")?;
    let pricing = StayPricing::new(config.reset.breakfast_price);
    let clock = ResetClock::now();

    match config.reset.backend {
        ResetBackend::Postgres => {
            let url = config.database_url()?;
            let db = DbClient::from_config(url, &config.database)
                .await
                .context("Failed to connect to Postgres")?;
            let repository: Arc<dyn DemoRepository> = Arc::new(PostgresDemoRepository::new(db.pool.clone()));

            let report = ResetOrchestrator::new(repository, pricing).run(&seeds, &clock).await?;
            tracing::info!("Booking statuses: {:?}", report.statuses);
        }
        ResetBackend::Memory => {
            tracing::info!("Dry run against the in-memory store");
            let memory = Arc::new(InMemoryDemoRepository::new());

            let report = ResetOrchestrator::new(memory.clone(), pricing).run(&seeds, &clock).await?;
            let bookings: Vec<_> = memory.bookings().await.into_iter().map(|(_, b)| b).collect();

            println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                "report": report,
                "bookings": bookings,
            }))?);
        }
    }

    Ok(())
}
