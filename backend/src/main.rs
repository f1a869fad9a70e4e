use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;

use backend::{
    app::build_scheduler, cli::Cli, config::AppConfig, dry_run::DryRunNotifier,
    mboum::MboumClient, startup::startup_message, telegram::TelegramNotifier,
};
use common::logger::{LogFormat, init_logger};
use market::MarketCalendar;
use scheduler::Notifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger("backend", LogFormat::detect(cli.json_logs));

    let cfg = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    tracing::info!(dry_run = cli.dry_run, "Starting market alerts backend...");

    let source = Arc::new(MboumClient::new(&cfg.mboum).context("building mboum client")?);

    let notifier: Arc<dyn Notifier> = if cli.dry_run {
        Arc::new(DryRunNotifier)
    } else {
        Arc::new(TelegramNotifier::new(&cfg.telegram).context("building telegram client")?)
    };

    let calendar = MarketCalendar::new();
    let now = Utc::now();

    if let Err(e) = notifier.send(&startup_message(&calendar, now)).await {
        tracing::warn!(error = %format!("{e:#}"), "startup message not delivered");
    }

    let (scheduler, _ctx) = build_scheduler(&cfg, source, notifier, calendar, now);

    scheduler
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = ?e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await;

    tracing::info!("backend stopped");
    Ok(())
}
