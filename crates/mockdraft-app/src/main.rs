// Mock draft entry point: loads config and catalog, resets the stored draft,
// and plays it through to the last pick.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use mockdraft_app::catalog::Catalog;
use mockdraft_app::config;
use mockdraft_app::runner::{DraftRunner, RunnerOptions};
use mockdraft_app::service::DraftService;
use mockdraft_core::store::SqliteStore;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Mock draft starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: user team={}, key={}",
        config.draft.user_team, config.draft.key
    );

    // 3. Load the pick catalog and player board
    let catalog = Catalog::load(
        Path::new(&config.catalog.teams),
        Path::new(&config.catalog.players),
    )
    .context("failed to load draft catalog")?;
    info!(
        "Loaded {} teams, {} picks, {} players",
        catalog.teams().len(),
        catalog.total_picks(),
        catalog.pool_size()
    );
    let catalog = Arc::new(catalog);

    // 4. Open database
    let store = SqliteStore::open(&config.database.path).context("failed to open database")?;
    info!("Database opened at {}", config.database.path);

    // 5. Build the service and start a fresh draft
    let service = Arc::new(DraftService::new(
        Arc::new(store),
        Arc::clone(&catalog),
        &config.draft.key,
        config.concurrency.retry_policy(),
        config.simulation.seed,
    ));
    let start = service
        .reset_draft(&config.draft.user_team)
        .await
        .context("failed to start draft")?;
    info!(
        "{} holds {} picks, starting in round {}",
        config.draft.user_team,
        start.team_picks.len(),
        start.current_round
    );

    // 6. Run every remaining slot
    let runner = DraftRunner::new(
        Arc::clone(&service),
        RunnerOptions {
            user_team: config.draft.user_team.clone(),
            accept_trades: config.simulation.accept_trades,
            pick_delay: Duration::from_millis(config.simulation.pick_delay_ms),
        },
    );
    let summary = runner.run().await.context("draft run failed")?;

    let state = service.state().await?;
    state
        .check_invariants(catalog.pool_size())
        .context("final draft state is inconsistent")?;

    println!(
        "{} draft class ({} trades accepted):",
        config.draft.user_team,
        summary.trades.len()
    );
    for entry in &summary.user_picks {
        println!(
            "  #{:<3} {:<28} {:<4} {}",
            entry.pick_number, entry.player_name, entry.position, entry.college
        );
    }

    info!("Mock draft complete");
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("mockdraft.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mockdraft_app=info,mockdraft_core=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
