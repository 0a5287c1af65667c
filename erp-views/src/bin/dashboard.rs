//! Dashboard binary
//!
//! Seeds the store, restores the cached login, and prints the dashboard
//! summary as JSON. An optional first argument names a TOML config file;
//! otherwise configuration comes from the environment.

use anyhow::Context;
use chrono::Utc;
use erp_core::{seed, spawn_dashboard_actor, AuthSession, Config, DataStore, FileSessionStore};
use erp_views::DashboardSummary;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("failed to load config from {}", path))?,
        None => Config::from_env().context("invalid environment configuration")?,
    };

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        "Starting ERP dashboard"
    );

    let mut session = AuthSession::new(
        seed::users(),
        FileSessionStore::new(config.session.path.clone()),
    );
    match session.restore() {
        Some(user) => tracing::info!(user_id = %user.id, "Restored session"),
        None => tracing::info!("No cached session; audit entries attributed to System"),
    }

    let store = DataStore::new(&config);
    let handle = spawn_dashboard_actor(store, session, &config.ui);

    let snapshot = handle.snapshot().await?;
    tracing::info!(
        orders = snapshot.orders.len(),
        invoices = snapshot.invoices.len(),
        customers = snapshot.customers.len(),
        ledger_entries = snapshot.ledger_entries.len(),
        audit_entries = snapshot.audit_entries.len(),
        unread_notifications = snapshot.unread_notifications(),
        "Dashboard snapshot"
    );

    let mut rng = match config.seed.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let summary = DashboardSummary::build(&snapshot, Utc::now(), config.ui.page_size, &mut rng);
    println!("{}", serde_json::to_string_pretty(&summary)?);

    handle.shutdown().await?;
    tracing::info!("Shutting down ERP dashboard");
    Ok(())
}
