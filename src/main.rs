use clap::Parser;
use ledgerd::application::service::BalanceService;
use ledgerd::config::Config;
use ledgerd::domain::ports::LedgerStoreRef;
use ledgerd::infrastructure::in_memory::InMemoryLedgerStore;
use ledgerd::infrastructure::postgres::PostgresLedgerStore;
use ledgerd::interfaces::http::router::router;
use miette::{IntoDiagnostic, Result};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let store: LedgerStoreRef = match &config.database_url {
        Some(url) => {
            let store = PostgresLedgerStore::connect(url, config.db_max_connections)
                .await
                .into_diagnostic()?;
            store.run_migrations().await.into_diagnostic()?;
            tracing::info!("connected to postgres, migrations applied");
            Arc::new(store)
        }
        None => {
            tracing::warn!("no database url configured, balances will not survive a restart");
            Arc::new(InMemoryLedgerStore::new())
        }
    };

    let service = Arc::new(BalanceService::new(store, config.retry_policy()));

    let listener = tokio::net::TcpListener::bind(config.listen_address)
        .await
        .into_diagnostic()?;
    tracing::info!(address = %config.listen_address, "listening");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()?;

    tracing::info!("server exited gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutting down");
    }
}
