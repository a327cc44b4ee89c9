use crate::application::retry::RetryPolicy;
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

/// Runtime configuration, from CLI flags or environment variables.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "LISTEN_ADDRESS", default_value = "0.0.0.0:8080")]
    pub listen_address: SocketAddr,

    /// Postgres connection string. When absent, the server runs on the
    /// in-memory store (local development only).
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum connections in the database pool
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 20)]
    pub db_max_connections: u32,

    /// Maximum attempts for an operation hitting serialization conflicts
    #[arg(long, env = "RETRY_MAX_ATTEMPTS", default_value_t = 10)]
    pub retry_max_attempts: u32,

    /// Base backoff delay between retry attempts, in milliseconds
    #[arg(long, env = "RETRY_BASE_DELAY_MS", default_value_t = 10)]
    pub retry_base_delay_ms: u64,
}

impl Config {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_max_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }
}
