use crate::domain::account::{Account, Amount, OperationKind};
use crate::domain::ports::LedgerStore;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

/// Serialization failure under SERIALIZABLE isolation; safe to retry.
const SQLSTATE_SERIALIZATION_FAILURE: &str = "40001";
/// Unique constraint violation, e.g. inserting a duplicate account id.
const SQLSTATE_UNIQUE_VIOLATION: &str = "23505";

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// The single translation point from driver errors to the ledger taxonomy.
/// Everything above the store only reasons about `LedgerError`.
impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            match db_err.code().as_deref() {
                Some(SQLSTATE_SERIALIZATION_FAILURE) => return LedgerError::TransientConflict,
                Some(SQLSTATE_UNIQUE_VIOLATION) => return LedgerError::AlreadyExists,
                _ => {}
            }
        }
        LedgerError::Storage(err.to_string())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    balance: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            balance: row.balance,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// The production ledger, backed by Postgres.
///
/// Each `apply_operation` call runs one SERIALIZABLE transaction:
///
/// 1. take a transaction-scoped advisory lock hashed from the account id,
///    which serializes writers to the same account across all processes;
/// 2. apply the delta with a conditional update whose predicate encodes the
///    non-negativity invariant, reading back the new balance;
/// 3. append the audit record;
/// 4. commit.
///
/// Any error path drops the transaction, which rolls it back.
#[derive(Clone)]
pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a pool to `url` and pings it.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded schema migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|err| LedgerError::Storage(err.to_string()))
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    async fn create_account(&self, account_id: Uuid) -> Result<()> {
        sqlx::query(
            "INSERT INTO accounts (id, balance, created_at, updated_at) \
             VALUES ($1, 0, NOW(), NOW())",
        )
        .bind(account_id)
        .execute(&self.pool)
        .await?;

        tracing::info!(%account_id, "account created");
        Ok(())
    }

    async fn get_account(&self, account_id: Uuid) -> Result<Account> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT id, balance, created_at, updated_at FROM accounts WHERE id = $1",
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::from).ok_or(LedgerError::AccountNotFound)
    }

    async fn apply_operation(
        &self,
        account_id: Uuid,
        kind: OperationKind,
        amount: Amount,
    ) -> Result<Decimal> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        // Advisory lock scoped to this transaction; released on commit or
        // rollback. Serializes same-account writers across processes.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(account_id.to_string())
            .execute(&mut *tx)
            .await?;

        let delta = kind.signed_delta(amount);
        let updated: Option<Decimal> = sqlx::query_scalar(
            "UPDATE accounts \
             SET balance = balance + $2, updated_at = NOW() \
             WHERE id = $1 AND balance + $2 >= 0 \
             RETURNING balance",
        )
        .bind(account_id)
        .bind(delta)
        .fetch_optional(&mut *tx)
        .await?;

        let new_balance = match updated {
            Some(balance) => balance,
            None => {
                // The predicate failed: distinguish a missing account from
                // a balance that would have gone negative.
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1)")
                        .bind(account_id)
                        .fetch_one(&mut *tx)
                        .await?;
                return Err(if exists {
                    LedgerError::InsufficientFunds
                } else {
                    LedgerError::AccountNotFound
                });
            }
        };

        sqlx::query(
            "INSERT INTO operations (account_id, kind, amount, balance_after) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(account_id)
        .bind(kind.as_str())
        .bind(amount.value())
        .bind(new_balance)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            %account_id,
            kind = kind.as_str(),
            %amount,
            %new_balance,
            "operation applied"
        );
        Ok(new_balance)
    }
}
