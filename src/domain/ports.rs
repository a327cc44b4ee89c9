use super::account::{Account, Amount, OperationKind};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// The durable ledger: current balances plus the append-only operation log.
///
/// `apply_operation` is a single atomic attempt. It either commits exactly
/// one balance mutation plus one audit record, or leaves durable state
/// untouched. A failed attempt may report `TransientConflict`, in which case
/// the caller is free to retry a fresh attempt; all other errors are
/// definitive.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Persists a zero-balance ledger entry for `account_id`.
    async fn create_account(&self, account_id: Uuid) -> Result<()>;

    /// Fetches the current ledger entry, or `AccountNotFound`.
    async fn get_account(&self, account_id: Uuid) -> Result<Account>;

    /// Atomically applies one operation and returns the resulting balance.
    async fn apply_operation(
        &self,
        account_id: Uuid,
        kind: OperationKind,
        amount: Amount,
    ) -> Result<Decimal>;
}

pub type LedgerStoreRef = Arc<dyn LedgerStore>;
