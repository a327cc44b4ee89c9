use super::retry::RetryPolicy;
use crate::domain::account::{Amount, OperationKind};
use crate::domain::ports::LedgerStoreRef;
use crate::error::{LedgerError, Result};
use crate::infrastructure::keyed_mutex::KeyedMutex;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// The account-facing API.
///
/// Owns input validation and lock discipline: every mutation validates the
/// amount, takes the per-account in-process lock, then delegates to the
/// retry-controlled store. The in-process lock keeps one in-flight mutation
/// per account per process; the store's own locking covers other processes.
pub struct BalanceService {
    store: LedgerStoreRef,
    account_locks: KeyedMutex<Uuid>,
    retry: RetryPolicy,
}

impl BalanceService {
    pub fn new(store: LedgerStoreRef, retry: RetryPolicy) -> Self {
        Self {
            store,
            account_locks: KeyedMutex::new(),
            retry,
        }
    }

    /// Creates a fresh account with a zero balance and returns its id.
    pub async fn create_account(&self) -> Result<Uuid> {
        let account_id = Uuid::new_v4();
        self.store
            .create_account(account_id)
            .await
            .inspect_err(|err| tracing::error!(%account_id, %err, "failed to create account"))?;
        tracing::debug!(%account_id, "account created");
        Ok(account_id)
    }

    /// Current balance of `account_id`. Read-only, takes no locks.
    pub async fn get_balance(&self, account_id: Uuid) -> Result<Decimal> {
        let account = self.store.get_account(account_id).await?;
        Ok(account.balance)
    }

    pub async fn deposit(&self, account_id: Uuid, amount: Decimal) -> Result<()> {
        self.mutate(account_id, OperationKind::Deposit, amount).await
    }

    pub async fn withdraw(&self, account_id: Uuid, amount: Decimal) -> Result<()> {
        self.mutate(account_id, OperationKind::Withdraw, amount).await
    }

    async fn mutate(&self, account_id: Uuid, kind: OperationKind, amount: Decimal) -> Result<()> {
        // Validation happens before any lock or store access.
        let amount = Amount::new(amount)?;

        let _guard = self.account_locks.lock(account_id).await;

        let store = Arc::clone(&self.store);
        self.retry
            .run(|| store.apply_operation(account_id, kind, amount))
            .await
            .inspect_err(|err| {
                if matches!(err, LedgerError::Storage(_) | LedgerError::TooManyRetries) {
                    tracing::error!(
                        %account_id,
                        kind = kind.as_str(),
                        %amount,
                        %err,
                        "operation failed"
                    );
                }
            })?;
        Ok(())
    }
}
