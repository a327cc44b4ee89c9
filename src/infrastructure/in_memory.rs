use crate::domain::account::{Account, Amount, OperationKind, OperationRecord};
use crate::domain::ports::LedgerStore;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    accounts: HashMap<Uuid, Account>,
    operations: Vec<OperationRecord>,
}

/// A thread-safe in-memory ledger for tests and local development.
///
/// The single write lock serializes all mutations, so `apply_operation`
/// gets the same atomicity and non-negativity guarantees as the database
/// store. This backend never reports `TransientConflict`.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryLedgerStore {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// The audit log entries recorded for `account_id`, oldest first.
    pub async fn operations(&self, account_id: Uuid) -> Vec<OperationRecord> {
        let inner = self.inner.read().await;
        inner
            .operations
            .iter()
            .filter(|record| record.account_id == account_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn create_account(&self, account_id: Uuid) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.accounts.contains_key(&account_id) {
            return Err(LedgerError::AlreadyExists);
        }
        inner.accounts.insert(account_id, Account::new(account_id));
        Ok(())
    }

    async fn get_account(&self, account_id: Uuid) -> Result<Account> {
        let inner = self.inner.read().await;
        inner
            .accounts
            .get(&account_id)
            .cloned()
            .ok_or(LedgerError::AccountNotFound)
    }

    async fn apply_operation(
        &self,
        account_id: Uuid,
        kind: OperationKind,
        amount: Amount,
    ) -> Result<Decimal> {
        let mut inner = self.inner.write().await;

        let delta = kind.signed_delta(amount);
        let account = inner
            .accounts
            .get_mut(&account_id)
            .ok_or(LedgerError::AccountNotFound)?;

        let new_balance = account.balance + delta;
        if new_balance < Decimal::ZERO {
            return Err(LedgerError::InsufficientFunds);
        }

        let now = Utc::now();
        account.balance = new_balance;
        account.updated_at = now;

        inner.operations.push(OperationRecord {
            account_id,
            kind,
            amount: amount.value(),
            balance_after: new_balance,
            created_at: now,
        });

        Ok(new_balance)
    }
}
