use crate::error::{LedgerError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A positive monetary magnitude for deposit/withdraw operations.
///
/// Wraps `rust_decimal::Decimal` so that a non-positive amount cannot reach
/// the lock or storage layers.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LedgerError::InvalidAmount)
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The two mutations the ledger supports. Wire format is `DEPOSIT`/`WITHDRAW`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationKind {
    Deposit,
    Withdraw,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Withdraw => "WITHDRAW",
        }
    }

    /// The signed delta this operation applies to a balance.
    pub fn signed_delta(&self, amount: Amount) -> Decimal {
        match self {
            Self::Deposit => amount.value(),
            Self::Withdraw => -amount.value(),
        }
    }
}

/// Durable state of one account's ledger entry.
///
/// `balance` is never negative at any commit point; the storage layer
/// enforces this, not the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// A fresh zero-balance account, timestamped now.
    pub fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            balance: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One entry of the append-only audit log: exactly one is written per
/// committed mutation, never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationRecord {
    pub account_id: Uuid,
    pub kind: OperationKind,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub created_at: DateTime<Utc>,
}
