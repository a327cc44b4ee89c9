//! Application layer orchestrating the balance API.
//!
//! `BalanceService` validates input, serializes same-account mutations
//! through the keyed mutex, and drives the retry-controlled storage port.

pub mod retry;
pub mod service;
