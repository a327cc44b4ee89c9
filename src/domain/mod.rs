//! Domain layer: account entities, operation kinds and the storage port.

pub mod account;
pub mod ports;
