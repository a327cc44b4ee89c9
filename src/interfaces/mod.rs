//! Interface layer: thin adapters exposing the service to the outside.

pub mod http;
