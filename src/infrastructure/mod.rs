//! Infrastructure layer: storage backends and process-local locking.

pub mod in_memory;
pub mod keyed_mutex;
pub mod postgres;
