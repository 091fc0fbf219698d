//! Business directory gallery API server library.
//!
//! Exposes config, state, error handling, the in-memory gallery store, and
//! routes so integration tests and the binary entrypoint share them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod store;
