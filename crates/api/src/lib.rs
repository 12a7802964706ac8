//! Lorekeeper API server library.
//!
//! Exposes config, state, error handling, services and routes so the
//! integration tests and the binary entrypoint build the same application.

pub mod config;
pub mod error;
pub mod handlers;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod services;
pub mod state;
