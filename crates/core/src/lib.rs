//! Domain logic for the Lorekeeper story-bible backend.
//!
//! This crate has no database or HTTP dependencies. Everything here operates
//! on data already loaded by the caller, which keeps the heuristics and
//! renderers unit-testable in isolation.

pub mod bible;
pub mod chapter_setup;
pub mod error;
pub mod export;
pub mod intake;
pub mod search;
pub mod story;
pub mod text;
pub mod types;
pub mod validation;
