//! Request handlers, one submodule per resource.
//!
//! Handlers are thin: they extract path, query and body, call the matching
//! service in [`crate::services`] and wrap the result in
//! [`DataResponse`](crate::response::DataResponse). Errors convert through
//! [`AppError`](crate::error::AppError).

pub mod admin;
pub mod arc;
pub mod chapter;
pub mod character;
pub mod export;
pub mod faction;
pub mod foreshadowing;
pub mod hook;
pub mod intake;
pub mod location;
pub mod relationship;
pub mod timeline;
pub mod volume;
pub mod world;
