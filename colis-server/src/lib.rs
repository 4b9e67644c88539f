//! # Colis Server
//!
//! HTTP surface for the colis pickup-mission lifecycle engine.
//!
//! The server is a thin axum layer over [`colis_core`]: handlers translate
//! request payloads into engine calls and engine errors into structured
//! JSON responses with stable kind strings. Authentication and role
//! administration live outside this service; the caller's agency scope
//! arrives in the `x-agency-scope` header.

pub mod errors;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use errors::{AppError, AppResult};
pub use infra::{app_state::AppState, config::Config};
