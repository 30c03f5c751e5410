//! HTTP API
//!
//! Routes, handlers, request/response types, and the shared state they
//! run against. Authentication is per-route via the [`extract`]
//! extractors.

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
