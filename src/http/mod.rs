//! HTTP server module for the parking backend.
//!
//! An axum-based REST API over the store layer. Handlers validate and parse
//! requests, delegate to `store::services`, and translate store errors into
//! the `{success, message}` envelope the deployed clients expect.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
