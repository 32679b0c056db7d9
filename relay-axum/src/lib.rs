//! relay-axum: the HTTP surface for the multi-tenant LLM proxy — chat,
//! embeddings, audio, and OCR endpoints, plus service-key auth and the
//! ticket classifier.

pub mod app;
pub mod auth;
pub mod classifier;
mod error;
pub mod handlers;
pub mod state;
pub mod worker_runner;

pub use app::build_router;
pub use error::RelayAxumError;
pub use state::AppState;
pub use worker_runner::ChatJobRunner;
