//! Axum-based HTTP server implementation for label-helper.
//!
//! Serves the upload page and the JSON endpoint that runs the label pipeline.
//! Halting pipeline errors become JSON error envelopes with a matching HTTP
//! status; a failed narration is reported inside a `200` next to the text.
//!
//! # Components
//!
//! - `handlers`: Upload page, interpret, health and metrics endpoints.
//! - `middleware`: Request ID tracking.
//! - `routes`: The main router configuration that ties everything together.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod handlers;
mod middleware;
mod routes;

pub use handlers::{AudioPayload, HealthResponse, InterpretResponse, IMAGE_FIELD};
pub use routes::{create_router, AppState};
