//! HTTP server module.
//!
//! This module exposes the analysis procedures as a small REST API and serves
//! the frontend's static build.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - JSON extraction, {error} responses                     │
//! │  - CORS, compression, tracing, static files               │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Services (crop_stats, thumbnail)                         │
//! │  - Query graph assembly, threshold and clamping policy    │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  EarthEngine trait                                        │
//! │  - RestClient (production) / fakes (tests)                │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
