//! LCA Server - HTTP surface for scoring, storage and advisory
//!
//! Routes:
//! - `POST /api/lca/analyze` scores and stores a submitted input
//! - `GET /api/lca/results/{id}` and `/latest` read stored results
//! - `GET /api/lca/results/{id}/export/{format}` renders JSON, CSV or text
//! - `/api/wizard/*` edits and submits the multi-step draft
//! - `POST /api/ai/insights` and `/api/ai/suggestions` call the advisory service

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::{AdvisoryConfig, ConfigError, ServerConfig};
pub use error::{ApiError, ErrorBody};
pub use routes::routes;
pub use state::{decode_advisory, AppState, Export, InsightsBody, StartupError};
