//! API layer
//!
//! HTTP handlers for:
//! - Creator API (submissions, wallet)
//! - Admin API (review, payouts)
//! - Streaming (SSE change feed)
//! - Metrics (Prometheus)

mod admin;
mod converters;
mod creator;
mod dto;
pub mod metrics;
mod streaming;

pub use converters::*;
pub use dto::*;

use axum::{Router, routing::get};

use crate::AppState;

pub use admin::admin_router;
pub use metrics::metrics_router;

/// Create creator API router (mounted under /api)
pub fn creator_api_router() -> Router<AppState> {
    creator::creator_router()
        .route("/v1/streaming/health", get(streaming::streaming_health))
        .route("/v1/streaming/user", get(streaming::stream_user))
}
