//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (per-request trace span, panic capture, CORS, body limit)
//! - Liveness routes (`/`, `/health`)
//! - Conversion routes (`/convert`, `/convert-url`)
//! - Optional OpenAPI document (disable with `PDF2HTML_ENABLE_DOCS=false`)

pub mod convert;
pub mod doc;
pub mod health;

use axum::{extract::DefaultBodyLimit, middleware, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

use crate::middleware::{cors, panic, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .merge(convert::router());

    if state.config.enable_docs {
        app = app.merge(doc::router());
    }

    app.layer(
        // Outermost layers execute first on the way in.
        ServiceBuilder::new()
            .layer(middleware::from_fn(trace::trace_middleware))
            .layer(CatchPanicLayer::custom(panic::panic_response))
            .layer(cors::cors_layer(&state.config))
            .layer(DefaultBodyLimit::max(state.config.max_body_bytes)),
    )
    .with_state(state)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
