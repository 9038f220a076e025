use crate::config::Config;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

/// CORS layer for every route.
///
/// Any origin is allowed unless `PDF2HTML_CORS_ORIGINS` lists specific ones.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let permissive = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    let Some(origins_str) = &config.cors_allowed_origins else {
        return permissive;
    };

    // Parse the comma-separated origin list and build a restrictive layer.
    let origins: Vec<axum::http::HeaderValue> = origins_str
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    if origins.is_empty() {
        warn!(value = %origins_str, "no valid CORS origins configured; allowing any origin");
        permissive
    } else {
        info!(count = origins.len(), "CORS restricted to configured origins");
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_headers(Any)
            .allow_methods(Any)
    }
}
