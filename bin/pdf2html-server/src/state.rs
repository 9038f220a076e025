//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;
use crate::handlers::pdf2html::Pdf2HtmlEx;

/// State shared across all HTTP handlers.
///
/// Requests share nothing mutable; staged files are kept apart by their
/// per-request UUID prefix.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// The external PDF → HTML converter.
    pub converter: Pdf2HtmlEx,
    /// Client used by the URL intake path.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(config, http))
    }

    /// Build state around an existing HTTP client.
    pub fn with_client(config: Config, http: reqwest::Client) -> Self {
        Self {
            converter: Pdf2HtmlEx::new(config.converter_bin.clone()),
            config: Arc::new(config),
            http,
        }
    }
}
