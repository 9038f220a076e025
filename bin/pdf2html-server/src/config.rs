//! Server configuration, loaded from environment variables at startup.

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

/// Default request body ceiling (50 MiB), shared by multipart and raw uploads.
pub const DEFAULT_MAX_BODY_MB: usize = 50;

/// Runtime configuration for pdf2html-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface to bind (default: `"0.0.0.0"`).
    pub bind_host: String,

    /// TCP port to listen on (default: `3001`, read from `PORT`).
    pub port: u16,

    /// Directory holding staged input PDFs.
    pub uploads_dir: PathBuf,

    /// Directory the converter writes HTML into.
    pub output_dir: PathBuf,

    /// Path or name of the pdf2htmlEX executable.
    /// Only the executable is configurable; its flag set is fixed.
    pub converter_bin: PathBuf,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,

    /// Comma-separated CORS origin allow-list. `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Serve the OpenAPI document at `/api-docs/openapi.json`.
    pub enable_docs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_owned(),
            port: 3001,
            uploads_dir: PathBuf::from("uploads"),
            output_dir: PathBuf::from("output"),
            converter_bin: PathBuf::from("pdf2htmlEX"),
            max_body_bytes: DEFAULT_MAX_BODY_MB * 1024 * 1024,
            cors_allowed_origins: None,
            log_level: "info".to_owned(),
            log_json: false,
            enable_docs: true,
        }
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_host: env_or("PDF2HTML_HOST", &defaults.bind_host),
            port: parse_env("PORT", defaults.port),
            uploads_dir: std::env::var_os("PDF2HTML_UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.uploads_dir),
            output_dir: std::env::var_os("PDF2HTML_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            converter_bin: std::env::var_os("PDF2HTML_BIN")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.converter_bin),
            max_body_bytes: parse_env("PDF2HTML_MAX_BODY_MB", DEFAULT_MAX_BODY_MB)
                .saturating_mul(1024 * 1024),
            cors_allowed_origins: std::env::var("PDF2HTML_CORS_ORIGINS")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            log_level: env_or("PDF2HTML_LOG", &defaults.log_level),
            log_json: parse_flag("PDF2HTML_LOG_JSON", defaults.log_json),
            enable_docs: parse_flag("PDF2HTML_ENABLE_DOCS", defaults.enable_docs),
        }
    }

    /// Socket address assembled from `bind_host` and `port`.
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.bind_host, self.port).parse()
    }

    /// Create the uploads and output directories if they are missing.
    ///
    /// Safe to call repeatedly.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.uploads_dir).await?;
        tokio::fs::create_dir_all(&self.output_dir).await?;
        Ok(())
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
