//! PDF → HTML conversion endpoints.
//!
//! `POST /convert` takes either a multipart form with a `file` field or a raw
//! `application/pdf` body. `POST /convert-url` takes `{"url": "..."}` and
//! downloads the PDF first. All three intake paths stage the PDF under a
//! fresh UUID and share [`ConversionJob::run`]; the response body is the
//! rendered HTML itself.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Html;
use axum::routing::post;
use axum::{Json, Router};
use futures::StreamExt;
use tracing::info;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::handlers::staging::{ConversionJob, InputSource};
use crate::schemas::convert::{ConvertUpload, ConvertUrlRequest, ErrorResponse};
use crate::state::AppState;

pub const NO_PDF_FILE: &str = "No PDF file provided";
pub const NO_PDF_URL: &str = "No PDF URL provided";

/// Multipart field carrying the PDF.
const FILE_FIELD: &str = "file";

#[derive(OpenApi)]
#[openapi(
    paths(convert, convert_url),
    components(schemas(ConvertUpload, ConvertUrlRequest, ErrorResponse))
)]
pub struct ConvertApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/convert", post(convert))
        .route("/convert-url", post(convert_url))
}

/// Convert an uploaded PDF.
///
/// A multipart `file` field takes precedence; otherwise the body is used
/// verbatim when the content type is `application/pdf`.
#[utoipa::path(
    post,
    path = "/convert",
    tag = "convert",
    request_body(
        content = ConvertUpload,
        content_type = "multipart/form-data",
        description = "PDF as multipart field `file`, or the raw body with `Content-Type: application/pdf`"
    ),
    responses(
        (status = 200, description = "Rendered HTML", body = String, content_type = "text/html"),
        (status = 400, description = "No PDF provided", body = ErrorResponse),
        (status = 413, description = "Body exceeds the upload limit", body = ErrorResponse),
        (status = 500, description = "Conversion failed", body = ErrorResponse),
    )
)]
pub async fn convert(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Html<String>, ServerError> {
    let job = match media_type(request.headers()).as_deref() {
        Some(mt) if mt.eq_ignore_ascii_case("multipart/form-data") => {
            stage_multipart(&state, request).await?
        }
        Some(mt) if mt.eq_ignore_ascii_case("application/pdf") => {
            Some(stage_raw_body(&state, request).await?)
        }
        _ => None,
    };
    let job = job.ok_or_else(|| ServerError::BadRequest(NO_PDF_FILE.into()))?;

    let html = job.run(&state.converter).await?;
    Ok(Html(html))
}

/// Download a PDF from `url` and convert it.
#[utoipa::path(
    post,
    path = "/convert-url",
    tag = "convert",
    request_body = ConvertUrlRequest,
    responses(
        (status = 200, description = "Rendered HTML", body = String, content_type = "text/html"),
        (status = 400, description = "Missing URL or download failed", body = ErrorResponse),
        (status = 500, description = "Conversion failed", body = ErrorResponse),
    )
)]
pub async fn convert_url(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ConvertUrlRequest>, JsonRejection>,
) -> Result<Html<String>, ServerError> {
    let Json(req) = payload
        .map_err(|e| ServerError::BadRequest(format!("Invalid request body: {}", e.body_text())))?;
    let url = req
        .url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ServerError::BadRequest(NO_PDF_URL.into()))?;

    info!(url = %url, "processing PDF from URL");
    let response = state.http.get(&url).send().await.map_err(download_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(ServerError::BadRequest(format!(
            "Failed to download PDF: {}",
            status.canonical_reason().unwrap_or(status.as_str())
        )));
    }

    let job = ConversionJob::new(&state.config, InputSource::Url(url));
    let size = job
        .stage_stream(response.bytes_stream().map(|chunk| chunk.map_err(download_error)))
        .await?;
    info!(job_id = %job.id, size_bytes = size, "downloaded PDF");

    let html = job.run(&state.converter).await?;
    Ok(Html(html))
}

/// Stream the first `file` field to disk. Other fields are skipped.
async fn stage_multipart(
    state: &AppState,
    request: Request,
) -> Result<Option<ConversionJob>, ServerError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| ServerError::BadRequest(e.body_text()))?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_owned();
        let job = ConversionJob::new(&state.config, InputSource::Upload { file_name });
        let size = job
            .stage_stream(field.map(|chunk| chunk.map_err(multipart_error)))
            .await?;
        info!(job_id = %job.id, source = %job.source, size_bytes = size, "received PDF upload");
        return Ok(Some(job));
    }
    Ok(None)
}

async fn stage_raw_body(state: &AppState, request: Request) -> Result<ConversionJob, ServerError> {
    let body = Bytes::from_request(request, &()).await.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge(e.body_text())
        } else {
            ServerError::BadRequest(e.body_text())
        }
    })?;

    let job = ConversionJob::new(&state.config, InputSource::RawBody);
    let size = job.stage_bytes(&body).await?;
    info!(job_id = %job.id, size_bytes = size, "received raw PDF body");
    Ok(job)
}

fn multipart_error(e: MultipartError) -> ServerError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(e.body_text())
    } else {
        ServerError::BadRequest(format!("Failed to read multipart body: {}", e.body_text()))
    }
}

fn download_error(e: reqwest::Error) -> ServerError {
    ServerError::BadRequest(format!("Failed to download PDF: {e}"))
}

/// Media type of the request with parameters stripped, e.g.
/// `multipart/form-data; boundary=x` → `multipart/form-data`.
fn media_type(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::CONTENT_TYPE)?.to_str().ok()?;
    let essence = value.split(';').next()?.trim();
    (!essence.is_empty()).then(|| essence.to_owned())
}
