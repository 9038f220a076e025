//! Per-request staging of input PDFs and cleanup of converter output.
//!
//! A [`ConversionJob`] owns two paths for the lifetime of one request:
//! `<uploads>/<uuid>-<name>` for the PDF and `<output>/<uuid>.html` for the
//! rendering. [`ConversionJob::run`] removes both whether or not the
//! conversion succeeded. A job dropped before that point (client hung up
//! mid-upload or mid-conversion) removes them from its `Drop` impl.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::ServerError;
use crate::handlers::pdf2html::Pdf2HtmlEx;

/// Staged name used when the caller supplied no usable file name.
pub const FALLBACK_FILE_NAME: &str = "document.pdf";

/// Upper bound for the sanitised name, leaving room for the `<uuid>-`
/// prefix under the usual 255-byte NAME_MAX.
pub const MAX_FILE_NAME_BYTES: usize = 200;

/// Extensions longer than this are treated as part of the stem.
const MAX_EXTENSION_BYTES: usize = 16;

/// Where a request's PDF came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Multipart `file` field, with the client-supplied file name.
    Upload { file_name: String },
    /// Raw `application/pdf` request body.
    RawBody,
    /// Downloaded from a remote URL.
    Url(String),
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Upload { file_name } => write!(f, "upload:{file_name}"),
            InputSource::RawBody => f.write_str("raw-body"),
            InputSource::Url(url) => write!(f, "url:{url}"),
        }
    }
}

/// One conversion attempt and the temp files it owns.
#[derive(Debug)]
pub struct ConversionJob {
    pub id: Uuid,
    pub source: InputSource,
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub output_path: PathBuf,
    cleaned: bool,
}

impl ConversionJob {
    /// Allocate a fresh id and derive both temp paths. Nothing touches disk yet.
    pub fn new(config: &Config, source: InputSource) -> Self {
        let id = Uuid::new_v4();
        let name = match &source {
            InputSource::Upload { file_name } => sanitize_filename(file_name),
            InputSource::RawBody | InputSource::Url(_) => FALLBACK_FILE_NAME.to_owned(),
        };
        Self {
            id,
            input_path: config.uploads_dir.join(format!("{id}-{name}")),
            output_dir: config.output_dir.clone(),
            output_path: config.output_dir.join(Pdf2HtmlEx::output_file_name(&id)),
            source,
            cleaned: false,
        }
    }

    /// Write an in-memory PDF to the staged input path.
    pub async fn stage_bytes(&self, bytes: &[u8]) -> Result<u64, ServerError> {
        if let Err(e) = tokio::fs::write(&self.input_path, bytes).await {
            remove_quietly(&self.input_path).await;
            return Err(e.into());
        }
        debug!(job_id = %self.id, size_bytes = bytes.len(), "staged PDF");
        Ok(bytes.len() as u64)
    }

    /// Stream chunks to the staged input path.
    ///
    /// On any stream or write error the partial file is removed before the
    /// error is returned.
    pub async fn stage_stream<S>(&self, stream: S) -> Result<u64, ServerError>
    where
        S: Stream<Item = Result<Bytes, ServerError>>,
    {
        let mut file = tokio::fs::File::create(&self.input_path).await?;
        let mut stream = std::pin::pin!(stream);
        let mut written = 0u64;

        let result: Result<(), ServerError> = async {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.flush().await?;
            Ok(())
        }
        .await;

        drop(file);
        match result {
            Ok(()) => {
                debug!(job_id = %self.id, size_bytes = written, "staged PDF");
                Ok(written)
            }
            Err(e) => {
                remove_quietly(&self.input_path).await;
                Err(e)
            }
        }
    }

    /// Convert the staged PDF and return the HTML text.
    ///
    /// Both temp files are removed afterwards on every path.
    pub async fn run(mut self, converter: &Pdf2HtmlEx) -> Result<String, ServerError> {
        info!(job_id = %self.id, source = %self.source, "converting PDF");

        let result = async {
            let html_path = converter
                .convert(&self.input_path, &self.output_dir, &self.id)
                .await?;
            let bytes = tokio::fs::read(&html_path).await?;
            Ok::<_, ServerError>(String::from_utf8_lossy(&bytes).into_owned())
        }
        .await;

        self.cleanup().await;
        result
    }

    pub async fn cleanup(&mut self) {
        cleanup_files(&self.input_path, &self.output_path).await;
        self.cleaned = true;
    }
}

impl Drop for ConversionJob {
    fn drop(&mut self) {
        if self.cleaned {
            return;
        }
        debug!(job_id = %self.id, "conversion dropped before cleanup");
        let input = std::mem::take(&mut self.input_path);
        let output = std::mem::take(&mut self.output_path);
        // Drop can't be async; hand the removal to the runtime when there is one.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    cleanup_files(&input, &output).await;
                });
            }
            Err(_) => {
                for path in [&input, &output] {
                    if let Err(e) = std::fs::remove_file(path) {
                        if e.kind() != ErrorKind::NotFound {
                            warn!(path = %path.display(), error = %e, "failed to remove temp file");
                        }
                    }
                }
            }
        }
    }
}

/// Best-effort removal of a request's input and output files.
///
/// Missing files are fine; other failures are logged and swallowed.
pub async fn cleanup_files(pdf_path: &Path, html_path: &Path) {
    for path in [pdf_path, html_path] {
        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!(path = %path.display(), "removed temp file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove temp file"),
        }
    }
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "failed to remove partial upload");
        }
    }
}

/// Keep alphanumerics, `.`, `_` and `-`; everything else becomes `_`.
///
/// Names that would be empty or consist only of dots fall back to
/// [`FALLBACK_FILE_NAME`]. Long names are cut to [`MAX_FILE_NAME_BYTES`],
/// keeping the extension.
pub fn sanitize_filename(filename: &str) -> String {
    // Browsers on Windows may send a full path.
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '.' || c == '_' || c == '-' { c } else { '_' })
        .collect();
    if cleaned.chars().all(|c| c == '.') {
        FALLBACK_FILE_NAME.to_owned()
    } else {
        truncate_file_name(cleaned)
    }
}

fn truncate_file_name(name: String) -> String {
    if name.len() <= MAX_FILE_NAME_BYTES {
        return name;
    }
    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot <= MAX_EXTENSION_BYTES => name.split_at(dot),
        _ => (name.as_str(), ""),
    };
    let mut end = (MAX_FILE_NAME_BYTES - ext.len()).min(stem.len());
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{ext}", &stem[..end])
}
