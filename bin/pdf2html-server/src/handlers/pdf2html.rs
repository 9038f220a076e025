//! pdf2htmlEX subprocess wrapper.
//!
//! One conversion spawns exactly one `pdf2htmlEX` process with a fixed flag
//! set. A conversion only succeeds when the process exits successfully *and*
//! the expected `<id>.html` exists in the output directory afterwards.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Rendering policy passed to every pdf2htmlEX run.
///
/// Zoom 1.3 at a fixed 800px fit width, outline off, fonts/images/CSS
/// embedded inline, no embedded JavaScript, fallback mode, text visibility
/// correction and ToUnicode mapping on.
#[rustfmt::skip]
pub const PDF2HTMLEX_FLAGS: &[&str] = &[
    "--zoom", "1.3",
    "--process-outline", "0",
    "--fit-width", "800",
    "--font-format", "woff",
    "--embed-css", "1",
    "--embed-font", "1",
    "--embed-image", "1",
    "--embed-javascript", "0",
    "--embed-outline", "0",
    "--split-pages", "0",
    "--bg-format", "png",
    "--fallback", "1",
    "--optimize-text", "1",
    "--correct-text-visibility", "1",
    "--space-as-offset", "0",
    "--tounicode", "1",
];

#[derive(Debug, Error)]
pub enum ConversionError {
    /// The converter executable could not be started.
    #[error("Conversion failed: could not run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The converter ran but reported failure.
    #[error("Conversion failed: {status}: {stderr}")]
    Exited { status: ExitStatus, stderr: String },

    /// The converter exited cleanly without producing its output file.
    #[error("Output file not found after conversion")]
    MissingOutput,
}

/// Handle to the pdf2htmlEX executable.
#[derive(Debug, Clone)]
pub struct Pdf2HtmlEx {
    program: PathBuf,
}

impl Pdf2HtmlEx {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// File name the converter is asked to produce for `id`.
    pub fn output_file_name(id: &Uuid) -> String {
        format!("{id}.html")
    }

    /// Full argument list for one conversion, excluding the program itself.
    pub fn args(pdf_path: &Path, output_dir: &Path, id: &Uuid) -> Vec<std::ffi::OsString> {
        let mut args: Vec<std::ffi::OsString> = Vec::with_capacity(PDF2HTMLEX_FLAGS.len() + 4);
        args.push("--dest-dir".into());
        args.push(output_dir.into());
        args.extend(PDF2HTMLEX_FLAGS.iter().map(|flag| (*flag).into()));
        args.push(pdf_path.into());
        args.push(Self::output_file_name(id).into());
        args
    }

    /// Convert `pdf_path` into `<output_dir>/<id>.html` and return that path.
    ///
    /// No timeout is applied; the call resolves when the process exits.
    /// Dropping the future kills the process.
    pub async fn convert(
        &self,
        pdf_path: &Path,
        output_dir: &Path,
        id: &Uuid,
    ) -> Result<PathBuf, ConversionError> {
        let args = Self::args(pdf_path, output_dir, id);
        debug!(program = %self.program.display(), ?args, "executing pdf2htmlEX");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ConversionError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        if !output.status.success() {
            warn!(job_id = %id, status = %output.status, stderr = %stderr, "pdf2htmlEX failed");
            return Err(ConversionError::Exited {
                status: output.status,
                stderr,
            });
        }
        debug!(job_id = %id, stdout = %String::from_utf8_lossy(&output.stdout), "pdf2htmlEX finished");

        let html_path = output_dir.join(Self::output_file_name(id));
        if !tokio::fs::try_exists(&html_path).await.unwrap_or(false) {
            warn!(job_id = %id, path = %html_path.display(), "pdf2htmlEX produced no output");
            return Err(ConversionError::MissingOutput);
        }

        info!(job_id = %id, path = %html_path.display(), "pdf2htmlEX conversion succeeded");
        Ok(html_path)
    }

    /// Run `--version` to check the executable is reachable.
    ///
    /// pdf2htmlEX prints its banner on stderr; the first non-empty line of
    /// either stream is returned.
    pub async fn probe(&self) -> Result<String, ConversionError> {
        let output = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ConversionError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(ConversionError::Exited {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let banner = stderr
            .lines()
            .chain(stdout.lines())
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_owned();
        Ok(banner)
    }
}
