//! Shared fixtures for the in-crate tests.
//!
//! The stub converters are POSIX shell scripts that understand the same
//! argument shape as pdf2htmlEX (`--dest-dir <dir> … <input> <output-name>`).
//! They are all written once, before any test spawns a process, so no test
//! ever executes a script another thread still holds open for writing.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use tempfile::TempDir;

use crate::config::Config;
use crate::state::AppState;

pub struct StubConverters {
    _dir: TempDir,
    /// Writes `<dest-dir>/<output-name>` containing the input path, exits 0.
    pub ok: PathBuf,
    /// Prints to stderr and exits 1 without output.
    pub fail: PathBuf,
    /// Exits 0 without writing anything.
    pub silent: PathBuf,
    /// Writes the output file, then exits 3.
    pub partial: PathBuf,
    /// Writes the output file, sleeps a second, writes it again and exits 0.
    pub slow: PathBuf,
}

const PARSE_ARGS: &str = r#"
if [ "$1" = "--version" ]; then
  echo "pdf2htmlEX version 0.18.8.rc1" >&2
  exit 0
fi
dest=""
input=""
while [ $# -gt 1 ]; do
  if [ "$1" = "--dest-dir" ]; then dest="$2"; fi
  input="$1"
  shift
done
out="$dest/$1"
"#;

static STUBS: LazyLock<StubConverters> = LazyLock::new(|| {
    let dir = tempfile::tempdir().expect("create stub dir");
    let ok = write_script(
        dir.path(),
        "ok.sh",
        r#"printf '<!DOCTYPE html><html><body>%s</body></html>' "$input" > "$out""#,
    );
    let fail = write_script(
        dir.path(),
        "fail.sh",
        "echo \"Error: broken PDF: $input\" >&2\nexit 1",
    );
    let silent = write_script(dir.path(), "silent.sh", "exit 0");
    let partial = write_script(
        dir.path(),
        "partial.sh",
        "printf '<html></html>' > \"$out\"\necho 'Error: aborted' >&2\nexit 3",
    );
    let slow = write_script(
        dir.path(),
        "slow.sh",
        "printf '<html>' > \"$out\"\nsleep 1\nprintf '<html></html>' > \"$out\"",
    );
    StubConverters {
        _dir: dir,
        ok,
        fail,
        silent,
        partial,
        slow,
    }
});

pub fn stub_converters() -> &'static StubConverters {
    &STUBS
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{PARSE_ARGS}\n{body}\n")).expect("write stub");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("chmod stub");
    }
    path
}

/// Application state rooted in a fresh temp directory.
pub struct TestApp {
    pub root: TempDir,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new(converter: &Path) -> Self {
        Self::with_config(converter, |_| {}).await
    }

    pub async fn with_config(converter: &Path, tweak: impl FnOnce(&mut Config)) -> Self {
        let root = tempfile::tempdir().expect("create test root");
        let mut config = Config {
            uploads_dir: root.path().join("uploads"),
            output_dir: root.path().join("output"),
            converter_bin: converter.to_path_buf(),
            ..Config::default()
        };
        tweak(&mut config);
        config.ensure_dirs().await.expect("create test dirs");
        // Loopback fixtures must not be routed through an ambient proxy.
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("build http client");
        let state = Arc::new(AppState::with_client(config, http));
        Self { root, state }
    }

    /// Number of files left behind in the uploads and output directories.
    pub fn leftover_files(&self) -> usize {
        [&self.state.config.uploads_dir, &self.state.config.output_dir]
            .into_iter()
            .map(|dir| std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0))
            .sum()
    }
}
