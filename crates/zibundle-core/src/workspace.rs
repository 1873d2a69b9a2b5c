//! The scoped working directory and the child-process environment
//! overlay.
//!
//! The working directory owns every generated file (descriptor,
//! selections document, gathered artifacts, output archive) and is
//! removed on every exit path, success or failure. That removal is the
//! only failure-safety guarantee the pipeline makes.

use std::env;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Fallback data-dir search path when the host has none set.
pub const DEFAULT_DATA_DIRS: &str = "/usr/local/share/:/usr/share/";

/// Prepended to `PATH` so tools installed outside the stock system
/// locations are found (macOS hosts keep the resolver there).
const LOCAL_BIN: &str = "/usr/local/bin";

/// RAII handle over the ephemeral working directory.
///
/// Dropping the handle removes the directory tree recursively,
/// regardless of how far the pipeline got.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh empty working directory.
    ///
    /// # Errors
    ///
    /// Returns the OS error when the directory cannot be created.
    pub fn new() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("zibundle-").tempdir()?;
        Ok(Self { dir })
    }

    /// Root of the working directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the generated descriptor is written.
    pub fn feed_path(&self) -> PathBuf {
        self.dir.path().join("feed.xml")
    }

    /// Where the captured selections document is written.
    pub fn selections_path(&self) -> PathBuf {
        self.dir.path().join("selections.xml")
    }

    /// Directory the gather tool materializes packages into.
    pub fn gather_dir(&self) -> PathBuf {
        self.dir.path().join("deps")
    }

    /// Where the output archive is created.
    pub fn archive_path(&self) -> PathBuf {
        self.dir.path().join("deps.tar.gz")
    }

    /// Leak the directory instead of removing it, returning its path.
    pub fn keep(self) -> PathBuf {
        self.dir.keep()
    }
}

/// Environment variables overlaid on every spawned tool.
///
/// The parent process environment is never mutated; each child gets
/// these on top of what it inherits. Computed once per run.
#[derive(Debug, Clone)]
pub struct EnvOverlay {
    vars: Vec<(String, OsString)>,
}

impl EnvOverlay {
    /// The base overlay: `PATH` with [`LOCAL_BIN`] prepended to the
    /// given prior value.
    pub fn base_from(prior_path: Option<OsString>) -> Self {
        Self {
            vars: vec![("PATH".to_string(), prepend_path(LOCAL_BIN, prior_path))],
        }
    }

    /// The base overlay, seeded from the host `PATH`.
    pub fn base() -> Self {
        Self::base_from(env::var_os("PATH"))
    }

    /// Add `XDG_DATA_DIRS` with `override_dir` at the head, followed by
    /// the given prior value or [`DEFAULT_DATA_DIRS`].
    pub fn with_data_override_from(mut self, override_dir: &Path, prior: Option<OsString>) -> Self {
        let prior = prior.unwrap_or_else(|| OsString::from(DEFAULT_DATA_DIRS));
        self.vars.push((
            "XDG_DATA_DIRS".to_string(),
            prepend_path(override_dir, Some(prior)),
        ));
        self
    }

    /// Add `XDG_DATA_DIRS`, seeding the prior value from the host.
    pub fn with_data_override(self, override_dir: &Path) -> Self {
        self.with_data_override_from(override_dir, env::var_os("XDG_DATA_DIRS"))
    }

    /// The overlay entries.
    pub fn vars(&self) -> impl Iterator<Item = (String, OsString)> + '_ {
        self.vars.iter().cloned()
    }

    /// Look up one overlay entry.
    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }
}

/// Join `head` and the entries of `rest` into a search-path value with
/// `head` first.
fn prepend_path(head: impl AsRef<OsStr>, rest: Option<OsString>) -> OsString {
    let mut parts = vec![PathBuf::from(head.as_ref())];
    if let Some(value) = rest {
        parts.extend(env::split_paths(&value));
    }
    env::join_paths(&parts).unwrap_or_else(|_| head.as_ref().to_os_string())
}
