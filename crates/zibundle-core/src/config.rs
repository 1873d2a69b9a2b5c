//! Run configuration and the optional `zibundle.toml` manifest.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use zibundle_schema::{DependencySpec, Requirement};

use crate::error::BundleError;

/// Feed base URL dependencies are resolved under: `<base>/<name>.xml`.
pub const DEFAULT_FEED_BASE: &str = "http://gfxmonk.github.io/0downstream/feeds/npm";

/// Feed providing the pinned runtime.
pub const DEFAULT_RUNTIME_FEED: &str = "http://gfxmonk.net/dist/0install/node.js.xml";

/// Feed providing the gather tool.
pub const DEFAULT_GATHER_FEED: &str = "http://gfxmonk.net/dist/0install/obligate.js.xml";

/// Feed always excluded from gathering (the registry meta-feed resolves
/// into every selection but contributes no files worth bundling).
pub const DEFAULT_EXCLUDE_FEED: &str = "http://gfxmonk.net/dist/0install/npm.xml";

/// Feed providing the autocompile driver.
pub const DEFAULT_COMPILE_FEED: &str = "http://0install.net/2006/interfaces/0compile.xml";

/// Minimum gather tool version.
pub const GATHER_MIN_VERSION: &str = "0.4.0";

/// Feed providing the archiver when no archiver command is configured.
pub const DEFAULT_ARCHIVER_FEED: &str = "http://gfxmonk.net/dist/0install/bsdtar.xml";

/// Subdirectory of the working directory whose contents head the
/// data-dir search path after an override archive is unpacked.
pub const DEFAULT_OVERRIDE_SUBDIR: &str = "xdg-data";

/// Everything one bundling run needs, assembled once and passed by
/// reference into each pipeline stage. Nothing here mutates after
/// construction.
#[derive(Debug, Clone)]
pub struct BundleConfig {
    /// Requested dependencies, in input order.
    pub deps: Vec<DependencySpec>,

    /// Exact runtime version every bundle pins alongside its
    /// dependencies.
    pub runtime_version: String,

    /// Feed base URL for dependency feeds.
    pub feed_base: String,

    /// Runtime feed URL.
    pub runtime_feed: String,

    /// Gather tool feed URL.
    pub gather_feed: String,

    /// Feed excluded from gathering.
    pub exclude_feed: String,

    /// Autocompile driver feed URL.
    pub compile_feed: String,

    /// Optional platform-override archive unpacked into the working
    /// directory before anything else runs.
    pub override_archive: Option<PathBuf>,

    /// Subdirectory of the working directory prepended to the data-dir
    /// search path.
    pub override_subdir: String,

    /// Where to copy the finished archive. `None` reproduces the
    /// original behavior: announce the path and let it go down with the
    /// working directory.
    pub dest: Option<PathBuf>,

    /// Leak the working directory instead of removing it (debug aid).
    pub keep_temp: bool,

    /// Resolver command prefix (`0install` by default).
    pub resolver_cmd: Vec<String>,

    /// Archiver command prefix. Defaults to running the archiver feed
    /// through the resolver.
    pub archiver_cmd: Vec<String>,
}

impl BundleConfig {
    /// A config with stock feed URLs and tool commands.
    pub fn new(deps: Vec<DependencySpec>, runtime_version: impl Into<String>) -> Self {
        Self {
            deps,
            runtime_version: runtime_version.into(),
            feed_base: DEFAULT_FEED_BASE.to_string(),
            runtime_feed: DEFAULT_RUNTIME_FEED.to_string(),
            gather_feed: DEFAULT_GATHER_FEED.to_string(),
            exclude_feed: DEFAULT_EXCLUDE_FEED.to_string(),
            compile_feed: DEFAULT_COMPILE_FEED.to_string(),
            override_archive: None,
            override_subdir: DEFAULT_OVERRIDE_SUBDIR.to_string(),
            dest: None,
            keep_temp: false,
            resolver_cmd: vec!["0install".to_string()],
            archiver_cmd: vec![
                "0install".to_string(),
                "run".to_string(),
                DEFAULT_ARCHIVER_FEED.to_string(),
            ],
        }
    }

    /// The descriptor's requirement list: one exact pin per dependency,
    /// in input order, plus the runtime pin.
    pub fn requirements(&self) -> Vec<Requirement> {
        let mut reqs: Vec<Requirement> = self
            .deps
            .iter()
            .map(|dep| Requirement::exact(dep.feed_url(&self.feed_base), dep.version.clone()))
            .collect();
        reqs.push(Requirement::exact(
            self.runtime_feed.clone(),
            self.runtime_version.clone(),
        ));
        reqs
    }

    /// Locate the resolver binary on the search path.
    ///
    /// Commands configured with an explicit path are taken as-is; a bare
    /// name goes through a `PATH` lookup so a missing resolver fails
    /// early with a clear message instead of at the first probe.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Launch`] when the binary cannot be found.
    pub fn locate_resolver(&self) -> Result<PathBuf, BundleError> {
        let program = self
            .resolver_cmd
            .first()
            .ok_or_else(|| BundleError::Manifest("resolver command is empty".to_string()))?;

        if Path::new(program).components().count() > 1 {
            return Ok(PathBuf::from(program));
        }
        which::which(program).map_err(|e| BundleError::Launch {
            program: program.clone(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, e),
        })
    }
}

/// On-disk manifest (`zibundle.toml`). Every field is optional; the CLI
/// merges it under its own flags.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct Manifest {
    /// Dependencies as `name@version` strings (order preserved).
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Runtime version pin.
    pub runtime_version: Option<String>,

    /// Feed base URL override.
    pub feed_base: Option<String>,

    /// Runtime feed URL override.
    pub runtime_feed: Option<String>,

    /// Gather feed URL override.
    pub gather_feed: Option<String>,

    /// Excluded feed URL override.
    pub exclude_feed: Option<String>,

    /// Autocompile feed URL override.
    pub compile_feed: Option<String>,

    /// Platform-override archive path.
    pub override_tar: Option<PathBuf>,

    /// Override subdirectory name.
    pub override_subdir: Option<String>,

    /// Final archive destination.
    pub dest: Option<PathBuf>,

    /// Resolver command prefix.
    pub resolver_cmd: Option<Vec<String>>,

    /// Archiver command prefix.
    pub archiver_cmd: Option<Vec<String>>,
}

impl Manifest {
    /// Read and parse a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Manifest`] when the file cannot be read or
    /// is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, BundleError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BundleError::Manifest(format!("{}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| BundleError::Manifest(format!("{}: {e}", path.display())))
    }

    /// Parse the `dependencies` entries into specs, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Spec`] for the first malformed entry.
    pub fn parsed_dependencies(&self) -> Result<Vec<DependencySpec>, BundleError> {
        self.dependencies
            .iter()
            .map(|s| s.parse::<DependencySpec>().map_err(BundleError::from))
            .collect()
    }
}
