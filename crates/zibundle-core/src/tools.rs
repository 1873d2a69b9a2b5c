//! Typed clients for the external tool chain.
//!
//! Each method builds one concrete command line, hands it to the
//! injected [`ToolRunner`], and maps a failing exit into the matching
//! [`BundleError`] variant. The tools themselves are opaque: only exit
//! codes and (for the selection export) stdout matter.

use std::path::Path;

use crate::config::{BundleConfig, GATHER_MIN_VERSION};
use crate::error::{BundleError, ToolFailure};
use crate::runner::{Completed, Invocation, OutputMode, ToolRunner};
use crate::workspace::EnvOverlay;

use zibundle_schema::DependencySpec;

/// The external resolver, compiler, gatherer and archiver, all behind
/// one runner seam.
pub struct Toolchain<'a> {
    runner: &'a dyn ToolRunner,
    config: &'a BundleConfig,
}

impl std::fmt::Debug for Toolchain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolchain").finish_non_exhaustive()
    }
}

impl<'a> Toolchain<'a> {
    /// Bind the tool chain to a runner and a run configuration.
    pub fn new(runner: &'a dyn ToolRunner, config: &'a BundleConfig) -> Self {
        Self { runner, config }
    }

    /// The feed URL a dependency resolves under.
    pub fn feed_url(&self, dep: &DependencySpec) -> String {
        dep.feed_url(&self.config.feed_base)
    }

    fn resolver_argv(&self, args: &[&str]) -> Vec<String> {
        let mut argv = self.config.resolver_cmd.clone();
        argv.extend(args.iter().map(ToString::to_string));
        argv
    }

    fn archiver_argv(&self, args: &[&str]) -> Vec<String> {
        let mut argv = self.config.archiver_cmd.clone();
        argv.extend(args.iter().map(ToString::to_string));
        argv
    }

    fn launch(&self, invocation: &Invocation) -> Result<Completed, BundleError> {
        self.runner
            .run(invocation)
            .map_err(|source| BundleError::Launch {
                program: invocation
                    .argv
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "<empty>".to_string()),
                source,
            })
    }

    /// Dry-run selection of an exact version against a feed.
    ///
    /// `Ok(true)` means the dependency is satisfiable without a compile
    /// pass; `Ok(false)` means it is not. A failing exit is the signal,
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Launch`] only when the resolver cannot be
    /// spawned at all.
    pub fn probe_select(
        &self,
        env: &EnvOverlay,
        feed_url: &str,
        version: &str,
    ) -> Result<bool, BundleError> {
        let invocation = Invocation::new(self.resolver_argv(&[
            "select",
            "--version",
            version,
            feed_url,
        ]))
        .envs(env.vars())
        .output(OutputMode::Discard)
        .null_stdin();
        Ok(self.launch(&invocation)?.success())
    }

    /// Pre-download the sources for one dependency so a later compile
    /// pass finds them locally.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Download`] on a failing exit.
    pub fn download_source(
        &self,
        env: &EnvOverlay,
        feed_url: &str,
        version: &str,
    ) -> Result<(), BundleError> {
        let invocation = Invocation::new(self.resolver_argv(&[
            "download",
            "--source",
            "--version",
            version,
            feed_url,
        ]))
        .envs(env.vars())
        .null_stdin();
        self.expect_success(&invocation, BundleError::Download)
    }

    /// Run the autocompile driver against the descriptor. May perform
    /// arbitrarily long native builds.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Compile`] on a failing exit.
    pub fn autocompile(&self, env: &EnvOverlay, feed_path: &Path) -> Result<(), BundleError> {
        let feed = feed_path.display().to_string();
        let invocation = Invocation::new(self.resolver_argv(&[
            "run",
            "-v",
            &self.config.compile_feed,
            "autocompile",
            &feed,
        ]))
        .envs(env.vars());
        self.expect_success(&invocation, BundleError::Compile)
    }

    /// Resolve the descriptor and capture the selections document from
    /// stdout. The explicit empty `--command` keeps the resolver from
    /// insisting on a runnable entry point.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Selection`] on a failing exit.
    pub fn select_xml(&self, env: &EnvOverlay, feed_path: &Path) -> Result<Vec<u8>, BundleError> {
        let feed = feed_path.display().to_string();
        let invocation = Invocation::new(self.resolver_argv(&[
            "select",
            "--command",
            "",
            "--xml",
            &feed,
        ]))
        .envs(env.vars())
        .output(OutputMode::Capture);
        let completed = self.launch(&invocation)?;
        if !completed.success() {
            return Err(BundleError::Selection(ToolFailure {
                command: invocation.display(),
                code: completed.code,
            }));
        }
        Ok(completed.stdout)
    }

    /// Materialize every selected package into `output_dir`, excluding
    /// the configured meta-feed.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Gather`] on a failing exit.
    pub fn gather(
        &self,
        env: &EnvOverlay,
        selections_path: &Path,
        output_dir: &Path,
    ) -> Result<(), BundleError> {
        let not_before = format!("--not-before={GATHER_MIN_VERSION}");
        let output = output_dir.display().to_string();
        let selections = selections_path.display().to_string();
        let invocation = Invocation::new(self.resolver_argv(&[
            "run",
            &not_before,
            &self.config.gather_feed,
            "gather",
            "--verbose",
            "--exclude",
            &self.config.exclude_feed,
            "--output",
            &output,
            &selections,
        ]))
        .envs(env.vars());
        self.expect_success(&invocation, BundleError::Gather)
    }

    /// Unpack an override archive into `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Extraction`] on a failing exit.
    pub fn extract_archive(
        &self,
        env: &EnvOverlay,
        archive: &Path,
        dest: &Path,
    ) -> Result<(), BundleError> {
        let archive = archive.display().to_string();
        let dest = dest.display().to_string();
        let invocation = Invocation::new(self.archiver_argv(&["xzvf", &archive, "-C", &dest]))
            .envs(env.vars());
        self.expect_success(&invocation, BundleError::Extraction)
    }

    /// Create a compressed archive at `archive` from `entries`, resolved
    /// relative to `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Package`] on a failing exit.
    pub fn create_archive(
        &self,
        env: &EnvOverlay,
        archive: &Path,
        base_dir: &Path,
        entries: &[String],
    ) -> Result<(), BundleError> {
        let mut args = vec![
            "czf".to_string(),
            archive.display().to_string(),
            "-C".to_string(),
            base_dir.display().to_string(),
        ];
        args.extend(entries.iter().cloned());

        let mut argv = self.config.archiver_cmd.clone();
        argv.extend(args);
        let invocation = Invocation::new(argv).envs(env.vars());
        self.expect_success(&invocation, BundleError::Package)
    }

    fn expect_success(
        &self,
        invocation: &Invocation,
        wrap: impl FnOnce(ToolFailure) -> BundleError,
    ) -> Result<(), BundleError> {
        let completed = self.launch(invocation)?;
        if completed.success() {
            Ok(())
        } else {
            Err(wrap(ToolFailure {
                command: invocation.display(),
                code: completed.code,
            }))
        }
    }
}
