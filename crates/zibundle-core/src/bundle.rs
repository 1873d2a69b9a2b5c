//! The top-level bundling pipeline.
//!
//! Strictly linear: prepare the environment, probe availability, write
//! the descriptor, resolve (compiling first if needed), gather, pack.
//! Two branches only -- the platform policy inside the probe loop and
//! the compile-needed flag in front of resolution. Every stage talks to
//! the outside world through the injected [`ToolRunner`].

use std::fs;
use std::path::PathBuf;

use zibundle_schema::{SelectionsDocument, render_descriptor};

use crate::config::BundleConfig;
use crate::driver::resolve_selections;
use crate::error::BundleError;
use crate::gather::gather_and_package;
use crate::probe::{PlatformPolicy, probe_dependencies};
use crate::runner::ToolRunner;
use crate::tools::Toolchain;
use crate::workspace::{EnvOverlay, Workspace};

/// What a finished run produced.
#[derive(Debug)]
pub struct BundleOutcome {
    /// Path of the output archive. Inside the (now removed) workspace
    /// unless a destination was configured or the workspace was kept.
    pub archive: PathBuf,

    /// The captured selections document.
    pub selections: SelectionsDocument,

    /// Whether any dependency needed the compile pass.
    pub compile_needed: bool,

    /// The leaked workspace root, when the run was asked to keep it.
    pub workspace: Option<PathBuf>,
}

/// Run the whole pipeline with the host platform's probe policy.
///
/// # Errors
///
/// Propagates the first fatal [`BundleError`]; the workspace is removed
/// on every path out of here unless the config asks to keep it.
pub fn run(config: &BundleConfig, runner: &dyn ToolRunner) -> Result<BundleOutcome, BundleError> {
    run_with_policy(config, runner, PlatformPolicy::for_host())
}

/// [`run`], with the probe policy chosen by the caller.
///
/// # Errors
///
/// See [`run`].
pub fn run_with_policy(
    config: &BundleConfig,
    runner: &dyn ToolRunner,
    policy: PlatformPolicy,
) -> Result<BundleOutcome, BundleError> {
    for dep in &config.deps {
        dep.validate()?;
    }

    let workspace = Workspace::new()?;
    let tools = Toolchain::new(runner, config);

    // Environment: PATH overlay first, then the override archive (its
    // extraction already runs with the adjusted PATH), then the data-dir
    // overlay pointing into the workspace. The data-dir head is set even
    // when no archive was unpacked; it is simply an empty lookup then.
    let base_env = EnvOverlay::base();
    if let Some(archive) = &config.override_archive {
        tracing::info!("unpacking override archive {}", archive.display());
        tools.extract_archive(&base_env, archive, workspace.path())?;
    }
    let env = base_env.with_data_override(&workspace.path().join(&config.override_subdir));

    let compile_needed = probe_dependencies(&tools, &env, &config.deps, policy)?;

    let descriptor = render_descriptor(&config.requirements());
    fs::write(workspace.feed_path(), &descriptor)?;
    tracing::debug!(feed = %workspace.feed_path().display(), "descriptor written");

    let selections = resolve_selections(&tools, &env, &workspace, compile_needed)?;

    let archive = gather_and_package(&tools, &env, &workspace, config)?;

    let kept = if config.keep_temp {
        let path = workspace.keep();
        tracing::info!("keeping workspace at {}", path.display());
        Some(path)
    } else {
        None
    };

    Ok(BundleOutcome {
        archive,
        selections,
        compile_needed,
        workspace: kept,
    })
}
