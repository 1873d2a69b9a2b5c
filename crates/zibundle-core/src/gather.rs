//! Artifact gathering and packaging.

use std::fs;
use std::path::PathBuf;

use crate::config::BundleConfig;
use crate::error::BundleError;
use crate::tools::Toolchain;
use crate::workspace::{EnvOverlay, Workspace};

/// Materialize every selected package and archive the result.
///
/// The gather tool populates the workspace's `deps/` directory from the
/// selections document (always excluding the configured meta-feed);
/// the archiver then packs the selections document plus every top-level
/// gathered entry into `deps.tar.gz`.
///
/// With a destination configured, the archive is copied out of the
/// workspace and the copy's path is returned. Without one, the path
/// inside the workspace is returned and the archive goes down with it
/// once the run finishes -- the tool announces this rather than
/// guessing a destination.
///
/// # Errors
///
/// Returns [`BundleError::Gather`] or [`BundleError::Package`] when the
/// respective tool fails, or [`BundleError::Io`] when the gathered
/// output cannot be listed or the archive cannot be copied out.
pub fn gather_and_package(
    tools: &Toolchain<'_>,
    env: &EnvOverlay,
    workspace: &Workspace,
    config: &BundleConfig,
) -> Result<PathBuf, BundleError> {
    let output_dir = workspace.gather_dir();
    let selections_path = workspace.selections_path();

    tools.gather(env, &selections_path, &output_dir)?;

    // Top-level entries only; the archiver recurses into directories
    // itself. Sorted so the archive layout is reproducible.
    let mut entries: Vec<String> = fs::read_dir(&output_dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    entries.sort();

    let archive_path = workspace.archive_path();
    let mut items = vec![selections_path.display().to_string()];
    items.extend(entries);
    tools.create_archive(env, &archive_path, &output_dir, &items)?;

    match &config.dest {
        Some(dest) => {
            let target = if dest.is_dir() {
                dest.join("deps.tar.gz")
            } else {
                dest.clone()
            };
            fs::copy(&archive_path, &target)?;
            tracing::info!("bundle copied to {}", target.display());
            Ok(target)
        }
        None => {
            tracing::warn!(
                "no destination configured; {} will be removed with the workspace",
                archive_path.display()
            );
            Ok(archive_path)
        }
    }
}
