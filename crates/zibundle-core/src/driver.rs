//! The resolver/compiler driver.
//!
//! One decision: if any probe failed, run the autocompile driver before
//! the final selection. The selection itself always runs, capturing the
//! resolver's XML output as the selections document.

use std::fs;

use zibundle_schema::SelectionsDocument;

use crate::error::BundleError;
use crate::tools::Toolchain;
use crate::workspace::{EnvOverlay, Workspace};

/// Resolve the written descriptor into a selections document.
///
/// Runs the autocompile step first when `compile_needed` is set; that
/// step may perform arbitrarily long native builds. The captured
/// document is written to the workspace's `selections.xml` for the
/// gather tool to read.
///
/// # Errors
///
/// Returns [`BundleError::Compile`] or [`BundleError::Selection`] when
/// the respective tool fails; no retry either way.
pub fn resolve_selections(
    tools: &Toolchain<'_>,
    env: &EnvOverlay,
    workspace: &Workspace,
    compile_needed: bool,
) -> Result<SelectionsDocument, BundleError> {
    let feed_path = workspace.feed_path();

    if compile_needed {
        tracing::info!("compiling feed...");
        tools.autocompile(env, &feed_path)?;
    }

    let stdout = tools.select_xml(env, &feed_path)?;
    let document = SelectionsDocument::new(String::from_utf8_lossy(&stdout).into_owned());
    fs::write(workspace.selections_path(), document.as_str())?;
    tracing::debug!(selections = %document.as_str(), "captured selections document");

    Ok(document)
}
