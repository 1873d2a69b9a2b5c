//! Availability probing.
//!
//! Before resolving anything, each requested dependency gets a dry-run
//! `select` against its feed. A failure means no binary implementation
//! is satisfiable offline and the batch needs the compile pass. What
//! happens after the first failure is platform policy.

use zibundle_schema::DependencySpec;

use crate::error::BundleError;
use crate::tools::Toolchain;
use crate::workspace::EnvOverlay;

/// What the probe loop does when a dependency's binary probe fails.
///
/// Selected once at startup and injected, rather than branching on the
/// host OS inside the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformPolicy {
    /// Windows: the compiler there cannot follow recipe steps in feeds,
    /// so pre-download each failing dependency's sources now and keep
    /// probing the rest.
    PredownloadAndContinue,

    /// Everywhere else: the compiler fetches what it needs later, so
    /// stop at the first failure. Later dependencies are never probed
    /// once one fails -- only the first gap is detected. Known
    /// limitation, kept deliberately.
    StopAtFirstFailure,
}

impl PlatformPolicy {
    /// The policy for the host operating system.
    pub fn for_host() -> Self {
        if cfg!(windows) {
            Self::PredownloadAndContinue
        } else {
            Self::StopAtFirstFailure
        }
    }
}

/// Probe every dependency in input order.
///
/// Returns the batch-wide compile flag: `true` as soon as any probe
/// fails. Probe failures are signals, not errors; the only fatal
/// outcomes here are a resolver that cannot be spawned and (on the
/// predownload path) a failing source download.
///
/// # Errors
///
/// Returns [`BundleError::Launch`] or [`BundleError::Download`].
pub fn probe_dependencies(
    tools: &Toolchain<'_>,
    env: &EnvOverlay,
    deps: &[DependencySpec],
    policy: PlatformPolicy,
) -> Result<bool, BundleError> {
    let mut compile_needed = false;

    for dep in deps {
        let feed = tools.feed_url(dep);
        if tools.probe_select(env, &feed, &dep.version)? {
            tracing::debug!("binary implementation available for {dep}");
            continue;
        }

        tracing::warn!("binary selection failed for {dep}; compile pass required");
        compile_needed = true;

        match policy {
            PlatformPolicy::PredownloadAndContinue => {
                tracing::info!("pre-downloading sources for {dep}");
                tools.download_source(env, &feed, &dep.version)?;
            }
            PlatformPolicy::StopAtFirstFailure => break,
        }
    }

    Ok(compile_needed)
}
