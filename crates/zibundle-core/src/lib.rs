//! Core library for zibundle.
//!
//! # Overview
//!
//! Everything between the CLI and the external tool chain: run
//! configuration, the scoped working directory, availability probing,
//! descriptor generation, the resolver/compiler driver, artifact
//! gathering and packaging.
//!
//! # Architecture
//!
//! - **One seam**: every external tool is invoked through the
//!   [`runner::ToolRunner`] trait, so the whole pipeline runs against
//!   fakes in tests and against [`runner::SystemRunner`] in production.
//! - **No ambient state**: configuration is an immutable
//!   [`config::BundleConfig`] passed by reference; environment changes
//!   are an explicit [`workspace::EnvOverlay`] applied per child
//!   process, never written into the parent's environment.
//! - **Scoped cleanup**: [`workspace::Workspace`] removes the working
//!   directory on drop, on every exit path. That is the pipeline's only
//!   failure-safety guarantee.

pub mod bundle;
pub mod config;
pub mod driver;
pub mod error;
pub mod gather;
pub mod probe;
pub mod runner;
pub mod tools;
pub mod workspace;

#[cfg(test)]
mod testutil;

pub use bundle::{BundleOutcome, run, run_with_policy};
pub use config::{BundleConfig, Manifest};
pub use error::{BundleError, ToolFailure};
pub use probe::PlatformPolicy;
pub use runner::{Completed, Invocation, OutputMode, SystemRunner, ToolRunner};
pub use workspace::{EnvOverlay, Workspace};
