//! zibundle - bundle feed-resolved dependencies
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
//!
//! Resolves a list of `name@version` dependencies through an external
//! feed resolver, compiling from source where no binary implementation
//! exists, and packs the gathered result plus the resolved selections
//! document into one compressed archive.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;

use zibundle_core::{BundleConfig, Manifest};
use zibundle_schema::DependencySpec;

#[derive(Debug, Parser)]
#[command(name = "zibundle")]
#[command(author, version, about = "Bundle feed-resolved dependencies into a portable archive")]
pub struct Cli {
    /// Dependencies to bundle, as name@version pairs
    pub deps: Vec<String>,

    /// Read dependencies and settings from a zibundle.toml manifest
    #[arg(long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Exact runtime version pinned alongside every dependency
    #[arg(long, value_name = "VERSION")]
    pub runtime_version: Option<String>,

    /// Platform-override archive unpacked into the working directory
    #[arg(long, value_name = "PATH")]
    pub override_tar: Option<PathBuf>,

    /// Subdirectory of the working directory that heads the data-dir search path
    #[arg(long, value_name = "NAME")]
    pub override_subdir: Option<String>,

    /// Copy the finished bundle here (without this, it is removed with the workspace)
    #[arg(long, value_name = "PATH")]
    pub dest: Option<PathBuf>,

    /// Keep the working directory around for inspection
    #[arg(long)]
    pub keep_temp: bool,

    /// Feed base URL dependencies resolve under
    #[arg(long, value_name = "URL")]
    pub feed_base: Option<String>,

    /// Resolver command; repeat the flag to build a multi-word command line
    #[arg(long, value_name = "ARG")]
    pub resolver_cmd: Vec<String>,

    /// Archiver command; repeat the flag to build a multi-word command line
    #[arg(long, value_name = "ARG")]
    pub archiver_cmd: Vec<String>,
}

/// Merge CLI flags over the optional manifest into a run configuration.
///
/// Precedence is flags, then manifest, then built-in defaults.
/// Dependencies come from the positional arguments when any are given,
/// otherwise from the manifest.
pub fn build_config(cli: &Cli) -> Result<BundleConfig> {
    let manifest = match &cli.manifest {
        Some(path) => Manifest::load(path)?,
        None => Manifest::default(),
    };

    let deps: Vec<DependencySpec> = if cli.deps.is_empty() {
        manifest.parsed_dependencies()?
    } else {
        cli.deps
            .iter()
            .map(|s| s.parse::<DependencySpec>())
            .collect::<Result<_, _>>()
            .context("invalid dependency argument")?
    };
    if deps.is_empty() {
        bail!("no dependencies given (pass name@version arguments or a manifest)");
    }

    let runtime_version = cli
        .runtime_version
        .clone()
        .or(manifest.runtime_version)
        .context("no runtime version given (pass --runtime-version or set it in the manifest)")?;

    let mut config = BundleConfig::new(deps, runtime_version);

    if let Some(url) = cli.feed_base.clone().or(manifest.feed_base) {
        config.feed_base = url;
    }
    if let Some(url) = manifest.runtime_feed {
        config.runtime_feed = url;
    }
    if let Some(url) = manifest.gather_feed {
        config.gather_feed = url;
    }
    if let Some(url) = manifest.exclude_feed {
        config.exclude_feed = url;
    }
    if let Some(url) = manifest.compile_feed {
        config.compile_feed = url;
    }
    if let Some(path) = cli.override_tar.clone().or(manifest.override_tar) {
        config.override_archive = Some(path);
    }
    if let Some(name) = cli.override_subdir.clone().or(manifest.override_subdir) {
        config.override_subdir = name;
    }
    if let Some(path) = cli.dest.clone().or(manifest.dest) {
        config.dest = Some(path);
    }
    if !cli.resolver_cmd.is_empty() {
        config.resolver_cmd = cli.resolver_cmd.clone();
    } else if let Some(cmd) = manifest.resolver_cmd {
        config.resolver_cmd = cmd;
    }
    if !cli.archiver_cmd.is_empty() {
        config.archiver_cmd = cli.archiver_cmd.clone();
    } else if let Some(cmd) = manifest.archiver_cmd {
        config.archiver_cmd = cmd;
    }
    config.keep_temp = cli.keep_temp;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("zibundle").chain(args.iter().copied()))
    }

    #[test]
    fn test_flags_only() {
        let cli = parse(&["left-pad@1.0.0", "chalk@2.3.0", "--runtime-version", "8.0.0"]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.deps.len(), 2);
        assert_eq!(config.deps[0], DependencySpec::new("left-pad", "1.0.0"));
        assert_eq!(config.runtime_version, "8.0.0");
        assert_eq!(config.resolver_cmd, ["0install"]);
    }

    #[test]
    fn test_no_deps_is_an_error() {
        let cli = parse(&["--runtime-version", "8.0.0"]);
        assert!(build_config(&cli).is_err());
    }

    #[test]
    fn test_missing_runtime_version_is_an_error() {
        let cli = parse(&["left-pad@1.0.0"]);
        let err = build_config(&cli).unwrap_err();
        assert!(err.to_string().contains("runtime version"));
    }

    #[test]
    fn test_manifest_supplies_defaults_and_flags_win() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("zibundle.toml");
        std::fs::write(
            &manifest,
            r#"
            dependencies = ["left-pad@1.0.0"]
            runtime-version = "6.0.0"
            feed-base = "http://feeds.example.net/npm"
            resolver-cmd = ["/opt/zero/0install"]
            "#,
        )
        .unwrap();

        let manifest_arg = manifest.display().to_string();
        let cli = parse(&[
            "--manifest",
            &manifest_arg,
            "--runtime-version",
            "8.0.0",
        ]);
        let config = build_config(&cli).unwrap();

        assert_eq!(config.deps, [DependencySpec::new("left-pad", "1.0.0")]);
        // Flag beats manifest.
        assert_eq!(config.runtime_version, "8.0.0");
        // Manifest beats defaults.
        assert_eq!(config.feed_base, "http://feeds.example.net/npm");
        assert_eq!(config.resolver_cmd, ["/opt/zero/0install"]);
    }

    #[test]
    fn test_positional_deps_override_manifest_deps() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("zibundle.toml");
        std::fs::write(
            &manifest,
            r#"
            dependencies = ["left-pad@1.0.0"]
            runtime-version = "8.0.0"
            "#,
        )
        .unwrap();

        let manifest_arg = manifest.display().to_string();
        let cli = parse(&["chalk@2.3.0", "--manifest", &manifest_arg]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.deps, [DependencySpec::new("chalk", "2.3.0")]);
    }

    #[test]
    fn test_repeated_tool_flags_build_a_command_line() {
        let cli = parse(&[
            "left-pad@1.0.0",
            "--runtime-version",
            "8.0.0",
            "--archiver-cmd",
            "0install",
            "--archiver-cmd",
            "run",
            "--archiver-cmd",
            "http://e.net/bsdtar.xml",
        ]);
        let config = build_config(&cli).unwrap();
        assert_eq!(
            config.archiver_cmd,
            ["0install", "run", "http://e.net/bsdtar.xml"]
        );
    }
}
